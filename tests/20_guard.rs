mod common;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use admin_console::app::{router, AppState};

fn app() -> axum::Router {
    router(AppState::new(common::test_config("http://127.0.0.1:9/api")))
}

fn get(uri: &str, cookie: Option<&str>) -> Result<Request<Body>> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    Ok(builder.body(Body::empty())?)
}

async fn json_body(response: axum::response::Response) -> Result<Value> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[tokio::test]
async fn protected_path_without_token_redirects_to_login() -> Result<()> {
    let res = app().oneshot(get("/admin/api/entities/company/fields", None)?).await?;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers().get(header::LOCATION).and_then(|v| v.to_str().ok()), Some("/login"));
    Ok(())
}

#[tokio::test]
async fn protected_path_with_cookie_is_served() -> Result<()> {
    let res = app()
        .oneshot(get("/admin/api/entities/company/fields", Some("token=abc"))?)
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json_body(res).await?;
    assert_eq!(body["data"]["id_field"], "companyId");
    assert_eq!(body["data"]["reference_field"], "companyState");
    Ok(())
}

#[tokio::test]
async fn bearer_header_satisfies_the_guard() -> Result<()> {
    let request = Request::builder()
        .uri("/admin/api/entities/product/fields")
        .header(header::AUTHORIZATION, "Bearer abc")
        .body(Body::empty())?;
    let res = app().oneshot(request).await?;
    assert_eq!(res.status(), StatusCode::OK);
    Ok(())
}

#[tokio::test]
async fn unprotected_paths_bypass_the_guard() -> Result<()> {
    let res = app().oneshot(get("/health", None)?).await?;
    assert_eq!(res.status(), StatusCode::OK);

    // Shares a prefix with /admin but not a path segment
    let res = app().oneshot(get("/administrator", None)?).await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn unknown_kind_is_not_found() -> Result<()> {
    let res = app()
        .oneshot(get("/admin/api/entities/store/fields", Some("token=abc"))?)
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn validate_reports_every_failing_field() -> Result<()> {
    let request = Request::builder()
        .method("POST")
        .uri("/admin/api/entities/company/validate")
        .header(header::COOKIE, "token=abc")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"companyName": "  ", "companyZip": "12a", "companyCity": "Austin"}).to_string(),
        ))?;
    let res = app().oneshot(request).await?;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let body = json_body(res).await?;
    assert_eq!(body["field_errors"]["companyName"], "This field is required");
    assert_eq!(body["field_errors"]["companyEmail"], "This field is required");
    assert_eq!(body["field_errors"]["companyZip"], "Please enter a valid number");
    assert!(body["field_errors"].get("companyCity").is_none());
    Ok(())
}

#[tokio::test]
async fn validate_returns_flattened_payload_when_clean() -> Result<()> {
    let request = Request::builder()
        .method("POST")
        .uri("/admin/api/entities/location/validate")
        .header(header::COOKIE, "token=abc")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({
                "locationId": 4,
                "locationName": "Depot",
                "locationAddress": "1 Main St",
                "locationState": {"id": 1, "stateName": "Texas"}
            })
            .to_string(),
        ))?;
    let res = app().oneshot(request).await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = json_body(res).await?;
    assert_eq!(body["data"]["valid"], true);
    assert_eq!(body["data"]["payload"]["locationState"], "Texas");
    assert_eq!(body["data"]["payload"]["locationId"], 4);
    Ok(())
}
