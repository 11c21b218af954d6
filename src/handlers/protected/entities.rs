// handlers/protected/entities.rs - Entity field tables and draft validation

use axum::{extract::Path, Json};
use serde_json::{json, Value};

use crate::entity::{validate, Draft, EntityKind};
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /admin/api/entities/:kind/fields - Field descriptor table for a kind
///
/// Expected Output:
/// ```json
/// {
///   "success": true,
///   "data": {
///     "kind": "company",
///     "id_field": "companyId",
///     "collection": "companies",
///     "reference_field": "companyState",
///     "fields": [{ "name": "companyName", "class": "required" }, ...]
///   }
/// }
/// ```
pub async fn fields_get(Path(kind): Path<String>) -> ApiResult<Value> {
    let kind: EntityKind = kind.parse()?;

    Ok(ApiResponse::success(json!({
        "kind": kind,
        "id_field": kind.id_field(),
        "collection": kind.collection(),
        "reference_field": kind.reference_field().map(|spec| spec.name),
        "fields": kind.fields(),
    })))
}

/// POST /admin/api/entities/:kind/validate - Validate a draft without saving it
///
/// Responds 422 with `field_errors` when any declared field fails, otherwise
/// returns the flattened payload that a submission would send.
pub async fn validate_post(
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let kind: EntityKind = kind.parse()?;
    let draft = Draft::from_json(kind, &body)?;

    let errors = validate(&draft, kind.fields());
    if errors.has_errors() {
        return Err(ApiError::unprocessable_entity("Validation failed", errors.field_errors()));
    }

    Ok(ApiResponse::success(json!({
        "kind": kind,
        "valid": true,
        "payload": draft.to_payload(),
    })))
}
