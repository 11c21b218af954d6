// Cookie encoding for the browser-facing session endpoints.

use axum::http::{header::COOKIE, HeaderMap};

use super::{SessionToken, SESSION_TTL_SECS};

/// `Set-Cookie` value that stores `token` for the fixed session lifetime.
pub fn issue_cookie(name: &str, token: &SessionToken, secure: bool) -> String {
    let mut cookie = format!(
        "{name}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={SESSION_TTL_SECS}",
        token.as_str()
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that deletes the session cookie.
pub fn revoke_cookie(name: &str, secure: bool) -> String {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// Session token carried by the request's `Cookie` header(s), if any.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<SessionToken> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .find_map(|part| {
            let (key, value) = part.trim().split_once('=')?;
            if key.trim() != name {
                return None;
            }
            SessionToken::new(value.trim()).ok()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn issue_cookie_is_http_only_and_app_wide() {
        let token = SessionToken::new("abc").unwrap();
        let cookie = issue_cookie("token", &token, false);
        assert_eq!(cookie, "token=abc; Path=/; HttpOnly; SameSite=Lax; Max-Age=36000");
        assert!(issue_cookie("token", &token, true).ends_with("; Secure"));
    }

    #[test]
    fn revoke_cookie_expires_immediately() {
        assert_eq!(revoke_cookie("token", false), "token=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    }

    #[test]
    fn read_cookie_finds_named_value_among_others() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("theme=dark; token=abc; lang=en"));
        assert_eq!(read_cookie(&headers, "token").unwrap().as_str(), "abc");
        assert!(read_cookie(&headers, "missing").is_none());
    }

    #[test]
    fn read_cookie_treats_empty_value_as_absent() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, HeaderValue::from_static("token="));
        assert!(read_cookie(&headers, "token").is_none());
    }
}
