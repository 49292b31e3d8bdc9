use axum::{
    body::Body,
    extract::State,
    http::{
        header::{self, HeaderMap, HeaderValue},
        Method, Request, Response, StatusCode,
    },
    middleware::Next,
};
use tracing::debug;

use crate::app::AppState;

/// Resolve the origin to echo back, if any.
///
/// A `*` entry reflects any origin outside production; otherwise the request
/// origin must be listed.
pub fn allowed_origin(
    allowed: &[String],
    production: bool,
    origin: Option<&str>,
) -> Option<String> {
    let origin = origin?;
    let has_wildcard = allowed.iter().any(|o| o == "*");

    if has_wildcard && !production {
        debug!("CORS: Reflecting origin for development: {}", origin);
        return Some(origin.to_string());
    }

    if allowed.iter().any(|o| o == origin) {
        debug!("CORS: Origin allowed from whitelist: {}", origin);
        Some(origin.to_string())
    } else {
        debug!("CORS: Origin not in whitelist: {}", origin);
        None
    }
}

fn insert_origin_headers(headers: &mut HeaderMap, origin: &str) {
    if let Ok(value) = HeaderValue::from_str(origin) {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
            HeaderValue::from_static("true"),
        );
        headers.insert(header::VARY, HeaderValue::from_static("origin"));
    }
}

/// CORS middleware driven by `CORS_ALLOWED_ORIGINS`
pub async fn dynamic_cors_middleware(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let origin = allowed_origin(
        &state.config.security.cors_allowed_origins,
        state.config.is_production(),
        req.headers()
            .get(header::ORIGIN)
            .and_then(|v| v.to_str().ok()),
    );

    // Preflight
    if req.method() == Method::OPTIONS {
        let mut response = Response::new(Body::empty());

        if let Some(allowed) = origin {
            let headers = response.headers_mut();
            insert_origin_headers(headers, &allowed);
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
            );
            headers.insert(
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                HeaderValue::from_static("content-type, authorization, accept, origin"),
            );
            headers.insert(
                header::ACCESS_CONTROL_MAX_AGE,
                HeaderValue::from_static("3600"),
            );
        }

        *response.status_mut() = StatusCode::OK;
        return response;
    }

    let mut response = next.run(req).await;

    if let Some(allowed) = origin {
        insert_origin_headers(response.headers_mut(), &allowed);
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    fn origins(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_wildcard_reflects_outside_production() {
        let allowed = origins(&["*"]);
        assert_eq!(
            allowed_origin(&allowed, false, Some("http://localhost:5173")),
            Some("http://localhost:5173".to_string())
        );
        assert_eq!(allowed_origin(&allowed, true, Some("http://evil.test")), None);
    }

    #[test]
    fn test_whitelist() {
        let allowed = origins(&["https://arcadia.example"]);
        assert!(allowed_origin(&allowed, true, Some("https://arcadia.example")).is_some());
        assert!(allowed_origin(&allowed, true, Some("https://other.example")).is_none());
        assert!(allowed_origin(&allowed, true, None).is_none());
    }
}
