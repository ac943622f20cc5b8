//! Authentication middleware.
//!
//! Guards the dashboard API with a shared token sent in `X-API-Key`.

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use subtle::ConstantTimeEq;

use crate::app::AppState;

pub const API_KEY_HEADER: &str = "X-API-Key";

/// Middleware that requires the configured dashboard token.
///
/// Passes every request through when no token is configured.
pub async fn require_auth(State(state): State<AppState>, req: Request<Body>, next: Next) -> Response {
    let Some(expected) = state.config.security.dashboard_token() else {
        return next.run(req).await;
    };

    let authorized = req
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|key| token_matches(key, expected))
        .unwrap_or(false);

    if !authorized {
        tracing::warn!(path = %req.uri().path(), "Rejected request with invalid or missing API key");
        return unauthorized_response("Invalid or missing API key");
    }

    next.run(req).await
}

/// Compares a presented key with the dashboard token in constant time.
fn token_matches(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// Helper to create unauthorized response.
fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unauthorized_response() {
        let response = unauthorized_response("Test message");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_token_matches() {
        assert!(token_matches("token", "token"));
        assert!(!token_matches("token", "tokem"));
        assert!(!token_matches("token", "token2"));
        assert!(!token_matches("", "token"));
    }
}
