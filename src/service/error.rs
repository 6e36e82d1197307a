//! Typed service errors mapped onto HTTP responses.
//!
//! Boundary failures keep their upstream detail; the core's own failures
//! surface as 500 with a terse message. Webhook signature mismatches are
//! authentication errors, never partial processing.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    /// A remote collaborator failed; its status and body pass through.
    #[error("upstream returned {status}: {detail}")]
    Upstream { status: u16, detail: String },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.clone()),
            ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
            ApiError::Upstream { status, detail } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                detail.clone(),
            ),
            ApiError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unauthorized_maps_to_401() {
        let resp = ApiError::Unauthorized("bad signature".into()).into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn upstream_keeps_remote_status() {
        let resp = ApiError::Upstream { status: 422, detail: "nope".into() }.into_response();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn invalid_upstream_status_degrades_to_502() {
        let resp = ApiError::Upstream { status: 9999, detail: "?".into() }.into_response();
        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
    }
}
