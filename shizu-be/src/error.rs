//! HTTP error mapping

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use shizu_common::Error;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Store, lineup, export or import error
    #[error(transparent)]
    Common(#[from] Error),
}

fn status_for(err: &Error) -> StatusCode {
    match err {
        Error::NotFound { .. } => StatusCode::NOT_FOUND,
        Error::AlreadyExists { .. } => StatusCode::CONFLICT,
        Error::InvalidReference { .. }
        | Error::InvalidFile(_)
        | Error::ExportFailure(_)
        | Error::ImportFailure(_) => StatusCode::UNPROCESSABLE_ENTITY,
        Error::InvalidRange { .. } | Error::InvalidInput(_) => StatusCode::BAD_REQUEST,
        Error::Database(_) | Error::Io(_) | Error::Json(_) | Error::Config(_) | Error::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Common(ref err) => (status_for(err), err.kind(), err.to_string()),
        };

        if status.is_server_error() {
            tracing::error!("{}: {}", error_code, message);
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use shizu_common::EntityKind;

    #[test]
    fn test_status_per_kind() {
        assert_eq!(
            status_for(&Error::not_found(EntityKind::Event, "launch")),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_for(&Error::already_exists(EntityKind::DjSlot, "launch/alice")),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status_for(&Error::InvalidRange {
                index_a: 4,
                index_b: 0,
                len: 2
            }),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_for(&Error::InvalidFile(vec!["File a has neither a path nor a URL".into()])),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_for(&Error::Internal("boom".into())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_response_status() {
        let response = ApiError::from(Error::invalid_reference(EntityKind::Dj, "zed", "dj")).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = ApiError::BadRequest("path is required".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
