use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::domain::DomainError;

/// Wraps [`DomainError`] so handlers can return `Result<T, ApiError>`.
///
/// Only validation and not-found messages reach the client; everything else is
/// logged and replaced by a generic message.
#[derive(Debug)]
pub struct ApiError(pub DomainError);

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Validation(_) => StatusCode::BAD_REQUEST,
            DomainError::Upstream(_) => StatusCode::BAD_GATEWAY,
            DomainError::Storage(_) | DomainError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self.0 {
            DomainError::NotFound(msg) | DomainError::Validation(msg) => msg.clone(),
            DomainError::Storage(msg) => {
                tracing::error!("Storage error: {msg}");
                "A storage error occurred".to_string()
            }
            DomainError::Upstream(msg) => {
                tracing::error!("Upstream error: {msg}");
                "An upstream service error occurred".to_string()
            }
            DomainError::Render(msg) => {
                tracing::error!("Render error: {msg}");
                "Failed to render the document".to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.0.code(),
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}
