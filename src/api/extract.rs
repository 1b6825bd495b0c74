use axum::extract::{rejection::JsonRejection, FromRequest};

use crate::api::error::ApiError;
use crate::domain::DomainError;

/// `axum::Json` whose rejection is rendered through [`ApiError`], so a body
/// that fails to parse gets the same error envelope as any other failure.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(detail = %rejection.body_text(), "rejected request body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => {
                "Expected a JSON body with content-type application/json"
            }
            _ => "Invalid request body",
        };
        Self(DomainError::validation(message))
    }
}
