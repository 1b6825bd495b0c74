use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use serde::Deserialize;

use crate::api::{error::ApiError, extract::ApiJson, state::AppState};

#[derive(Debug, Deserialize)]
pub struct GenerateResumeRequest {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub query: Option<String>,
}

pub async fn generate_resume(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<GenerateResumeRequest>,
) -> Result<Response, ApiError> {
    let resume = state
        .resume
        .generate(&request.session_id, request.query.as_deref())
        .await?;

    let disposition = format!("attachment; filename=\"{}\"", resume.filename);
    Ok((
        [
            (header::CONTENT_TYPE, resume.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        resume.bytes,
    )
        .into_response())
}
