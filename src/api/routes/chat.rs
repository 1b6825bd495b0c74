use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, extract::ApiJson, state::AppState};
use crate::application::is_resume_related;
use crate::domain::{ChatTurn, Metadata};

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub query: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SendMessageResponse {
    pub session_id: String,
    pub response: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_hint: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resume_message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Deserialize)]
pub struct UploadDocumentRequest {
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

#[derive(Debug, Serialize)]
pub struct UploadDocumentResponse {
    pub status: String,
    pub message: String,
    pub id: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SendMessageRequest>,
) -> Result<Json<SendMessageResponse>, ApiError> {
    let (session_id, completion) = state
        .pipeline
        .send_message(request.session_id.as_deref(), &request.query)
        .await?;

    let hint = is_resume_related(&request.query);
    Ok(Json(SendMessageResponse {
        session_id,
        response: completion.answer,
        sources: completion.sources,
        resume_hint: hint.then_some(true),
        resume_message: hint.then(|| state.config.prompts.resume.hint.clone()),
    }))
}

pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let messages = state.pipeline.history(&session_id).await?;
    Ok(Json(HistoryResponse {
        session_id,
        messages,
    }))
}

pub async fn upload_document(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<UploadDocumentRequest>,
) -> Result<Json<UploadDocumentResponse>, ApiError> {
    let document = state
        .rag
        .index_document(&request.content, request.metadata)
        .await?;

    tracing::info!(doc_id = %document.id, "context document uploaded");
    Ok(Json(UploadDocumentResponse {
        status: "success".to_string(),
        message: "Document uploaded successfully".to_string(),
        id: document.id,
    }))
}
