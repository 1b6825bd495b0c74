use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::{error::ApiError, extract::ApiJson, state::AppState};
use crate::domain::{Metadata, SearchResult};

#[derive(Debug, Deserialize)]
pub struct SearchDocumentsRequest {
    pub query: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct SearchResultResponse {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    pub distance: f32,
}

impl From<SearchResult> for SearchResultResponse {
    fn from(result: SearchResult) -> Self {
        Self {
            id: result.document.id,
            content: result.document.content,
            metadata: result.document.metadata,
            distance: result.distance,
        }
    }
}

pub async fn search_documents(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SearchDocumentsRequest>,
) -> Result<Json<Vec<SearchResultResponse>>, ApiError> {
    let top_k = request.limit.unwrap_or_else(|| state.rag.default_top_k());
    let results = state.rag.retrieve_top_k(&request.query, top_k).await?;

    Ok(Json(results.into_iter().map(Into::into).collect()))
}
