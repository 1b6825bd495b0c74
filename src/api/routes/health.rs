use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub redis: String,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".into(),
        version: env!("CARGO_PKG_VERSION").into(),
    })
}

pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, (StatusCode, Json<ReadinessResponse>)> {
    let redis_status = match &state.redis {
        None => "not_configured",
        Some(store) => match store.ping().await {
            Ok(()) => "connected",
            Err(e) => {
                tracing::warn!(error = %e, "redis ping failed");
                "disconnected"
            }
        },
    };

    if redis_status == "disconnected" {
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ReadinessResponse {
                status: "not_ready".into(),
                redis: redis_status.into(),
            }),
        ));
    }

    Ok(Json(ReadinessResponse {
        status: "ready".into(),
        redis: redis_status.into(),
    }))
}
