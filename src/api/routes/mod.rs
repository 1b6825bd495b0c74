pub mod chat;
pub mod documents;
pub mod health;
pub mod resume;

use axum::http::{header, Method};
use axum::{middleware, routing::get, routing::post, Router};
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{error::ApiError, middleware::request_logger, state::AppState};
use crate::domain::DomainError;

pub fn create_router(state: AppState) -> Router {
    let cors = build_cors(&state.config.config.cors.allowed_origins);

    Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::readiness_check))
        .nest("/api/v1", api_v1_routes())
        .fallback(route_not_found)
        .layer(middleware::from_fn(request_logger))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn route_not_found(uri: axum::http::Uri) -> ApiError {
    DomainError::not_found(format!("No route for {}", uri.path())).into()
}

fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .expose_headers([header::CONTENT_DISPOSITION]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let origins: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(origins)
    }
}

fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .route("/chat/message", post(chat::send_message))
        .route("/chat/history/{session_id}", get(chat::get_history))
        .route("/chat/document", post(chat::upload_document))
        .route("/chat/generate-resume", post(resume::generate_resume))
        .route("/documents/search", post(documents::search_documents))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::state::Components;
    use crate::domain::{ports::CompletionService, DomainError, Message};
    use crate::infrastructure::{
        AppConfig, HashedEmbedding, InMemoryContextStore, InMemoryConversationStore, PdfWriter,
    };
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tower::ServiceExt;

    struct CannedCompletion;

    #[async_trait]
    impl CompletionService for CannedCompletion {
        async fn complete(&self, _messages: &[Message]) -> Result<String, DomainError> {
            Ok("Thanks, noted.".to_string())
        }
    }

    fn app(output_dir: &std::path::Path) -> Router {
        let mut config = AppConfig::default();
        config.config.resume.output_dir = output_dir.to_path_buf();

        let state = AppState::new(
            config,
            Components {
                embedding: Arc::new(HashedEmbedding::new(64)),
                conversations: Arc::new(InMemoryConversationStore::new()),
                context: Arc::new(InMemoryContextStore::new()),
                completion: Arc::new(CannedCompletion),
                writer: Arc::new(PdfWriter::new()),
            },
        );
        create_router(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");
    }

    #[tokio::test]
    async fn test_request_id_is_echoed() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(
                Request::get("/health")
                    .header("x-request-id", "req-42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.headers()["x-request-id"], "req-42");
    }

    #[tokio::test]
    async fn test_ready_without_redis() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(Request::get("/ready").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["redis"], "not_configured");
    }

    #[tokio::test]
    async fn test_generate_resume_blank_session_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json(
                "/api/v1/chat/generate-resume",
                json!({"session_id": ""}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_generate_resume_unknown_session_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json(
                "/api/v1/chat/generate-resume",
                json!({"session_id": "nobody"}),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            json_body(response).await["error"]["message"],
            "No chat history found for this session"
        );
    }

    #[tokio::test]
    async fn test_message_then_history_then_resume() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/chat/message",
                json!({"query": "My name is Jane Smith. I have a job at Initech."}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["response"], "Thanks, noted.");
        assert_eq!(body["resume_hint"], true);
        assert!(body["resume_message"].as_str().unwrap().contains("generate-resume"));
        let session_id = body["session_id"].as_str().unwrap().to_string();

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/api/v1/chat/history/{session_id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let history = json_body(response).await;
        let messages = history["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "user");
        assert!(messages[0].get("embedding").is_none());

        let response = app
            .oneshot(post_json(
                "/api/v1/chat/generate-resume",
                json!({"session_id": session_id}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
        let disposition = response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .to_string();
        assert!(disposition.contains("ATS_Resume_Jane_Smith.pdf"));
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[tokio::test]
    async fn test_small_talk_has_no_resume_hint() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json(
                "/api/v1/chat/message",
                json!({"query": "hello there", "session_id": "s1"}),
            ))
            .await
            .unwrap();

        let body = json_body(response).await;
        assert_eq!(body["session_id"], "s1");
        assert!(body.get("resume_hint").is_none());
    }

    #[tokio::test]
    async fn test_uploaded_document_is_searchable() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        let response = app
            .clone()
            .oneshot(post_json(
                "/api/v1/chat/document",
                json!({
                    "content": "Quantify achievements on your resume",
                    "metadata": {"source": "tips.md"}
                }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let uploaded = json_body(response).await;
        assert_eq!(uploaded["status"], "success");

        let response = app
            .oneshot(post_json(
                "/api/v1/documents/search",
                json!({"query": "resume achievements", "limit": 1}),
            ))
            .await
            .unwrap();
        let results = json_body(response).await;
        assert_eq!(results[0]["id"], uploaded["id"]);
        assert_eq!(results[0]["metadata"]["source"], "tips.md");
    }

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json("/api/v1/chat/message", json!({"session_id": "x"})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["message"], "Invalid request body");
    }

    #[tokio::test]
    async fn test_missing_content_type_uses_error_envelope() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(
                Request::post("/api/v1/chat/generate-resume")
                    .body(Body::from(r#"{"session_id":"s1"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_unknown_route_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(Request::get("/api/v1/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "NOT_FOUND");
        assert_eq!(body["error"]["message"], "No route for /api/v1/nope");
    }

    #[tokio::test]
    async fn test_blank_document_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let response = app(dir.path())
            .oneshot(post_json("/api/v1/chat/document", json!({"content": " "})))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
