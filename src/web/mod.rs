//! HTTP surface: landing page, processing endpoint, notes pages and health.

mod pages;

pub use pages::{render_home, render_notes};

use crate::error::LectureMindError;
use crate::orchestrator::Orchestrator;
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::error;

/// Shared application state.
pub struct AppState {
    pub orchestrator: Orchestrator,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator) -> Self {
        Self { orchestrator }
    }
}

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(home))
        .route("/process", post(process))
        .route("/notes/{id}", get(notes))
        .route("/export/{id}", get(export))
        .route("/lectures", get(list_lectures))
        .route("/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// Path of the notes page for a lecture.
pub fn notes_path(id: &str) -> String {
    format!("/notes/{}", id)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct ProcessRequest {
    url: Option<String>,
}

#[derive(Serialize)]
struct ProcessResponse {
    success: bool,
    redirect: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn home() -> impl IntoResponse {
    Html(render_home())
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "OK" }))
}

async fn process(
    State(state): State<Arc<AppState>>,
    body: Result<Json<ProcessRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match body {
        Ok(body) => body,
        Err(rejection) => {
            return error_response(
                StatusCode::BAD_REQUEST,
                format!("Invalid request body: {}", rejection.body_text()),
            )
        }
    };

    let Some(url) = req.url.filter(|u| !u.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'url' field");
    };

    match state.orchestrator.process(&url).await {
        Ok(record) => Json(ProcessResponse {
            success: true,
            redirect: notes_path(&record.id),
        })
        .into_response(),
        Err(LectureMindError::InvalidInput(message)) => {
            error_response(StatusCode::BAD_REQUEST, message)
        }
        Err(e) => {
            error!("Processing {} failed: {}", url, e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn notes(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.orchestrator.lecture(&id) {
        Ok(record) => Html(render_notes(&record)).into_response(),
        Err(_) => (StatusCode::NOT_FOUND, "Lecture not found").into_response(),
    }
}

async fn export(State(state): State<Arc<AppState>>, Path(id): Path<String>) -> Response {
    match state.orchestrator.lecture(&id) {
        Ok(record) => Json(record).into_response(),
        Err(e) => error_response(StatusCode::NOT_FOUND, e.to_string()),
    }
}

async fn list_lectures(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let lectures = state.orchestrator.store().list();
    Json(serde_json::json!({
        "total": lectures.len(),
        "lectures": lectures,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Prompts;
    use crate::error::UpstreamFailure;
    use crate::study::testing::{ScriptedModel, ANALYSIS_REPLY, QUIZ_REPLY};
    use crate::test_support::spawn_app;
    use crate::youtube::testing::{FixedMetadata, FixedTranscript};
    use serde_json::Value;

    async fn spawn(transcript: FixedTranscript) -> (String, Arc<AppState>) {
        let model = Arc::new(ScriptedModel::new(Ok(ANALYSIS_REPLY), Ok(QUIZ_REPLY)));
        let orchestrator = Orchestrator::with_components(
            Arc::new(FixedMetadata::titled("Thermodynamics")),
            Arc::new(transcript),
            model,
            Prompts::default(),
            10,
        );
        let state = Arc::new(AppState::new(orchestrator));
        let base = spawn_app(router(state.clone())).await;
        (base, state)
    }

    async fn post_process(base: &str, body: Value) -> reqwest::Response {
        reqwest::Client::new()
            .post(format!("{}/process", base))
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (base, _) = spawn(FixedTranscript(Ok(vec!["x"]))).await;
        let response = reqwest::get(format!("{}/health", base)).await.unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, serde_json::json!({"status": "OK"}));
    }

    #[tokio::test]
    async fn test_home_page() {
        let (base, _) = spawn(FixedTranscript(Ok(vec!["x"]))).await;
        let response = reqwest::get(format!("{}/", base)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert!(response.text().await.unwrap().contains("Generate Notes"));
    }

    #[tokio::test]
    async fn test_process_invalid_url() {
        let (base, state) = spawn(FixedTranscript(Ok(vec!["x"]))).await;
        let response = post_process(&base, serde_json::json!({"url": "not a url"})).await;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Invalid YouTube URL");
        assert!(state.orchestrator.store().is_empty());
    }

    #[tokio::test]
    async fn test_process_missing_url() {
        let (base, _) = spawn(FixedTranscript(Ok(vec!["x"]))).await;
        let response = post_process(&base, serde_json::json!({})).await;
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_process_malformed_body() {
        let (base, _) = spawn(FixedTranscript(Ok(vec!["x"]))).await;
        let response = reqwest::Client::new()
            .post(format!("{}/process", base))
            .header("content-type", "application/json")
            .body("{not json")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_process_then_view_notes() {
        let (base, state) = spawn(FixedTranscript(Ok(vec!["heat", "engines"]))).await;
        let response = post_process(
            &base,
            serde_json::json!({"url": "https://www.youtube.com/watch?v=dQw4w9WgXcQ"}),
        )
        .await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);

        let redirect = body["redirect"].as_str().unwrap().to_string();
        assert!(redirect.starts_with("/notes/"));
        assert_eq!(state.orchestrator.store().len(), 1);

        let page = reqwest::get(format!("{}{}", base, redirect)).await.unwrap();
        assert_eq!(page.status(), 200);
        let html = page.text().await.unwrap();
        assert!(html.contains("Thermodynamics"));
        assert!(html.contains("Epsilon-delta"));

        let id = redirect.trim_start_matches("/notes/");
        let export = reqwest::get(format!("{}/export/{}", base, id)).await.unwrap();
        assert_eq!(export.status(), 200);
        let record: Value = export.json().await.unwrap();
        assert_eq!(record["id"], id);
        assert_eq!(record["text_source"], "transcript");

        let listing: Value = reqwest::get(format!("{}/lectures", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(listing["total"], 1);
    }

    #[tokio::test]
    async fn test_process_without_captions_succeeds() {
        let (base, state) =
            spawn(FixedTranscript(Err(UpstreamFailure::NoData("captions disabled".into())))).await;
        let response = post_process(
            &base,
            serde_json::json!({"url": "https://youtu.be/dQw4w9WgXcQ"}),
        )
        .await;
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);

        let summaries = state.orchestrator.store().list();
        let record = state.orchestrator.lecture(&summaries[0].id).unwrap();
        assert_eq!(record.text_source, crate::store::TextSource::Metadata);
    }

    #[tokio::test]
    async fn test_unknown_lecture() {
        let (base, _) = spawn(FixedTranscript(Ok(vec!["x"]))).await;

        let response = reqwest::get(format!("{}/notes/does-not-exist", base)).await.unwrap();
        assert_eq!(response.status(), 404);
        assert_eq!(response.text().await.unwrap(), "Lecture not found");

        let response = reqwest::get(format!("{}/export/does-not-exist", base)).await.unwrap();
        assert_eq!(response.status(), 404);
    }
}
