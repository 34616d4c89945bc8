//! HTTP JSON API over the question-answering service.
//!
//! Exposes document registration, question answering, summarization, and
//! document removal for UI layers and scripts.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `POST` | `/documents` | Register a PDF (base64 bytes) — extract + index |
//! | `DELETE` | `/documents/{id}` | Remove a registered document |
//! | `POST` | `/ask` | Answer a question against a document |
//! | `POST` | `/summarize` | Summarize a document |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! Error responses use a machine-readable code plus a human message:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "question must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `extraction_failed` (422), `internal` (500). Answering itself never
//! errors — model and configuration failures come back as a normal
//! response carrying a fixed fallback message.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support
//! browser-based clients.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::config::Config;
use crate::extract;
use crate::index::DocumentIndex;
use crate::models::{ChatResponse, ChatTurn};
use crate::service::QaService;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    service: Arc<QaService>,
}

/// Start the HTTP server on the configured bind address.
///
/// Builds a fresh [`DocumentIndex`] and [`QaService`] from the config and
/// runs until the process is terminated. Documents live only as long as
/// the process.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let index = Arc::new(DocumentIndex::new());
    let service = Arc::new(QaService::from_config(config, index));
    run_server_with_service(&config.server.bind, service).await
}

/// Start the HTTP server over an existing service instance.
///
/// Useful for embedding the API in a host application that already owns
/// the index and model.
pub async fn run_server_with_service(
    bind_addr: &str,
    service: Arc<QaService>,
) -> anyhow::Result<()> {
    let state = AppState { service };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/documents", post(handle_register_document))
        .route("/documents/{id}", delete(handle_remove_document))
        .route("/ask", post(handle_ask))
        .route("/summarize", post(handle_summarize))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(state);

    println!("doc-qa API listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and human message.
#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn extraction_failed(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        code: "extraction_failed".to_string(),
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ POST /documents ============

#[derive(Deserialize)]
struct RegisterRequest {
    /// Optional caller-chosen id; a UUID is generated when absent.
    id: Option<String>,
    /// PDF bytes, base64-encoded (standard alphabet).
    data: String,
}

#[derive(Serialize)]
struct RegisterResponse {
    id: String,
    pages: usize,
}

/// Decode, extract, and index an uploaded PDF.
///
/// Extraction failure is fatal to this request only: nothing is
/// registered and previously indexed documents are untouched.
async fn handle_register_document(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<RegisterResponse>, AppError> {
    let bytes = base64::engine::general_purpose::STANDARD
        .decode(&req.data)
        .map_err(|e| bad_request(format!("invalid base64 document data: {}", e)))?;

    let pages = extract::extract_pages(&bytes).map_err(|e| extraction_failed(e.to_string()))?;

    let id = req.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let doc = state.service.register_document(id, pages);

    Ok(Json(RegisterResponse {
        id: doc.id.clone(),
        pages: doc.page_count(),
    }))
}

// ============ DELETE /documents/{id} ============

#[derive(Serialize)]
struct RemoveResponse {
    removed: bool,
}

async fn handle_remove_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RemoveResponse>, AppError> {
    if !state.service.remove_document(&id) {
        return Err(not_found(format!("no document registered with id: {}", id)));
    }
    Ok(Json(RemoveResponse { removed: true }))
}

// ============ POST /ask ============

#[derive(Deserialize)]
struct AskRequest {
    document_id: String,
    question: String,
    /// Prior conversation turns; only the most recent window is used.
    #[serde(default)]
    history: Vec<ChatTurn>,
}

/// Answer a question. Always returns 200 with a displayable response —
/// an unknown document or model failure yields the service's fixed
/// fallback message, not an HTTP error.
async fn handle_ask(
    State(state): State<AppState>,
    Json(req): Json<AskRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    if req.question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }

    let response = state
        .service
        .answer_query(&req.question, &req.document_id, &req.history)
        .await;

    Ok(Json(response))
}

// ============ POST /summarize ============

#[derive(Deserialize)]
struct SummarizeRequest {
    document_id: String,
}

#[derive(Serialize)]
struct SummarizeResponse {
    summary: String,
}

async fn handle_summarize(
    State(state): State<AppState>,
    Json(req): Json<SummarizeRequest>,
) -> Result<Json<SummarizeResponse>, AppError> {
    let summary = state.service.summarize_document(&req.document_id).await;
    Ok(Json(SummarizeResponse { summary }))
}
