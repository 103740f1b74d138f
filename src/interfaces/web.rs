//! Browser front end: the question page plus a small JSON API behind it.
//!
//! | Route            | Purpose                                   |
//! |------------------|-------------------------------------------|
//! | `GET /`          | question page                             |
//! | `POST /api/ask`  | run the analysis pipeline for a question  |
//! | `POST /api/search` | raw similarity search over the reviews  |
//! | `GET /api/stats` | store and dataset statistics              |
//! | `GET /health`    | liveness probe                            |

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::{
    application::{AskRequest, AskResponse, SearchRequest, SearchResponse, StatsResponse},
    domain::DomainError,
    AppHandles,
};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    code: String,
}

/// Domain failures rendered as `{ error, code }` with a matching status.
struct ApiError(DomainError);

impl From<DomainError> for ApiError {
    fn from(value: DomainError) -> Self {
        Self(value)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        Self(DomainError::validation(format!(
            "invalid request body: {}",
            value.body_text()
        )))
    }
}

impl From<tokio::task::JoinError> for ApiError {
    fn from(value: tokio::task::JoinError) -> Self {
        Self(DomainError::other(format!("worker task failed: {value}")))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            DomainError::Validation(_) | DomainError::LimitExceeded(_) => StatusCode::BAD_REQUEST,
            DomainError::NotFound(_) => StatusCode::NOT_FOUND,
            DomainError::Llm(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            error!(code = self.0.code(), "request failed: {}", self.0);
        }

        let body = ErrorResponse {
            error: self.0.to_string(),
            code: self.0.code().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn health_check(
    State(handles): State<Arc<AppHandles>>,
) -> Result<impl IntoResponse, ApiError> {
    let reviews = Arc::clone(&handles.reviews);
    tokio::task::spawn_blocking(move || reviews.health()).await??;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": "adtarget"
    })))
}

async fn ask(
    State(handles): State<Arc<AppHandles>>,
    payload: Result<Json<AskRequest>, JsonRejection>,
) -> Result<Json<AskResponse>, ApiError> {
    let Json(payload) = payload?;
    let supervisor = Arc::clone(&handles.supervisor);
    let outcome =
        tokio::task::spawn_blocking(move || supervisor.process_question(&payload.question))
            .await??;
    Ok(Json(AskResponse::from(outcome)))
}

async fn search(
    State(handles): State<Arc<AppHandles>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(payload) = payload?;
    let reviews = Arc::clone(&handles.reviews);
    let response = tokio::task::spawn_blocking(move || reviews.search(payload)).await??;
    Ok(Json(response))
}

async fn stats(State(handles): State<Arc<AppHandles>>) -> Result<Json<StatsResponse>, ApiError> {
    let response = tokio::task::spawn_blocking(move || handles.stats()).await??;
    Ok(Json(response))
}

pub fn router(handles: Arc<AppHandles>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/api/ask", post(ask))
        .route("/api/search", post(search))
        .route("/api/stats", get(stats))
        .layer(TraceLayer::new_for_http())
        .with_state(handles)
}

/// Binds `addr` and serves until `shutdown` is cancelled.
pub async fn serve(
    handles: Arc<AppHandles>,
    addr: SocketAddr,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    serve_on(listener, handles, shutdown).await
}

pub async fn serve_on(
    listener: TcpListener,
    handles: Arc<AppHandles>,
    shutdown: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("🚀 AdTargeting Assistant listening on http://{addr}");
    info!("📊 Health check: http://{addr}/health");

    axum::serve(listener, router(handles))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .context("web server failed")?;

    info!("web server stopped");
    Ok(())
}
