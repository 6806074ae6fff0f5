//! HTTP server setup and routing
//!
//! Sets up the Axum router with control endpoints and the SSE stream.

use crate::ingest::DocumentStore;
use crate::playback::ReaderSession;
use crate::remote::ChatCompleter;
use crate::state::SharedState;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Shared application context passed to all handlers
#[derive(Clone)]
pub struct AppContext {
    pub state: Arc<SharedState>,
    pub session: Arc<ReaderSession>,
    pub chat: Arc<dyn ChatCompleter>,
    pub documents: DocumentStore,
    /// Client used for document downloads
    pub http_client: reqwest::Client,
}

/// Create the API router
pub fn create_router(ctx: AppContext) -> Router {
    Router::new()
        // Health endpoint
        .route("/health", get(super::handlers::health))
        // Playback control
        .route("/playback/start", post(super::handlers::start_playback))
        .route("/playback/pause", post(super::handlers::pause_playback))
        .route("/playback/resume", post(super::handlers::resume_playback))
        .route("/playback/stop", post(super::handlers::stop_playback))
        .route(
            "/playback/link_result",
            post(super::handlers::link_detection_result),
        )
        // Q&A side channel and ad-hoc question checks
        .route("/chat/question", post(super::handlers::submit_question))
        .route("/question/check", post(super::handlers::check_question))
        // Document ingestion
        .route("/document", post(super::handlers::load_document))
        // SSE event stream
        .route("/events", get(super::sse::event_stream))
        // Attach application context
        .with_state(ctx)
        // Enable CORS for local access
        .layer(CorsLayer::permissive())
}
