//! HTTP request handlers
//!
//! Implements the control endpoints for playback, link decisions, the Q&A
//! side channel, and document ingestion. Payloads are explicit typed
//! structs; malformed bodies are rejected here and never reach the
//! playback engine.

use crate::api::server::AppContext;
use axum::{extract::State, http::StatusCode, Json};
use lectern_common::events::ReaderEvent;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: String,
    module: String,
    version: String,
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
pub struct LinkDetectionResult {
    url_detected: bool,
}

#[derive(Debug, Deserialize)]
pub struct QuestionRequest {
    question: String,
}

#[derive(Debug, Serialize)]
pub struct ChatAnswerResponse {
    response: String,
}

#[derive(Debug, Deserialize)]
pub struct SentenceRequest {
    sentence: String,
}

#[derive(Debug, Serialize)]
pub struct QuestionCheckResponse {
    is_question: bool,
}

#[derive(Debug, Deserialize)]
pub struct DocumentRequest {
    document_url: String,
}

#[derive(Debug, Serialize)]
pub struct DocumentResponse {
    status: String,
    path: String,
}

// ============================================================================
// Health Endpoint
// ============================================================================

/// GET /health - Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        module: "reader".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============================================================================
// Playback Control Endpoints
// ============================================================================

/// POST /playback/start - Begin reading the stored document
pub async fn start_playback(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    info!("Start playback request");
    ctx.session.start().await;
    Json(StatusResponse {
        status: "playing".to_string(),
    })
}

/// POST /playback/pause - Pause at the next sentence boundary
pub async fn pause_playback(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    info!("Pause playback request");
    ctx.session.pause();
    Json(StatusResponse {
        status: "paused".to_string(),
    })
}

/// POST /playback/resume - Resume from the current sentence
pub async fn resume_playback(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    info!("Resume playback request");
    ctx.session.resume().await;
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

/// POST /playback/stop - Force termination
pub async fn stop_playback(State(ctx): State<AppContext>) -> Json<StatusResponse> {
    info!("Stop playback request");
    ctx.session.stop().await;

    // Explicit stopped notification, independent of loop state
    ctx.state.broadcast_event(ReaderEvent::StatusChanged {
        state: lectern_common::events::PlaybackState::Stopped,
        timestamp: chrono::Utc::now(),
    });

    Json(StatusResponse {
        status: "stopped".to_string(),
    })
}

/// POST /playback/link_result - Resolve the pending link suspension
///
/// `url_detected: true` means the client handled the link, so the sentence
/// is not spoken and playback pauses (resume = !url_detected).
pub async fn link_detection_result(
    State(ctx): State<AppContext>,
    Json(req): Json<LinkDetectionResult>,
) -> Json<StatusResponse> {
    info!(url_detected = req.url_detected, "Link detection result");
    ctx.session.resolve_link_detection(req.url_detected);
    Json(StatusResponse {
        status: "ok".to_string(),
    })
}

// ============================================================================
// Q&A Side Channel
// ============================================================================

/// POST /chat/question - Answer a reader question
///
/// Independent of playback state. The answer is returned in the response
/// body and also emitted as a ChatResponse event for SSE listeners.
pub async fn submit_question(
    State(ctx): State<AppContext>,
    Json(req): Json<QuestionRequest>,
) -> Json<ChatAnswerResponse> {
    info!("Question submitted");
    let answer = ctx.chat.answer(&req.question).await;
    let text = String::from_utf8_lossy(&answer).into_owned();

    ctx.state.broadcast_event(ReaderEvent::ChatResponse {
        text: text.clone(),
        timestamp: chrono::Utc::now(),
    });

    Json(ChatAnswerResponse { response: text })
}

/// POST /question/check - Classify a sentence as question or not
pub async fn check_question(
    State(ctx): State<AppContext>,
    Json(req): Json<SentenceRequest>,
) -> Json<QuestionCheckResponse> {
    let is_question = crate::text::is_question(&req.sentence);

    ctx.state.broadcast_event(ReaderEvent::QuestionResult {
        is_question,
        timestamp: chrono::Utc::now(),
    });

    Json(QuestionCheckResponse { is_question })
}

// ============================================================================
// Document Ingestion
// ============================================================================

/// POST /document - Fetch a document and store it for reading
///
/// Accepts either a direct URL or a viewer-style link carrying the real
/// location in its `url` query parameter.
pub async fn load_document(
    State(ctx): State<AppContext>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<DocumentResponse>, (StatusCode, Json<StatusResponse>)> {
    info!("Document load request");

    match ctx.documents.fetch(&ctx.http_client, &req.document_url).await {
        Ok(path) => {
            let path = path.to_string_lossy().into_owned();
            ctx.state.broadcast_event(ReaderEvent::DocumentLoaded {
                path: path.clone(),
                timestamp: chrono::Utc::now(),
            });
            Ok(Json(DocumentResponse {
                status: "ok".to_string(),
                path,
            }))
        }
        Err(e) => {
            error!("Failed to load document: {}", e);
            Err((
                StatusCode::BAD_GATEWAY,
                Json(StatusResponse {
                    status: format!("error: {}", e),
                }),
            ))
        }
    }
}
