//! Reader (lectern-rd) - Main entry point
//!
//! HTTP/SSE service that reads a stored document aloud, sentence by
//! sentence, via a remote TTS endpoint, pausing on detected questions and
//! embedded links, with a chat-completion Q&A side channel.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lectern_rd::api;
use lectern_rd::config::Config;
use lectern_rd::ingest::DocumentStore;
use lectern_rd::playback::ReaderSession;
use lectern_rd::remote::{OpenAiChat, OpenAiTts};
use lectern_rd::state::SharedState;

/// Command-line arguments for lectern-rd
#[derive(Parser, Debug)]
#[command(name = "lectern-rd")]
#[command(about = "Document read-aloud service for Lectern")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value = "5750", env = "LECTERN_RD_PORT")]
    port: u16,

    /// Root folder for stored documents
    #[arg(short, long)]
    root_folder: Option<String>,

    /// OpenAI API key for TTS and chat completion
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    /// Playback speed factor applied to pacing
    #[arg(long, default_value = "1.0", env = "LECTERN_SPEECH_SPEED")]
    speech_speed: f32,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lectern_rd=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse command-line arguments
    let args = Args::parse();

    if args.speech_speed <= 0.0 {
        bail!("speech speed must be greater than zero");
    }

    let root_folder = lectern_common::config::resolve_root_folder(
        args.root_folder.as_deref(),
        "LECTERN_ROOT_FOLDER",
        Some("root_folder"),
    )
    .context("Failed to resolve root folder")?;

    let config = Config {
        root_folder,
        port: args.port,
        speech_speed: args.speech_speed,
    };

    info!("Starting Lectern Reader on port {}", config.port);
    info!("Root folder: {}", config.root_folder.display());

    // Shared state and collaborators
    let state = Arc::new(SharedState::new());
    let documents = DocumentStore::new(config.root_folder.clone());

    let synthesizer = Arc::new(
        OpenAiTts::new(args.openai_api_key.clone())
            .context("Failed to create speech synthesis client")?,
    );
    let chat = Arc::new(
        OpenAiChat::new(args.openai_api_key.clone())
            .context("Failed to create chat completion client")?,
    );

    let session = Arc::new(ReaderSession::new(
        Arc::clone(&state),
        synthesizer,
        documents.clone(),
        config.speech_speed,
    ));

    // Build the application router
    let ctx = api::AppContext {
        state,
        session,
        chat,
        documents,
        http_client: reqwest::Client::new(),
    };

    let app = api::create_router(ctx);

    // Create socket address
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("Starting HTTP server on {}", addr);

    // Create and run the server
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
