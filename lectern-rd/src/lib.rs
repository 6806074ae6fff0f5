//! # Lectern Reader Service Library (lectern-rd)
//!
//! Reads a stored document aloud, sentence by sentence, over an HTTP/SSE
//! control interface.
//!
//! **Purpose:** Segment extracted document text into sentences, synthesize
//! each sentence via a remote TTS endpoint, stream the audio to clients as
//! SSE events, and pause on detected questions or embedded links. A Q&A
//! side channel answers reader questions through a chat-completion endpoint.

pub mod api;
pub mod config;
pub mod error;
pub mod ingest;
pub mod playback;
pub mod remote;
pub mod state;
pub mod text;

pub use error::{Error, Result};
pub use state::SharedState;
