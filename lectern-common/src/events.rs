//! Event types for the Lectern event system
//!
//! Every outbound notification the reader service produces is a `ReaderEvent`.
//! Events are broadcast on a tokio channel and serialized to JSON for the SSE
//! stream, using the enum tag as the SSE event name.

use serde::{Deserialize, Serialize};

/// Playback status as reported to clients
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackState {
    Playing,
    Paused,
    Stopped,
}

impl std::fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlaybackState::Playing => write!(f, "playing"),
            PlaybackState::Paused => write!(f, "paused"),
            PlaybackState::Stopped => write!(f, "stopped"),
        }
    }
}

/// Lectern event types
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ReaderEvent {
    /// Playback status changed (playing / paused / stopped)
    StatusChanged {
        state: PlaybackState,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Synthesized audio for one sentence
    AudioChunk {
        /// Raw audio bytes, base64 in the JSON encoding
        #[serde(with = "base64_bytes")]
        data: Vec<u8>,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A sentence about to be spoken contains a URL; playback is suspended
    /// until the client answers with a link detection result
    RequestLinkDetection {
        sentence: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Result of a question classification
    QuestionResult {
        is_question: bool,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// Answer from the Q&A side channel
    ChatResponse {
        text: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },

    /// A document was fetched and stored for reading
    DocumentLoaded {
        path: String,
        timestamp: chrono::DateTime<chrono::Utc>,
    },
}

impl ReaderEvent {
    /// Get event type as string for the SSE event field
    pub fn event_type(&self) -> &'static str {
        match self {
            ReaderEvent::StatusChanged { .. } => "StatusChanged",
            ReaderEvent::AudioChunk { .. } => "AudioChunk",
            ReaderEvent::RequestLinkDetection { .. } => "RequestLinkDetection",
            ReaderEvent::QuestionResult { .. } => "QuestionResult",
            ReaderEvent::ChatResponse { .. } => "ChatResponse",
            ReaderEvent::DocumentLoaded { .. } => "DocumentLoaded",
        }
    }
}

/// Serde helper: audio bytes as standard base64 strings in JSON
mod base64_bytes {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}
