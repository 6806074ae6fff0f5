//! Remote API adapters
//!
//! Wraps the remote text-to-speech and chat-completion endpoints behind
//! object-safe traits so the playback engine and the Q&A channel can be
//! driven by scripted stand-ins in tests.

pub mod chat;
pub mod tts;

use async_trait::async_trait;
use bytes::Bytes;

pub use chat::OpenAiChat;
pub use tts::OpenAiTts;

/// Remote speech synthesis seam.
///
/// `None` is a soft failure: the caller skips the sentence and keeps going.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, sentence: &str) -> Option<Bytes>;
}

/// Q&A side-channel seam.
///
/// Never fails: remote errors are mapped to a literal error payload.
#[async_trait]
pub trait ChatCompleter: Send + Sync {
    async fn answer(&self, question: &str) -> Bytes;
}
