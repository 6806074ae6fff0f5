//! OpenAI text-to-speech client
//!
//! Synthesizes one sentence per request. URLs are stripped from the input
//! before synthesis. Failures are soft: the caller receives `None` and
//! skips the sentence instead of aborting playback.

use crate::error::{Error, Result};
use crate::text::links;
use async_trait::async_trait;
use bytes::Bytes;
use serde::Serialize;
use std::time::Duration;

use super::SpeechSynthesizer;

const OPENAI_TTS_URL: &str = "https://api.openai.com/v1/audio/speech";
const TTS_VOICE: &str = "alloy";
const TTS_MODEL: &str = "tts-1";
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Speech synthesis request body
#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    input: &'a str,
    voice: &'a str,
    model: &'a str,
}

/// OpenAI TTS API client
pub struct OpenAiTts {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiTts {
    pub fn new(api_key: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Synthesis(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: OPENAI_TTS_URL.to_string(),
        })
    }

    /// Override the endpoint URL (used by tests against a local server)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }
}

#[async_trait]
impl SpeechSynthesizer for OpenAiTts {
    async fn synthesize(&self, sentence: &str) -> Option<Bytes> {
        let filtered = links::strip_links(sentence);

        let request = SpeechRequest {
            input: &filtered,
            voice: TTS_VOICE,
            model: TTS_MODEL,
        };

        tracing::debug!(chars = filtered.len(), "Requesting speech synthesis");

        let response = match self
            .http_client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::error!("Speech synthesis request failed: {}", e);
                return None;
            }
        };

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!(
                status = status.as_u16(),
                "Speech synthesis API error: {}",
                error_text
            );
            return None;
        }

        match response.bytes().await {
            Ok(audio) => Some(audio),
            Err(e) => {
                tracing::error!("Failed to read synthesized audio: {}", e);
                None
            }
        }
    }
}
