//! OpenAI chat-completion client for the Q&A side channel
//!
//! Builds a fixed two-turn tutoring prompt around the submitted question.
//! This channel never raises to its caller: any failure yields a literal
//! error payload instead.

use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::ChatCompleter;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const CHAT_MODEL: &str = "gpt-3.5-turbo";
const CHAT_TEMPERATURE: f32 = 0.2;
const REQUEST_TIMEOUT_SECS: u64 = 30;

const SYSTEM_PROMPT: &str =
    "you are a tutor. Please read questions and help students determine answers one question at a time.";

/// Returned whenever the remote call fails, in place of an answer
const ERROR_PAYLOAD: &[u8] = b"Error in API request";

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    messages: Vec<ChatMessage<'a>>,
    model: &'a str,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

/// Build the fixed two-turn prompt for a submitted question
fn build_messages(question: &str) -> Vec<ChatMessage<'static>> {
    vec![
        ChatMessage {
            role: "system",
            content: SYSTEM_PROMPT.to_string(),
        },
        ChatMessage {
            role: "user",
            content: format!("Teacher, {}", question),
        },
    ]
}

/// OpenAI chat-completion API client
pub struct OpenAiChat {
    http_client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl OpenAiChat {
    pub fn new(api_key: String) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| Error::Chat(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            base_url: OPENAI_CHAT_URL.to_string(),
        })
    }

    /// Override the endpoint URL (used by tests against a local server)
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    async fn request_answer(&self, question: &str) -> Result<String> {
        let request = ChatRequest {
            messages: build_messages(question),
            model: CHAT_MODEL,
            temperature: CHAT_TEMPERATURE,
        };

        let response = self
            .http_client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Chat(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(Error::Chat(format!(
                "API error {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Chat(e.to_string()))?;

        chat_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| Error::Chat("empty choices in response".to_string()))
    }
}

#[async_trait]
impl ChatCompleter for OpenAiChat {
    async fn answer(&self, question: &str) -> Bytes {
        match self.request_answer(question).await {
            Ok(answer) => Bytes::from(answer.into_bytes()),
            Err(e) => {
                tracing::error!("Chat completion failed: {}", e);
                Bytes::from_static(ERROR_PAYLOAD)
            }
        }
    }
}
