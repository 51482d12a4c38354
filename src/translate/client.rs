//! OpenAI-compatible chat completions client

use super::TextGenerator;
use super::error::GenerationError;
use crate::config::AiConfig;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const MAX_ERROR_BODY: usize = 200;

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Maps a non-success HTTP status to a generation error
fn handle_http_error(status_code: u16, body: &str) -> GenerationError {
    let body: String = body.chars().take(MAX_ERROR_BODY).collect();
    match status_code {
        429 => GenerationError::RateLimited,
        401 | 403 => GenerationError::Unauthorized(format!("HTTP {status_code}: {body}")),
        _ => GenerationError::Unavailable(format!("HTTP {status_code}: {body}")),
    }
}

/// Blocking client for `POST {base_url}/chat/completions`
pub struct ChatClient {
    http: Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
    temperature: f32,
    timeout_secs: u64,
}

impl ChatClient {
    /// # Errors
    ///
    /// Returns `GenerationError::Unavailable` if the HTTP client cannot be built.
    pub fn new(config: &AiConfig) -> Result<Self, GenerationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| GenerationError::Unavailable(e.to_string()))?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.resolved_api_key(),
            model: config.model.clone(),
            temperature: config.temperature,
            timeout_secs: config.timeout_secs,
        })
    }

    fn transport(&self, err: &reqwest::Error) -> GenerationError {
        if err.is_timeout() {
            GenerationError::Timeout(self.timeout_secs)
        } else {
            GenerationError::Unavailable(err.to_string())
        }
    }
}

impl TextGenerator for ChatClient {
    fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let api_key = self.api_key.as_deref().ok_or(GenerationError::MissingApiKey)?;
        let request = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: prompt }],
            temperature: self.temperature,
            response_format: ResponseFormat { kind: "json_object" },
        };

        tracing::debug!(model = %self.model, "requesting chat completion");
        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .map_err(|e| self.transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            tracing::warn!(status = status.as_u16(), "chat completion request failed");
            return Err(handle_http_error(status.as_u16(), &body));
        }

        let parsed: ChatResponse = response.json().map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout(self.timeout_secs)
            } else {
                GenerationError::InvalidResponse(e.to_string())
            }
        })?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("response contained no completion".into()))
    }
}
