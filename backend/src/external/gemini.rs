//! Gemini text generation client
//!
//! Client for the hosted Gemini `generateContent` API. Transient failures
//! (rate limiting, overload, timeouts) are retried with exponential backoff.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;
use crate::error::{AppError, AppResult};

/// Something that turns a prompt into generated text
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> impl Future<Output = AppResult<String>> + Send;
}

/// Client for the Gemini API
#[derive(Clone)]
pub struct GeminiClient {
    http_client: Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_retries: u32,
    retry_base_delay: Duration,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

/// Response from `generateContent`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Outcome of a single failed attempt
#[derive(Debug)]
enum AttemptError {
    Transient(String),
    Permanent(String),
}

impl GeminiClient {
    /// Build a client from configuration. Returns `None` when no API key is set.
    pub fn from_config(config: &GeminiConfig) -> AppResult<Option<Self>> {
        let Some(api_key) = config.api_key() else {
            return Ok(None);
        };

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Some(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_retries: config.max_retries,
            retry_base_delay: Duration::from_millis(config.retry_base_delay_ms),
        }))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.base_url, self.model)
    }

    fn retry_delay(&self, attempt: u32) -> Duration {
        self.retry_base_delay
            .saturating_mul(2u32.saturating_pow(attempt))
    }

    async fn request_once(&self, body: &GenerateContentRequest<'_>) -> Result<String, AttemptError> {
        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                let message = format!("Request failed: {}", e);
                if e.is_timeout() || e.is_connect() || e.is_request() {
                    AttemptError::Transient(message)
                } else {
                    AttemptError::Permanent(message)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = format!("API returned {}: {}", status, body);
            return Err(if is_transient_status(status) {
                AttemptError::Transient(message)
            } else {
                AttemptError::Permanent(message)
            });
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::Permanent(format!("Failed to parse response: {}", e)))?;

        extract_text(parsed).map_err(AttemptError::Permanent)
    }
}

impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> AppResult<String> {
        let body = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
            },
        };

        let mut last_error = String::new();
        for attempt in 0..=self.max_retries {
            match self.request_once(&body).await {
                Ok(text) => return Ok(text),
                Err(AttemptError::Permanent(message)) => {
                    return Err(AppError::AiProviderError(message));
                }
                Err(AttemptError::Transient(message)) => {
                    tracing::warn!(
                        model = %self.model,
                        attempt = attempt + 1,
                        error = %message,
                        "Gemini request failed"
                    );
                    last_error = message;
                    if attempt < self.max_retries {
                        tokio::time::sleep(self.retry_delay(attempt)).await;
                    }
                }
            }
        }

        Err(AppError::AiProviderUnavailable(last_error))
    }
}

/// Rate limiting and server-side overload are worth retrying
fn is_transient_status(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT
    )
}

/// Concatenate the text parts of the first candidate
fn extract_text(response: GenerateContentResponse) -> Result<String, String> {
    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| "Response contained no candidates".to_string())?;

    let text: String = candidate
        .content
        .map(|content| content.parts)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|part| part.text)
        .collect();

    if text.is_empty() {
        return Err(format!(
            "Response contained no text (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ));
    }
    Ok(text)
}
