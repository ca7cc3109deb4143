//! Structured-output AI provider abstraction and the OpenAI implementation.

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::classify::ProviderFailure;
use super::retry::retry_with_backoff;
use crate::error::AppError;
use crate::preflight::API_KEY_ENV_VAR;

/// Default OpenAI-compatible endpoint.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Environment variable overriding the endpoint.
pub const BASE_URL_ENV_VAR: &str = "OPENAI_BASE_URL";

/// Limit on establishing the connection. Generation itself is never cut off.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// A request for a JSON object matching `schema`.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub schema_name: String,
    pub schema: Value,
}

/// Source of schema-constrained completions.
///
/// Returns the raw JSON text of the generated object; validating it against
/// the schema is the caller's job.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AiProvider: Send + Sync {
    async fn generate_object(&self, request: &StructuredRequest)
    -> Result<String, ProviderFailure>;
}

/// Chat-completions client with strict JSON-schema response format.
pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    /// Build a provider for `api_key` against [`DEFAULT_BASE_URL`].
    pub fn new(api_key: impl Into<String>) -> Result<Self, AppError> {
        let client = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| AppError::unknown_with("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Build a provider from `OPENAI_API_KEY` and the optional `OPENAI_BASE_URL`.
    ///
    /// A missing key is not an error here; `preflight::validate` reports it.
    pub fn from_env() -> Result<Self, AppError> {
        let api_key = env::var(API_KEY_ENV_VAR).unwrap_or_default();
        let provider = Self::new(api_key)?;
        match env::var(BASE_URL_ENV_VAR) {
            Ok(url) if !url.trim().is_empty() => Ok(provider.with_base_url(url)),
            _ => Ok(provider),
        }
    }

    /// Point at an OpenAI-compatible endpoint (Azure, proxies, local servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    async fn request_once(&self, request: &StructuredRequest) -> Result<String, AttemptError> {
        let body = ChatRequest {
            model: &request.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: &request.schema_name,
                    strict: true,
                    schema: &request.schema,
                },
            },
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let transient = e.is_connect() || e.is_timeout();
                AttemptError {
                    failure: ProviderFailure::ApiCall(format!("AI_APICallError: {e}")),
                    transient,
                }
            })?;

        let status = response.status();
        debug!("Provider responded with HTTP {}", status);

        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(AttemptError {
                failure: ProviderFailure::ApiCall(api_error_text(status, &text)),
                transient: status.is_server_error(),
            });
        }

        let envelope: ChatResponse = response.json().await.map_err(|e| AttemptError {
            failure: ProviderFailure::Other(format!("Failed to decode provider response: {e}")),
            transient: false,
        })?;

        let message = envelope
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| AttemptError {
                failure: ProviderFailure::Other("Provider response contained no choices".into()),
                transient: false,
            })?;

        if let Some(refusal) = message.refusal {
            return Err(AttemptError {
                failure: ProviderFailure::ApiCall(format!("AI_APICallError: model refused: {refusal}")),
                transient: false,
            });
        }

        message.content.ok_or_else(|| AttemptError {
            failure: ProviderFailure::Other("Provider response contained no content".into()),
            transient: false,
        })
    }
}

#[async_trait]
impl AiProvider for OpenAiProvider {
    async fn generate_object(
        &self,
        request: &StructuredRequest,
    ) -> Result<String, ProviderFailure> {
        retry_with_backoff(|| self.request_once(request), |e| e.transient)
            .await
            .map_err(|e| e.failure)
    }
}

/// One failed request, tagged with whether retrying could help.
#[derive(Debug)]
struct AttemptError {
    failure: ProviderFailure,
    transient: bool,
}

/// Render an error response as `AI_APICallError: <message> (<code>)`.
///
/// The code's underscores become spaces so `model_not_found` reads as
/// "model not found".
fn api_error_text(status: StatusCode, body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let detail = envelope.error;
            match detail.code.as_deref().filter(|c| !c.is_empty()) {
                Some(code) => format!(
                    "AI_APICallError: {} ({})",
                    detail.message,
                    code.replace('_', " ")
                ),
                None => format!("AI_APICallError: {}", detail.message),
            }
        }
        Err(_) => format!("AI_APICallError: HTTP {}: {}", status, body.trim()),
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat<'a>,
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat<'a> {
    name: &'a str,
    strict: bool,
    schema: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
    #[serde(default)]
    code: Option<String>,
}
