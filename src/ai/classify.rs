//! Provider failure classification.
//!
//! The matching table lives in [`classify`] alone: a case-insensitive literal
//! substring search over the provider's raw error text, in priority order.

use thiserror::Error;

use crate::preflight::API_KEY_ENV_VAR;

/// Raw failure reported by an [`AiProvider`](super::AiProvider).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    /// The provider call itself failed; carries the provider's error text.
    ApiCall(String),
    /// Anything else (request building, malformed envelope, ...).
    Other(String),
}

/// Classified AI provider failure.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    #[error("Invalid API key. Check that {} holds a valid key.", API_KEY_ENV_VAR)]
    InvalidCredential,

    #[error("Rate limit reached. Wait a moment and retry, or check your usage limits.")]
    RateLimited,

    #[error("Model '{model}' not found. Check the model name and that your account has access to it.")]
    ModelNotFound { model: String },

    #[error("Insufficient quota. Check the billing details of your AI provider account.")]
    QuotaExceeded,

    #[error("AI provider error: {0}")]
    Provider(String),

    #[error("AI generation failed unexpectedly: {0}")]
    Unknown(String),
}

/// Map a provider failure onto the stable error taxonomy.
///
/// Unmatched provider text is passed through verbatim as [`AiError::Provider`].
pub fn classify(failure: &ProviderFailure, model: &str) -> AiError {
    let message = match failure {
        ProviderFailure::ApiCall(message) => message,
        ProviderFailure::Other(detail) => return AiError::Unknown(detail.clone()),
    };

    let lower = message.to_lowercase();
    if lower.contains("incorrect api key") {
        AiError::InvalidCredential
    } else if lower.contains("rate limit") {
        AiError::RateLimited
    } else if lower.contains("model not found") {
        AiError::ModelNotFound {
            model: model.to_string(),
        }
    } else if lower.contains("insufficient quota") {
        AiError::QuotaExceeded
    } else {
        AiError::Provider(message.clone())
    }
}
