//! Schema-validated artifact generation.

use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, warn};

use super::classify::classify;
use super::prompt::{MAX_TITLE_CHARS, SYSTEM_PROMPT, build_commit_prompt, build_pr_prompt};
use super::provider::{AiProvider, StructuredRequest};
use super::{ArtifactKind, GeneratedArtifact};
use crate::error::AppError;

/// JSON schema every response must satisfy.
const ARTIFACT_SCHEMA: &str = r#"{
  "type": "object",
  "properties": {
    "title": { "type": "string" },
    "body": { "type": "string" }
  },
  "required": ["title", "body"],
  "additionalProperties": false
}"#;

const SCHEMA_NAME: &str = "generated_artifact";

/// Context handed to the model, by artifact kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextPayload {
    PullRequest {
        current_branch: String,
        base_branch: String,
        commit_log: String,
        diff: String,
    },
    Commit {
        staged_diff: String,
    },
}

impl ContextPayload {
    pub fn kind(&self) -> ArtifactKind {
        match self {
            ContextPayload::PullRequest { .. } => ArtifactKind::PullRequest,
            ContextPayload::Commit { .. } => ArtifactKind::Commit,
        }
    }

    fn prompt(&self, language: &str) -> String {
        match self {
            ContextPayload::PullRequest {
                current_branch,
                base_branch,
                commit_log,
                diff,
            } => build_pr_prompt(current_branch, base_branch, commit_log, diff, language),
            ContextPayload::Commit { staged_diff } => build_commit_prompt(staged_diff, language),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ArtifactFields {
    title: String,
    body: String,
}

/// Ask `provider` for a title and body, then validate the response.
///
/// Provider failures are classified into [`AiError`](super::AiError); a
/// response that does not match the schema, or whose title is blank, is a
/// [`AppError::Validation`].
pub async fn generate(
    provider: &dyn AiProvider,
    context: &ContextPayload,
    model: &str,
    language: &str,
) -> Result<GeneratedArtifact, AppError> {
    let schema: Value = serde_json::from_str(ARTIFACT_SCHEMA)
        .map_err(|e| AppError::unknown_with("Artifact schema is not valid JSON", e))?;

    let request = StructuredRequest {
        model: model.to_string(),
        system: SYSTEM_PROMPT.to_string(),
        prompt: context.prompt(language),
        schema_name: SCHEMA_NAME.to_string(),
        schema,
    };
    debug!(
        "Requesting {} from {} ({} prompt bytes)",
        context.kind(),
        model,
        request.prompt.len()
    );

    let raw = provider
        .generate_object(&request)
        .await
        .map_err(|failure| AppError::AiProvider(classify(&failure, model)))?;

    validate_response(context.kind(), &raw)
}

/// Decode and check a raw provider response.
pub fn validate_response(kind: ArtifactKind, raw: &str) -> Result<GeneratedArtifact, AppError> {
    let fields: ArtifactFields = serde_json::from_str(raw).map_err(|e| {
        AppError::Validation(format!(
            "AI response failed validation: expected an object with `title` and `body`: {e}"
        ))
    })?;

    let title = fields.title.trim().to_string();
    if title.is_empty() {
        return Err(AppError::Validation(
            "AI response failed validation: title is empty".to_string(),
        ));
    }
    if title.chars().count() > MAX_TITLE_CHARS {
        warn!(
            "Generated title is {} characters, longer than the suggested {}",
            title.chars().count(),
            MAX_TITLE_CHARS
        );
    }

    Ok(GeneratedArtifact {
        kind,
        title,
        body: fields.body.trim().to_string(),
    })
}
