//! AI content generation: prompts, provider access, failure classification
//! and response validation.

pub mod classify;
pub mod generate;
pub mod prompt;
pub mod provider;
pub mod retry;

use std::fmt;

pub use classify::{AiError, ProviderFailure, classify};
pub use generate::{ContextPayload, generate, validate_response};
pub use provider::{AiProvider, OpenAiProvider, StructuredRequest};

/// What is being written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    PullRequest,
    Commit,
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArtifactKind::PullRequest => f.write_str("pull request"),
            ArtifactKind::Commit => f.write_str("commit message"),
        }
    }
}

/// A generated title and body.
///
/// `title` is never blank; `body` may be empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,
    pub title: String,
    pub body: String,
}
