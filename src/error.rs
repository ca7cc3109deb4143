//! Error types for quill modules using thiserror.

use std::fmt;

use thiserror::Error;

use crate::ai::AiError;
use crate::process::CommandOutput;

/// Coarse classification of an [`AppError`], stable across messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Prerequisite,
    GitOperation,
    RemoteTool,
    AiProvider,
    Validation,
    Unknown,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Prerequisite => "prerequisite",
            ErrorKind::GitOperation => "git operation",
            ErrorKind::RemoteTool => "remote tool",
            ErrorKind::AiProvider => "AI provider",
            ErrorKind::Validation => "validation",
            ErrorKind::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the generation pipeline.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Prerequisite(String),

    #[error("{0}")]
    GitOperation(String),

    #[error("{0}")]
    RemoteTool(String),

    #[error(transparent)]
    AiProvider(#[from] AiError),

    #[error("{0}")]
    Validation(String),

    #[error("{message}")]
    Unknown {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Prerequisite(_) => ErrorKind::Prerequisite,
            AppError::GitOperation(_) => ErrorKind::GitOperation,
            AppError::RemoteTool(_) => ErrorKind::RemoteTool,
            AppError::AiProvider(AiError::Unknown(_)) => ErrorKind::Unknown,
            AppError::AiProvider(_) => ErrorKind::AiProvider,
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::Unknown { .. } => ErrorKind::Unknown,
        }
    }

    /// A failed git invocation, with its captured diagnostics.
    pub fn git(operation: &str, output: &CommandOutput) -> Self {
        AppError::GitOperation(format!(
            "git {} failed: {}",
            operation,
            output.diagnostics()
        ))
    }

    /// A failed remote-collaboration tool invocation, with its captured diagnostics.
    pub fn remote(operation: &str, output: &CommandOutput) -> Self {
        AppError::RemoteTool(format!("{} failed: {}", operation, output.diagnostics()))
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        AppError::Unknown {
            message: message.into(),
            source: None,
        }
    }

    pub fn unknown_with(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::Unknown {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl From<dialoguer::Error> for AppError {
    fn from(err: dialoguer::Error) -> Self {
        AppError::unknown_with("Interactive prompt failed", err)
    }
}
