//! Prerequisite checks run before any git state is read.
//!
//! Checks (in order, fail-fast, never cached):
//! 1. `git` is installed
//! 2. `gh` is installed and authenticated (pull-request runs only)
//! 3. The AI provider credential is present in the environment

use std::env;

use tracing::debug;

use crate::error::AppError;
use crate::process::CommandRunner;

/// Environment variable holding the AI provider credential.
pub const API_KEY_ENV_VAR: &str = "OPENAI_API_KEY";

/// Which optional prerequisites a run needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requirements {
    pub remote_tool: bool,
}

impl Requirements {
    pub fn pull_request() -> Self {
        Self { remote_tool: true }
    }

    pub fn commit() -> Self {
        Self { remote_tool: false }
    }
}

/// Run every prerequisite check for `requirements`.
pub async fn validate(
    runner: &dyn CommandRunner,
    requirements: Requirements,
) -> Result<(), AppError> {
    check_git_installed(runner)?;

    if requirements.remote_tool {
        check_gh_installed(runner)?;
        check_gh_authenticated(runner).await?;
    }

    check_api_key()?;
    Ok(())
}

fn check_git_installed(runner: &dyn CommandRunner) -> Result<(), AppError> {
    if !runner.is_installed("git") {
        return Err(AppError::Prerequisite(
            "git is not installed. Install it from https://git-scm.com/downloads".to_string(),
        ));
    }
    Ok(())
}

fn check_gh_installed(runner: &dyn CommandRunner) -> Result<(), AppError> {
    if !runner.is_installed("gh") {
        return Err(AppError::Prerequisite(
            "GitHub CLI (gh) is not installed. Install it from https://cli.github.com".to_string(),
        ));
    }
    Ok(())
}

async fn check_gh_authenticated(runner: &dyn CommandRunner) -> Result<(), AppError> {
    let output = runner
        .run("gh", &["auth", "status"])
        .await
        .map_err(|e| AppError::Prerequisite(format!("Failed to run `gh auth status`: {e}")))?;

    if !output.is_success() {
        debug!("gh auth status: {}", output.diagnostics());
        return Err(AppError::Prerequisite(
            "GitHub CLI is not authenticated. Run `gh auth login` and try again.".to_string(),
        ));
    }
    Ok(())
}

fn check_api_key() -> Result<(), AppError> {
    match env::var(API_KEY_ENV_VAR) {
        Ok(key) if !key.trim().is_empty() => Ok(()),
        _ => Err(AppError::Prerequisite(format!(
            "{API_KEY_ENV_VAR} is not set. Export your OpenAI API key, e.g. `export {API_KEY_ENV_VAR}=sk-...`"
        ))),
    }
}
