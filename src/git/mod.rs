//! Git state derivation through the system `git` binary.
//!
//! All commands go through a [`CommandRunner`], inheriting the user's git
//! config, SSH agent and credential store.

pub mod branch;
pub mod status;
pub mod tracking;

pub use branch::{BranchAnalysis, TRUNK_BRANCHES, analyze_branch};
pub use status::{ChangeSet, StatusEntry, classify_status, classify_working_tree, get_staged_diff, stage_all};
pub use tracking::{BranchState, parse_branch_header, read_branch_state};

use crate::error::AppError;
use crate::process::{CommandOutput, CommandRunner};

/// Run a git command; a spawn failure is an error, a nonzero exit is not.
pub(crate) async fn git_output(
    runner: &dyn CommandRunner,
    args: &[&str],
    operation: &str,
) -> Result<CommandOutput, AppError> {
    runner
        .run("git", args)
        .await
        .map_err(|e| AppError::GitOperation(format!("Failed to run git {operation}: {e}")))
}

/// Run a git command and require a zero exit code.
pub(crate) async fn run_git(
    runner: &dyn CommandRunner,
    args: &[&str],
    operation: &str,
) -> Result<CommandOutput, AppError> {
    let output = git_output(runner, args, operation).await?;
    if !output.is_success() {
        return Err(AppError::git(operation, &output));
    }
    Ok(output)
}
