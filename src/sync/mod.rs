//! Remote synchronization: push the current branch before a PR is opened.

use tracing::debug;

use crate::error::AppError;
use crate::flow::Flow;
use crate::git::{BranchState, read_branch_state};
use crate::output::OutputSink;
use crate::process::CommandRunner;
use crate::prompt::Prompter;

/// Remote that receives new upstream branches.
const DEFAULT_REMOTE: &str = "origin";

/// What has to happen for the remote to hold the branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PushPlan {
    pub needs_push: bool,
    pub set_upstream: bool,
}

impl PushPlan {
    /// Without an upstream the ahead count is unknown, so a push that sets
    /// the upstream is always needed.
    pub fn for_state(state: &BranchState) -> Self {
        Self {
            needs_push: !state.has_upstream() || state.ahead_count > 0,
            set_upstream: !state.has_upstream(),
        }
    }
}

/// Result of a completed sync step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    AlreadyUpToDate,
    Pushed { set_upstream: bool },
}

/// Make sure the current branch exists on the remote with all local commits.
///
/// Declining the push ends the run early without error.
pub async fn ensure_pushed(
    runner: &dyn CommandRunner,
    prompter: &mut dyn Prompter,
    sink: &dyn OutputSink,
    skip_confirmations: bool,
) -> Result<Flow<PushOutcome>, AppError> {
    let state = read_branch_state(runner).await?;
    let plan = PushPlan::for_state(&state);
    debug!("Branch {} push plan: {:?}", state.name, plan);

    if !plan.needs_push {
        return Ok(Flow::Proceed(PushOutcome::AlreadyUpToDate));
    }

    if !skip_confirmations {
        let question = if plan.set_upstream {
            format!(
                "Branch '{}' has no upstream. Push it to {DEFAULT_REMOTE} and set the upstream?",
                state.name
            )
        } else {
            format!(
                "Branch '{}' has {} unpushed commit(s). Push now?",
                state.name, state.ahead_count
            )
        };
        if !prompter.confirm(&question, true)? {
            return Ok(Flow::Abort(
                "Aborted: the branch must be pushed before a pull request can be created.".into(),
            ));
        }
    }

    push(runner, &state.name, plan.set_upstream).await?;
    sink.success(&format!("Pushed '{}' to {DEFAULT_REMOTE}", state.name));

    Ok(Flow::Proceed(PushOutcome::Pushed {
        set_upstream: plan.set_upstream,
    }))
}

async fn push(runner: &dyn CommandRunner, branch: &str, set_upstream: bool) -> Result<(), AppError> {
    let args: Vec<&str> = if set_upstream {
        vec!["push", "--set-upstream", DEFAULT_REMOTE, branch]
    } else {
        vec!["push"]
    };

    let output = runner
        .run("git", &args)
        .await
        .map_err(|e| AppError::RemoteTool(format!("Failed to run git push: {e}")))?;

    if !output.is_success() {
        return Err(AppError::remote("git push", &output));
    }
    Ok(())
}
