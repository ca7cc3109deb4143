//! Branch comparison against the base branch for pull-request context.

use tracing::debug;

use crate::error::AppError;
use crate::flow::Flow;
use crate::git::{git_output, run_git};
use crate::output::OutputSink;
use crate::process::CommandRunner;
use crate::prompt::Prompter;

/// Branch names treated as trunk; generating from them needs confirmation.
pub const TRUNK_BRANCHES: &[&str] = &["main", "master"];

/// Remote consulted when the base branch is missing locally.
const DEFAULT_REMOTE: &str = "origin";

/// Everything the pull-request generator needs to know about the branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchAnalysis {
    pub current_branch: String,
    pub base_branch: String,
    /// Revision actually compared against: `main` or `origin/main`.
    pub base_ref: String,
    pub commit_count: u32,
    pub diff: String,
    pub commit_log: String,
}

/// Compare the current branch with `base_branch`.
///
/// Steps:
/// 1. Resolve the base locally, else on `origin` (with a warning), else fail
/// 2. Resolve the current branch; confirm if it is the base or a trunk branch
/// 3. Count commits on the current branch missing from the base; zero fails
/// 4. Collect the diff and one-line log (an empty diff only warns)
pub async fn analyze_branch(
    runner: &dyn CommandRunner,
    prompter: &mut dyn Prompter,
    sink: &dyn OutputSink,
    base_branch: &str,
    skip_confirmations: bool,
) -> Result<Flow<BranchAnalysis>, AppError> {
    let base_ref = resolve_base_ref(runner, sink, base_branch).await?;
    let current_branch = current_branch(runner).await?;

    let on_trunk = current_branch == base_branch || TRUNK_BRANCHES.contains(&current_branch.as_str());
    if on_trunk && !skip_confirmations {
        let proceed = prompter.confirm(
            &format!(
                "You are on '{current_branch}', which looks like a base branch. Continue anyway?"
            ),
            false,
        )?;
        if !proceed {
            return Ok(Flow::Abort(format!(
                "Aborted: switch to a feature branch before generating a pull request from '{current_branch}'."
            )));
        }
    }

    let range = format!("{base_ref}..HEAD");
    let count_output = run_git(runner, &["rev-list", "--count", &range], "rev-list --count").await?;
    let commit_count = count_output.stdout.trim().parse::<u32>().map_err(|e| {
        AppError::GitOperation(format!(
            "Unexpected output from git rev-list --count: '{}' ({e})",
            count_output.stdout.trim()
        ))
    })?;

    if commit_count == 0 {
        return Err(AppError::GitOperation(format!(
            "No commits found on '{current_branch}' that are not on '{base_branch}'; nothing to generate from."
        )));
    }

    let symmetric = format!("{base_ref}...HEAD");
    let diff = run_git(runner, &["diff", &symmetric], "diff").await?.stdout;
    let commit_log = run_git(runner, &["log", "--oneline", &range], "log")
        .await?
        .stdout;

    if diff.trim().is_empty() {
        sink.warning(&format!(
            "'{current_branch}' has {commit_count} commit(s) ahead of '{base_branch}' but no file differences."
        ));
    }

    debug!(
        "Branch {} is {} commit(s) ahead of {} (diff {} bytes)",
        current_branch,
        commit_count,
        base_ref,
        diff.len()
    );

    Ok(Flow::Proceed(BranchAnalysis {
        current_branch,
        base_branch: base_branch.to_string(),
        base_ref,
        commit_count,
        diff,
        commit_log,
    }))
}

/// Find the revision to compare against: the local branch, else the remote one.
pub async fn resolve_base_ref(
    runner: &dyn CommandRunner,
    sink: &dyn OutputSink,
    base_branch: &str,
) -> Result<String, AppError> {
    let local = git_output(runner, &["branch", "--list", base_branch], "branch --list").await?;
    if local.is_success() && !local.stdout.trim().is_empty() {
        return Ok(base_branch.to_string());
    }

    let remote_ref = format!("{DEFAULT_REMOTE}/{base_branch}");
    let remote = git_output(runner, &["branch", "-r", "--list", &remote_ref], "branch -r --list").await?;
    if remote.is_success() && !remote.stdout.trim().is_empty() {
        sink.warning(&format!(
            "Base branch '{base_branch}' not found locally; comparing against '{remote_ref}'."
        ));
        return Ok(remote_ref);
    }

    Err(AppError::GitOperation(format!(
        "Base branch '{base_branch}' was not found locally or on '{DEFAULT_REMOTE}'. Use --base to pick another branch."
    )))
}

/// Name of the checked-out branch; detached HEAD is an error.
pub async fn current_branch(runner: &dyn CommandRunner) -> Result<String, AppError> {
    let output = run_git(runner, &["rev-parse", "--abbrev-ref", "HEAD"], "rev-parse").await?;
    let name = output.stdout.trim().to_string();

    if name.is_empty() || name == "HEAD" {
        return Err(AppError::GitOperation(
            "HEAD is detached; check out a branch first".to_string(),
        ));
    }
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::output::{Level, MemorySink};
    use crate::process::{CommandOutput, ScriptedRunner};
    use crate::prompt::{Answer, ScriptedPrompter};

    fn feature_runner(count: &str, diff: &str) -> ScriptedRunner {
        ScriptedRunner::new()
            .on(&["git", "branch", "--list", "main"], CommandOutput::success("  main\n"))
            .on(
                &["git", "rev-parse", "--abbrev-ref", "HEAD"],
                CommandOutput::success("feature/x\n"),
            )
            .on(&["git", "rev-list", "--count", "main..HEAD"], CommandOutput::success(count))
            .on(&["git", "diff", "main...HEAD"], CommandOutput::success(diff))
            .on(
                &["git", "log", "--oneline", "main..HEAD"],
                CommandOutput::success("abc1234 feat: add x\n"),
            )
    }

    #[tokio::test]
    async fn feature_branch_is_analyzed() {
        let runner = feature_runner("2\n", "diff --git a/x b/x\n");
        let mut prompter = ScriptedPrompter::new([]);
        let sink = MemorySink::new();

        let flow = analyze_branch(&runner, &mut prompter, &sink, "main", false)
            .await
            .unwrap();
        let Flow::Proceed(analysis) = flow else {
            panic!("expected analysis");
        };

        assert_eq!(analysis.current_branch, "feature/x");
        assert_eq!(analysis.base_ref, "main");
        assert_eq!(analysis.commit_count, 2);
        assert!(analysis.commit_log.contains("feat: add x"));
        assert!(prompter.asked().is_empty());
        assert!(sink.messages().is_empty());
    }

    #[tokio::test]
    async fn zero_commits_names_both_branches() {
        let runner = feature_runner("0\n", "");
        let mut prompter = ScriptedPrompter::new([]);
        let sink = MemorySink::new();

        let err = analyze_branch(&runner, &mut prompter, &sink, "main", false)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GitOperation);
        assert!(err.to_string().contains("feature/x"));
        assert!(err.to_string().contains("main"));
    }

    #[tokio::test]
    async fn empty_diff_only_warns() {
        let runner = feature_runner("1\n", "");
        let mut prompter = ScriptedPrompter::new([]);
        let sink = MemorySink::new();

        let flow = analyze_branch(&runner, &mut prompter, &sink, "main", false)
            .await
            .unwrap();
        assert!(!flow.is_abort());
        assert_eq!(sink.at(Level::Warning).len(), 1);
    }

    #[tokio::test]
    async fn remote_only_base_warns_and_uses_remote_ref() {
        let runner = ScriptedRunner::new()
            .on(&["git", "branch", "--list", "develop"], CommandOutput::success(""))
            .on(
                &["git", "branch", "-r", "--list", "origin/develop"],
                CommandOutput::success("  origin/develop\n"),
            );
        let sink = MemorySink::new();

        let base = resolve_base_ref(&runner, &sink, "develop").await.unwrap();
        assert_eq!(base, "origin/develop");
        assert!(sink.contains("not found locally"));
    }

    #[tokio::test]
    async fn missing_base_everywhere_fails() {
        let runner = ScriptedRunner::new()
            .on(&["git", "branch", "--list", "nope"], CommandOutput::success(""))
            .on(&["git", "branch", "-r", "--list", "origin/nope"], CommandOutput::success(""));
        let sink = MemorySink::new();

        let err = resolve_base_ref(&runner, &sink, "nope").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::GitOperation);
        assert!(err.to_string().contains("'nope'"));
    }

    #[tokio::test]
    async fn trunk_branch_requires_confirmation() {
        let runner = ScriptedRunner::new()
            .on(&["git", "branch", "--list", "main"], CommandOutput::success("* main\n"))
            .on(
                &["git", "rev-parse", "--abbrev-ref", "HEAD"],
                CommandOutput::success("main\n"),
            );
        let mut prompter = ScriptedPrompter::new([Answer::Confirm(false)]);
        let sink = MemorySink::new();

        let flow = analyze_branch(&runner, &mut prompter, &sink, "main", false)
            .await
            .unwrap();
        assert!(flow.is_abort());
        assert_eq!(prompter.asked().len(), 1);
        assert!(!runner.was_called_with_prefix(&["git", "rev-list"]));
    }

    #[tokio::test]
    async fn trunk_confirmation_is_skippable() {
        let runner = ScriptedRunner::new()
            .on(&["git", "branch", "--list", "develop"], CommandOutput::success("  develop\n"))
            .on(
                &["git", "rev-parse", "--abbrev-ref", "HEAD"],
                CommandOutput::success("master\n"),
            )
            .on(&["git", "rev-list", "--count", "develop..HEAD"], CommandOutput::success("1"))
            .on(&["git", "diff", "develop...HEAD"], CommandOutput::success("+x\n"))
            .on(&["git", "log", "--oneline", "develop..HEAD"], CommandOutput::success("a x\n"));
        let mut prompter = ScriptedPrompter::new([]);
        let sink = MemorySink::new();

        let flow = analyze_branch(&runner, &mut prompter, &sink, "develop", true)
            .await
            .unwrap();
        assert!(!flow.is_abort());
        assert!(prompter.asked().is_empty());
    }

    #[tokio::test]
    async fn detached_head_fails() {
        let runner = ScriptedRunner::new().on(
            &["git", "rev-parse", "--abbrev-ref", "HEAD"],
            CommandOutput::success("HEAD\n"),
        );
        let err = current_branch(&runner).await.unwrap_err();
        assert!(err.to_string().contains("detached"));
    }
}
