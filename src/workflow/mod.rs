//! End-to-end pipelines for `generate pr` and `generate commit`.
//!
//! Every step runs strictly in order: validate, read git state, (push), generate,
//! review, finalize. Operator declines surface as [`Flow::Abort`].

use tracing::info;

use crate::ai::{self, AiProvider, ContextPayload, GeneratedArtifact};
use crate::config::ResolvedConfig;
use crate::error::AppError;
use crate::finalize::{self, PullRequestTarget};
use crate::flow::Flow;
use crate::git::{self, ChangeSet};
use crate::output::OutputSink;
use crate::preflight::{self, Requirements};
use crate::process::CommandRunner;
use crate::prompt::Prompter;
use crate::proceed;
use crate::review::run_review;
use crate::sync::ensure_pushed;

/// Collaborators shared by both pipelines.
pub struct Workflow<'a> {
    pub runner: &'a dyn CommandRunner,
    pub provider: &'a dyn AiProvider,
    pub prompter: &'a mut dyn Prompter,
    pub sink: &'a dyn OutputSink,
}

/// Options specific to `generate pr`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PrOptions {
    /// Generate and review only; no push and no pull request.
    pub dry_run: bool,
    pub draft: bool,
}

/// Options specific to `generate commit`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitOptions {
    /// Stage every change before reading the staged diff.
    pub stage_all: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrOutcome {
    Created { url: String },
    DryRun(GeneratedArtifact),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed(GeneratedArtifact),
    NothingToCommit,
}

impl Workflow<'_> {
    /// Generate a pull request for the current branch and create it.
    pub async fn run_pr(
        &mut self,
        config: &ResolvedConfig,
        options: PrOptions,
    ) -> Result<Flow<PrOutcome>, AppError> {
        let requirements = Requirements {
            remote_tool: !options.dry_run,
        };
        preflight::validate(self.runner, requirements).await?;

        let analysis = proceed!(
            git::analyze_branch(
                self.runner,
                self.prompter,
                self.sink,
                &config.base_branch,
                config.skip_confirmations,
            )
            .await?
        );

        if !options.dry_run {
            proceed!(ensure_pushed(self.runner, self.prompter, self.sink, config.skip_confirmations).await?);
        }

        self.sink.info(&format!(
            "Generating pull request description with {} ({} commit(s))...",
            config.model, analysis.commit_count
        ));
        let context = ContextPayload::PullRequest {
            current_branch: analysis.current_branch.clone(),
            base_branch: analysis.base_branch.clone(),
            commit_log: analysis.commit_log,
            diff: analysis.diff,
        };
        let artifact = ai::generate(self.provider, &context, &config.model, &config.language).await?;

        let artifact = proceed!(run_review(
            artifact,
            self.prompter,
            self.sink,
            config.skip_confirmations
        )?);

        if options.dry_run {
            self.sink.info(&format!(
                "Dry run: no pull request created.\n\n{}\n\n{}",
                artifact.title,
                artifact.body.trim()
            ));
            return Ok(Flow::Proceed(PrOutcome::DryRun(artifact)));
        }

        let target = PullRequestTarget {
            base_branch: &analysis.base_branch,
            head_branch: &analysis.current_branch,
            draft: options.draft,
        };
        let url = finalize::create_pull_request(self.runner, &artifact, &target).await?;
        info!("Created pull request {}", url);
        self.sink.success(&format!("Pull request created: {url}"));

        finalize::offer_to_open(
            self.runner,
            self.prompter,
            self.sink,
            &url,
            config.skip_confirmations,
        )
        .await?;

        Ok(Flow::Proceed(PrOutcome::Created { url }))
    }

    /// Generate a commit message for the staged changes and commit.
    pub async fn run_commit(
        &mut self,
        config: &ResolvedConfig,
        options: CommitOptions,
    ) -> Result<Flow<CommitOutcome>, AppError> {
        preflight::validate(self.runner, Requirements::commit()).await?;

        if options.stage_all {
            git::stage_all(self.runner).await?;
        }

        let changes = git::classify_working_tree(self.runner).await?;
        let staged_diff = if changes.has_staged_changes() {
            if changes.has_unstaged_changes() {
                self.sink.warning(&format!(
                    "{} unstaged or untracked file(s) will not be part of this commit.",
                    changes.unstaged_count()
                ));
            }
            changes.staged_diff
        } else if changes.has_unstaged_changes() {
            proceed!(self.stage_on_confirmation(&changes, config.skip_confirmations).await?)
        } else {
            self.sink.info("No changes to commit.");
            return Ok(Flow::Proceed(CommitOutcome::NothingToCommit));
        };

        if staged_diff.trim().is_empty() {
            self.sink.info("No changes to commit.");
            return Ok(Flow::Proceed(CommitOutcome::NothingToCommit));
        }

        self.sink
            .info(&format!("Generating commit message with {}...", config.model));
        let context = ContextPayload::Commit { staged_diff };
        let artifact = ai::generate(self.provider, &context, &config.model, &config.language).await?;

        let artifact = proceed!(run_review(
            artifact,
            self.prompter,
            self.sink,
            config.skip_confirmations
        )?);

        finalize::commit(self.runner, &artifact).await?;
        self.sink.success(&format!("Committed: {}", artifact.title));

        Ok(Flow::Proceed(CommitOutcome::Committed(artifact)))
    }

    /// Nothing is staged: list what could be, ask, stage everything and
    /// return the new staged diff.
    async fn stage_on_confirmation(
        &mut self,
        changes: &ChangeSet,
        skip_confirmations: bool,
    ) -> Result<Flow<String>, AppError> {
        let listing: Vec<String> = changes
            .unstaged_modified_paths
            .iter()
            .map(|path| format!("  modified:  {path}"))
            .chain(
                changes
                    .other_unstaged_paths
                    .iter()
                    .map(|path| format!("  changed:   {path}")),
            )
            .chain(
                changes
                    .untracked_paths
                    .iter()
                    .map(|path| format!("  untracked: {path}")),
            )
            .collect();
        self.sink
            .info(&format!("No staged changes. Unstaged changes:\n{}", listing.join("\n")));

        if !skip_confirmations && !self.prompter.confirm("Stage all changes?", true)? {
            return Ok(Flow::Abort(
                "Aborted: stage the changes to commit and run again.".to_string(),
            ));
        }

        git::stage_all(self.runner).await?;
        Ok(Flow::Proceed(git::get_staged_diff(self.runner).await?))
    }
}
