//! Side-effecting last step: commit, or create and open a pull request.

use tracing::{debug, warn};

use crate::ai::GeneratedArtifact;
use crate::error::AppError;
use crate::git::run_git;
use crate::output::OutputSink;
use crate::process::CommandRunner;
use crate::prompt::Prompter;

/// Compose a commit message: the title, then a blank line and the trimmed
/// body when the body has any content.
pub fn compose_commit_message(title: &str, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        title.to_string()
    } else {
        format!("{title}\n\n{body}")
    }
}

/// Commit the staged changes with the reviewed message.
pub async fn commit(runner: &dyn CommandRunner, artifact: &GeneratedArtifact) -> Result<(), AppError> {
    let message = compose_commit_message(&artifact.title, &artifact.body);
    run_git(runner, &["commit", "-m", message.as_str()], "commit").await?;
    Ok(())
}

/// Pull-request options beyond title and body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestTarget<'a> {
    pub base_branch: &'a str,
    pub head_branch: &'a str,
    pub draft: bool,
}

/// Create the pull request with `gh` and return its URL.
pub async fn create_pull_request(
    runner: &dyn CommandRunner,
    artifact: &GeneratedArtifact,
    target: &PullRequestTarget<'_>,
) -> Result<String, AppError> {
    let mut args = vec![
        "pr",
        "create",
        "--base",
        target.base_branch,
        "--head",
        target.head_branch,
        "--title",
        artifact.title.as_str(),
        "--body",
        artifact.body.as_str(),
    ];
    if target.draft {
        args.push("--draft");
    }

    let output = runner
        .run("gh", &args)
        .await
        .map_err(|e| AppError::RemoteTool(format!("Failed to run gh pr create: {e}")))?;

    if !output.is_success() {
        return Err(AppError::remote("gh pr create", &output));
    }

    match parse_pr_url(&output.stdout) {
        Some(url) => Ok(url),
        None => {
            warn!(
                "Unexpected gh pr create output. stdout: {:?} stderr: {:?}",
                output.stdout, output.stderr
            );
            Err(AppError::RemoteTool(format!(
                "gh pr create did not return a pull request URL. stdout: '{}' stderr: '{}'",
                output.stdout.trim(),
                output.stderr.trim()
            )))
        }
    }
}

/// The trimmed output, if it is an http(s) URL.
pub fn parse_pr_url(stdout: &str) -> Option<String> {
    let url = stdout.trim();
    let is_url = (url.starts_with("https://") || url.starts_with("http://"))
        && !url.contains(char::is_whitespace);
    is_url.then(|| url.to_string())
}

/// Platform command that opens a URL in the default browser.
pub fn opener_command(url: &str) -> (&'static str, Vec<&str>) {
    if cfg!(target_os = "macos") {
        ("open", vec![url])
    } else if cfg!(target_os = "windows") {
        ("cmd", vec!["/C", "start", "", url])
    } else {
        ("xdg-open", vec![url])
    }
}

/// Offer to open `url`; failing to open only warns and prints the URL.
pub async fn offer_to_open(
    runner: &dyn CommandRunner,
    prompter: &mut dyn Prompter,
    sink: &dyn OutputSink,
    url: &str,
    skip_confirmations: bool,
) -> Result<(), AppError> {
    if skip_confirmations {
        return Ok(());
    }
    if !prompter.confirm("Open the pull request in your browser?", true)? {
        return Ok(());
    }

    let (program, args) = opener_command(url);
    debug!("Opening {} with {}", url, program);

    match runner.run(program, &args).await {
        Ok(output) if output.is_success() => {}
        Ok(output) => {
            sink.warning(&format!(
                "Could not open a browser ({}). Open it manually: {url}",
                output.diagnostics()
            ));
        }
        Err(e) => {
            sink.warning(&format!(
                "Could not open a browser ({e}). Open it manually: {url}"
            ));
        }
    }
    Ok(())
}
