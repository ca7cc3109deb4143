//! Upstream tracking state from the porcelain branch header.

use std::sync::LazyLock;

use regex_lite::Regex;

use crate::error::AppError;
use crate::git::run_git;
use crate::process::CommandRunner;

/// `## <branch>[...<upstream>][ [ahead N][, behind M] | [gone]]`
static BRANCH_HEADER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^## (?:No commits yet on |Initial commit on )?(?P<name>.+?)(?:\.\.\.(?P<upstream>\S+))?(?: \[(?P<track>[^\]]*)\])?$",
    )
    .expect("branch header regex is valid")
});

static AHEAD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ahead (\d+)").expect("ahead regex is valid"));

/// Tracking state of a local branch.
///
/// `ahead_count` is only meaningful when an upstream exists; without one the
/// branch always needs a push that sets the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchState {
    pub name: String,
    pub upstream_ref: Option<String>,
    pub ahead_count: u32,
}

impl BranchState {
    pub fn has_upstream(&self) -> bool {
        self.upstream_ref.is_some()
    }
}

/// Parse the `##` header of `git status --porcelain --branch`.
///
/// An upstream reported as `[gone]` counts as no upstream.
pub fn parse_branch_header(header: &str) -> Option<BranchState> {
    if header.starts_with("## HEAD (no branch)") {
        return None;
    }

    let caps = BRANCH_HEADER.captures(header.trim_end())?;
    let name = caps.name("name")?.as_str().to_string();
    let track = caps.name("track").map(|m| m.as_str()).unwrap_or("");

    let upstream_ref = caps
        .name("upstream")
        .map(|m| m.as_str().to_string())
        .filter(|_| track != "gone");

    let ahead_count = match &upstream_ref {
        Some(_) => AHEAD
            .captures(track)
            .and_then(|c| c[1].parse::<u32>().ok())
            .unwrap_or(0),
        None => 0,
    };

    Some(BranchState {
        name,
        upstream_ref,
        ahead_count,
    })
}

/// Read the current branch's tracking state.
pub async fn read_branch_state(runner: &dyn CommandRunner) -> Result<BranchState, AppError> {
    let output = run_git(
        runner,
        &["status", "--porcelain=v1", "--branch"],
        "status --branch",
    )
    .await?;

    let header = output
        .stdout
        .lines()
        .next()
        .ok_or_else(|| AppError::GitOperation("git status returned no branch header".into()))?;

    parse_branch_header(header).ok_or_else(|| {
        AppError::GitOperation(
            "HEAD is detached; check out a branch before generating a pull request".to_string(),
        )
    })
}
