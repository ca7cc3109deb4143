//! Working-tree classification from porcelain status output.
//!
//! Each per-file entry carries two status columns: the first is the state
//! relative to the index (staged), the second relative to the working tree
//! (unstaged). The columns are classified independently, so a file that was
//! staged and then edited again is both staged-modified and unstaged-modified.

use tracing::debug;

use crate::error::AppError;
use crate::git::run_git;
use crate::process::CommandRunner;

/// One line of `git status --porcelain`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    pub index: char,
    pub worktree: char,
    pub path: String,
}

impl StatusEntry {
    /// Parse a `XY path` line. Returns `None` for headers and malformed lines.
    pub fn parse(line: &str) -> Option<Self> {
        if line.starts_with("##") {
            return None;
        }

        let mut chars = line.chars();
        let index = chars.next()?;
        let worktree = chars.next()?;
        let rest = chars.as_str().strip_prefix(' ')?;
        if rest.is_empty() {
            return None;
        }

        // Renames and copies report `old -> new`; the new path is the live one.
        let path = match rest.split_once(" -> ") {
            Some((_, new)) if matches!(index, 'R' | 'C') => new,
            _ => rest,
        };

        Some(Self {
            index,
            worktree,
            path: unquote(path),
        })
    }

    pub fn is_untracked(&self) -> bool {
        self.index == '?' && self.worktree == '?'
    }

    pub fn is_staged_modified(&self) -> bool {
        self.index == 'M'
    }

    pub fn is_unstaged_modified(&self) -> bool {
        self.worktree == 'M'
    }

    /// A working-tree change other than a modification (deletion, type
    /// change, unmerged).
    pub fn is_other_unstaged(&self) -> bool {
        !matches!(self.worktree, ' ' | 'M' | '?' | '!')
    }
}

/// Paths grouped by status column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusSummary {
    pub staged_modified: Vec<String>,
    pub unstaged_modified: Vec<String>,
    pub other_unstaged: Vec<String>,
    pub untracked: Vec<String>,
}

/// Classify porcelain per-file output, preserving the order git reported.
pub fn classify_status(porcelain: &str) -> StatusSummary {
    let mut summary = StatusSummary::default();

    for entry in porcelain.lines().filter_map(StatusEntry::parse) {
        if entry.is_untracked() {
            summary.untracked.push(entry.path);
            continue;
        }
        if entry.is_staged_modified() {
            summary.staged_modified.push(entry.path.clone());
        }
        if entry.is_unstaged_modified() {
            summary.unstaged_modified.push(entry.path);
        } else if entry.is_other_unstaged() {
            summary.other_unstaged.push(entry.path);
        }
    }

    summary
}

/// Staged diff plus the paths that are not yet staged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeSet {
    /// Diff of the index against HEAD; empty means nothing is staged.
    pub staged_diff: String,
    pub unstaged_modified_paths: Vec<String>,
    /// Unstaged deletions and other non-modification changes.
    pub other_unstaged_paths: Vec<String>,
    pub untracked_paths: Vec<String>,
}

impl ChangeSet {
    pub fn has_staged_changes(&self) -> bool {
        !self.staged_diff.trim().is_empty()
    }

    pub fn has_unstaged_changes(&self) -> bool {
        !self.unstaged_modified_paths.is_empty()
            || !self.other_unstaged_paths.is_empty()
            || !self.untracked_paths.is_empty()
    }

    /// Number of paths that are not staged.
    pub fn unstaged_count(&self) -> usize {
        self.unstaged_modified_paths.len() + self.other_unstaged_paths.len() + self.untracked_paths.len()
    }
}

/// Diff of the index against HEAD.
pub async fn get_staged_diff(runner: &dyn CommandRunner) -> Result<String, AppError> {
    let output = run_git(runner, &["diff", "--cached"], "diff --cached").await?;
    Ok(output.stdout)
}

/// Read the staged diff and classify everything else in the working tree.
pub async fn classify_working_tree(runner: &dyn CommandRunner) -> Result<ChangeSet, AppError> {
    let staged_diff = get_staged_diff(runner).await?;
    let status = run_git(runner, &["status", "--porcelain"], "status").await?;
    let summary = classify_status(&status.stdout);

    debug!(
        "Working tree: {} staged-modified, {} unstaged-modified, {} other unstaged, {} untracked",
        summary.staged_modified.len(),
        summary.unstaged_modified.len(),
        summary.other_unstaged.len(),
        summary.untracked.len()
    );

    Ok(ChangeSet {
        staged_diff,
        unstaged_modified_paths: summary.unstaged_modified,
        other_unstaged_paths: summary.other_unstaged,
        untracked_paths: summary.untracked,
    })
}

/// Stage every change in the working tree (`git add -A`).
pub async fn stage_all(runner: &dyn CommandRunner) -> Result<(), AppError> {
    run_git(runner, &["add", "-A"], "add").await?;
    Ok(())
}

/// Undo the C-style quoting git applies to paths with unusual characters.
///
/// Non-ASCII bytes arrive as octal escapes (`\303\251`), so the unescaped
/// bytes are collected first and decoded as UTF-8 at the end.
fn unquote(path: &str) -> String {
    let Some(inner) = path.strip_prefix('"').and_then(|p| p.strip_suffix('"')) else {
        return path.to_string();
    };

    let mut bytes = Vec::with_capacity(inner.len());
    let mut rest = inner.as_bytes();
    while let Some((&byte, tail)) = rest.split_first() {
        rest = tail;
        if byte != b'\\' {
            bytes.push(byte);
            continue;
        }
        let Some((&escaped, tail)) = rest.split_first() else {
            bytes.push(byte);
            break;
        };
        rest = tail;
        match escaped {
            b'0'..=b'7' => {
                let digits: Vec<u8> = std::iter::once(escaped)
                    .chain(rest.iter().copied().take(2).take_while(u8::is_ascii_digit))
                    .collect();
                rest = &rest[digits.len() - 1..];
                let value = digits
                    .iter()
                    .fold(0u32, |acc, d| acc * 8 + u32::from(d - b'0'));
                bytes.push(value as u8);
            }
            b'n' => bytes.push(b'\n'),
            b't' => bytes.push(b'\t'),
            b'r' => bytes.push(b'\r'),
            b'a' => bytes.push(0x07),
            b'b' => bytes.push(0x08),
            b'f' => bytes.push(0x0c),
            b'v' => bytes.push(0x0b),
            other => bytes.push(other),
        }
    }

    String::from_utf8_lossy(&bytes).into_owned()
}
