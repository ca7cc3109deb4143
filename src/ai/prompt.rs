//! Prompt construction for pull-request descriptions and commit messages.

use std::sync::LazyLock;

use regex_lite::Regex;

/// Maximum length for sanitized diff text.
pub const MAX_DIFF_SANITIZED_LENGTH: usize = 30_000;

/// Soft limit for generated titles.
pub const MAX_TITLE_CHARS: usize = 72;

static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]|\x1b\][^\x07\x1b]*(?:\x07|\x1b\\)")
        .expect("Invalid regex")
});

/// System message shared by both artifact kinds.
pub const SYSTEM_PROMPT: &str = "You write concise, accurate descriptions of source code changes \
for software engineers. Describe only what the provided context shows. Never invent changes, \
issue numbers or test results.";

/// Diff text cleaned for inclusion in a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedDiff {
    pub text: String,
    pub truncated: bool,
}

/// Remove ANSI escapes and control characters (keeping newline and tab),
/// then truncate to `max_len` bytes on a char boundary.
pub fn sanitize_diff(text: &str, max_len: usize) -> SanitizedDiff {
    let without_ansi = ANSI_ESCAPE.replace_all(text, "");
    let mut result: String = without_ansi
        .chars()
        .filter(|c| !c.is_control() || *c == '\n' || *c == '\t')
        .collect();

    let truncated = result.len() > max_len;
    if truncated {
        let mut end = max_len;
        while end > 0 && !result.is_char_boundary(end) {
            end -= 1;
        }
        result.truncate(end);
    }

    SanitizedDiff {
        text: result,
        truncated,
    }
}

fn truncation_note(diff: &SanitizedDiff) -> &'static str {
    if diff.truncated {
        "\n\nNote: The diff was truncated due to size. Focus on the visible changes."
    } else {
        ""
    }
}

/// Build the prompt for a pull-request title and description.
pub fn build_pr_prompt(
    current_branch: &str,
    base_branch: &str,
    commit_log: &str,
    diff: &str,
    language: &str,
) -> String {
    let sanitized = sanitize_diff(diff, MAX_DIFF_SANITIZED_LENGTH);
    let log = sanitize_diff(commit_log, MAX_DIFF_SANITIZED_LENGTH).text;
    let note = truncation_note(&sanitized);

    format!(
        r#"You are writing a pull request that merges `{current_branch}` into `{base_branch}`.

## Commits
```
{log}
```

## Diff
```
{diff}
```{note}

## Title Rules
- One line, at most {MAX_TITLE_CHARS} characters
- Summarize the overall change, not individual commits
- No trailing period

## Description Rules
- Markdown
- Start with a short summary paragraph explaining what the change does and why
- Follow with a bullet list of the notable changes
- Mention anything a reviewer should pay special attention to
- Do not restate the file list or diff statistics

Write the title and description in {language}.

Respond with a JSON object with the fields `title` and `body`."#,
        log = log.trim_end(),
        diff = sanitized.text,
    )
}

/// Build the prompt for a commit message from the staged diff alone.
pub fn build_commit_prompt(staged_diff: &str, language: &str) -> String {
    let sanitized = sanitize_diff(staged_diff, MAX_DIFF_SANITIZED_LENGTH);
    let note = truncation_note(&sanitized);

    format!(
        r#"You are generating a Git commit message following the Conventional Commits specification.

## Staged Diff
```
{diff}
```{note}

## Title Rules (STRICT)
- Format: `type(scope): description` (scope optional)
- Type: one of feat, fix, build, chore, ci, docs, style, refactor, perf, test
- Description: imperative mood ("add", "fix", "remove"), lowercase after colon, NO period at end
- HARD LIMIT: the entire title MUST be at most {MAX_TITLE_CHARS} characters

## Body Rules
- A bullet list ("- ") of the meaningful changes, one per line
- Explain why where the diff does not make it obvious
- Wrap lines at 72 characters
- For trivial changes the body may be an empty string

Write the title and body in {language}.

Respond with a JSON object with the fields `title` and `body`."#,
        diff = sanitized.text,
    )
}
