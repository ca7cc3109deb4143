//! External editor round-trip for multi-line text.

use std::env;
use std::io::Write;
use std::process::Command;

use tempfile::Builder;
use tracing::debug;

use crate::error::AppError;

/// Editor used when neither `VISUAL` nor `EDITOR` is set.
const DEFAULT_EDITOR: &str = "vi";

/// Resolve the editor command line from `VISUAL`, then `EDITOR`.
///
/// The value may carry arguments (`code --wait`).
pub fn editor_command() -> Vec<String> {
    let raw = ["VISUAL", "EDITOR"]
        .iter()
        .filter_map(|key| env::var(key).ok())
        .find(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_EDITOR.to_string());

    raw.split_whitespace().map(String::from).collect()
}

/// Open `initial` in the operator's editor and return the saved text verbatim.
///
/// Returns `Ok(None)` if the editor exits unsuccessfully.
pub fn edit_in_editor(initial: &str) -> Result<Option<String>, AppError> {
    let mut file = Builder::new()
        .prefix("quill-body-")
        .suffix(".md")
        .tempfile()
        .map_err(|e| AppError::unknown_with("Failed to create temporary file for editing", e))?;

    file.write_all(initial.as_bytes())
        .and_then(|_| file.flush())
        .map_err(|e| AppError::unknown_with("Failed to write temporary file for editing", e))?;

    let command = editor_command();
    let Some((program, args)) = command.split_first() else {
        return Err(AppError::unknown("No editor configured"));
    };

    debug!("Opening {} in {}", file.path().display(), program);

    let status = Command::new(program)
        .args(args)
        .arg(file.path())
        .status()
        .map_err(|e| AppError::unknown_with(format!("Failed to launch editor '{program}'"), e))?;

    if !status.success() {
        return Ok(None);
    }

    let edited = std::fs::read_to_string(file.path())
        .map_err(|e| AppError::unknown_with("Failed to read edited text", e))?;

    Ok(Some(edited))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial(editor_env)]
    fn visual_wins_over_editor() {
        temp_env::with_vars(
            [("VISUAL", Some("code --wait")), ("EDITOR", Some("nano"))],
            || {
                assert_eq!(editor_command(), vec!["code", "--wait"]);
            },
        );
    }

    #[test]
    #[serial(editor_env)]
    fn falls_back_to_default_editor() {
        temp_env::with_vars_unset(["VISUAL", "EDITOR"], || {
            assert_eq!(editor_command(), vec![DEFAULT_EDITOR]);
        });
    }

    #[test]
    #[serial(editor_env)]
    fn blank_visual_is_ignored() {
        temp_env::with_vars([("VISUAL", Some("  ")), ("EDITOR", Some("nano"))], || {
            assert_eq!(editor_command(), vec!["nano"]);
        });
    }

    #[test]
    #[serial(editor_env)]
    #[cfg(unix)]
    fn true_editor_returns_text_unchanged() {
        temp_env::with_vars([("VISUAL", Some("true")), ("EDITOR", None::<&str>)], || {
            let result = edit_in_editor("keep me\n").unwrap();
            assert_eq!(result.as_deref(), Some("keep me\n"));
        });
    }

    #[test]
    #[serial(editor_env)]
    #[cfg(unix)]
    fn failing_editor_returns_none() {
        temp_env::with_vars([("VISUAL", Some("false")), ("EDITOR", None::<&str>)], || {
            assert_eq!(edit_in_editor("text").unwrap(), None);
        });
    }
}
