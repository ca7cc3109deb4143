//! `quill init`: write a config file interactively.

use std::path::{Path, PathBuf};

use crate::config::{self, ConfigLayer, PROJECT_CONFIG_FILE, ResolvedConfig};
use crate::error::AppError;
use crate::flow::Flow;
use crate::output::OutputSink;
use crate::prompt::Prompter;

/// The file `init` writes: the global config, or `.quill.toml` at the
/// repository root (the current directory outside a repository).
pub fn init_target(cwd: &Path, global: bool) -> Result<PathBuf, AppError> {
    if global {
        return config::global_config_path().ok_or_else(|| {
            AppError::unknown("Could not determine the configuration directory for this platform")
        });
    }
    Ok(config::project_config_path(cwd).unwrap_or_else(|| cwd.join(PROJECT_CONFIG_FILE)))
}

/// Ask for every setting, pre-filled with the file's current values, and
/// save them to `path`.
pub fn run_init(
    prompter: &mut dyn Prompter,
    sink: &dyn OutputSink,
    path: &Path,
) -> Result<Flow<ConfigLayer>, AppError> {
    let existing = config::load_layer(path)?;

    if existing.is_some()
        && !prompter.confirm(
            &format!("{} already exists. Update it?", path.display()),
            false,
        )?
    {
        return Ok(Flow::Abort("Aborted: configuration left unchanged.".to_string()));
    }

    let current = ResolvedConfig::resolve([existing.unwrap_or_default()]);

    let layer = ConfigLayer {
        base_branch: Some(ask(prompter, "Base branch", &current.base_branch)?),
        model: Some(ask(prompter, "Model", &current.model)?),
        language: Some(ask(prompter, "Output language", &current.language)?),
        skip_confirmations: Some(prompter.confirm(
            "Skip confirmation prompts by default?",
            current.skip_confirmations,
        )?),
    };

    config::writer::write_config(path, &layer)?;
    sink.success(&format!("Saved configuration to {}", path.display()));

    Ok(Flow::Proceed(layer))
}

/// Text input where a blank answer keeps `current`.
fn ask(prompter: &mut dyn Prompter, message: &str, current: &str) -> Result<String, AppError> {
    let answer = prompter.input(message, current)?;
    let answer = answer.trim();
    Ok(if answer.is_empty() {
        current.to_string()
    } else {
        answer.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::MemorySink;
    use crate::prompt::{Answer, ScriptedPrompter};

    #[test]
    fn new_file_is_written_from_answers() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut prompter = ScriptedPrompter::new([
            Answer::Input("develop".into()),
            Answer::Input("".into()),
            Answer::Input("French".into()),
            Answer::Confirm(true),
        ]);
        let sink = MemorySink::new();

        let flow = run_init(&mut prompter, &sink, &path).unwrap();
        assert!(!flow.is_abort());

        let saved = config::load_layer(&path).unwrap().unwrap();
        assert_eq!(saved.base_branch.as_deref(), Some("develop"));
        assert_eq!(saved.model.as_deref(), Some(config::DEFAULT_MODEL));
        assert_eq!(saved.language.as_deref(), Some("French"));
        assert_eq!(saved.skip_confirmations, Some(true));
        assert!(sink.contains("Saved configuration"));
    }

    #[test]
    fn existing_file_needs_confirmation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "model = \"gpt-4o\"\n").unwrap();
        let mut prompter = ScriptedPrompter::new([Answer::Confirm(false)]);
        let sink = MemorySink::new();

        let flow = run_init(&mut prompter, &sink, &path).unwrap();
        assert!(flow.is_abort());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "model = \"gpt-4o\"\n");
    }

    #[test]
    fn update_keeps_comments() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(PROJECT_CONFIG_FILE);
        std::fs::write(&path, "# team defaults\nmodel = \"gpt-4o\"\n").unwrap();
        let mut prompter = ScriptedPrompter::new([
            Answer::Confirm(true),
            Answer::Input("".into()),
            Answer::Input("".into()),
            Answer::Input("".into()),
            Answer::Confirm(false),
        ]);
        let sink = MemorySink::new();

        run_init(&mut prompter, &sink, &path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("# team defaults"));
        let saved = config::parse_layer(&text).unwrap();
        assert_eq!(saved.model.as_deref(), Some("gpt-4o"));
        assert_eq!(saved.base_branch.as_deref(), Some("main"));
    }

    #[test]
    fn project_target_outside_repository_is_cwd() {
        let dir = tempfile::tempdir().unwrap();
        let target = init_target(dir.path(), false).unwrap();
        assert_eq!(target, dir.path().join(PROJECT_CONFIG_FILE));
    }
}
