//! Interactive input behind an injectable interface.
//!
//! [`TerminalPrompter`] talks to a real terminal through `dialoguer` and an
//! external editor; [`ScriptedPrompter`] replays canned answers for tests.

pub mod editor;
pub mod scripted;

use dialoguer::{Confirm, Input, Select};

use crate::error::AppError;

pub use editor::edit_in_editor;
pub use scripted::{Answer, ScriptedPrompter};

/// Source of operator decisions.
pub trait Prompter {
    /// Yes/no question.
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, AppError>;

    /// Pick one of `options`; returns its index.
    fn select(&mut self, message: &str, options: &[&str]) -> Result<usize, AppError>;

    /// Single-line text, pre-filled with `initial`.
    fn input(&mut self, message: &str, initial: &str) -> Result<String, AppError>;

    /// Multi-line text in an external editor, seeded with `initial`.
    ///
    /// Returns `None` when the editor was abandoned.
    fn edit(&mut self, initial: &str) -> Result<Option<String>, AppError>;
}

/// Prompter bound to the operator's terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn confirm(&mut self, message: &str, default: bool) -> Result<bool, AppError> {
        Ok(Confirm::new()
            .with_prompt(message)
            .default(default)
            .interact()?)
    }

    fn select(&mut self, message: &str, options: &[&str]) -> Result<usize, AppError> {
        Ok(Select::new()
            .with_prompt(message)
            .items(options)
            .default(0)
            .interact()?)
    }

    fn input(&mut self, message: &str, initial: &str) -> Result<String, AppError> {
        Ok(Input::<String>::new()
            .with_prompt(message)
            .with_initial_text(initial)
            .interact_text()?)
    }

    fn edit(&mut self, initial: &str) -> Result<Option<String>, AppError> {
        edit_in_editor(initial)
    }
}
