//! A [`Prompter`] that replays canned answers.

use std::collections::VecDeque;

use crate::error::AppError;

use super::Prompter;

/// One canned operator response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    Confirm(bool),
    Select(usize),
    Input(String),
    Edit(Option<String>),
}

/// Replays [`Answer`]s in order and records every question asked.
///
/// Asking a question of a different shape than the next queued answer, or
/// running out of answers, is an error.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<Answer>,
    asked: Vec<String>,
    edit_seeds: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new(answers: impl IntoIterator<Item = Answer>) -> Self {
        Self {
            answers: answers.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Prompts shown so far, in order.
    pub fn asked(&self) -> &[String] {
        &self.asked
    }

    /// The text each editor session was seeded with.
    pub fn edit_seeds(&self) -> &[String] {
        &self.edit_seeds
    }

    pub fn remaining(&self) -> usize {
        self.answers.len()
    }

    fn next(&mut self, question: &str) -> Result<Answer, AppError> {
        self.asked.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| AppError::unknown(format!("No scripted answer for: {question}")))
    }
}

impl Prompter for ScriptedPrompter {
    fn confirm(&mut self, message: &str, _default: bool) -> Result<bool, AppError> {
        match self.next(message)? {
            Answer::Confirm(value) => Ok(value),
            other => Err(mismatch("confirm", message, &other)),
        }
    }

    fn select(&mut self, message: &str, options: &[&str]) -> Result<usize, AppError> {
        match self.next(message)? {
            Answer::Select(index) if index < options.len() => Ok(index),
            other => Err(mismatch("select", message, &other)),
        }
    }

    fn input(&mut self, message: &str, _initial: &str) -> Result<String, AppError> {
        match self.next(message)? {
            Answer::Input(text) => Ok(text),
            other => Err(mismatch("input", message, &other)),
        }
    }

    fn edit(&mut self, initial: &str) -> Result<Option<String>, AppError> {
        self.edit_seeds.push(initial.to_string());
        match self.next("<editor>")? {
            Answer::Edit(text) => Ok(text),
            other => Err(mismatch("edit", "<editor>", &other)),
        }
    }
}

fn mismatch(expected: &str, question: &str, got: &Answer) -> AppError {
    AppError::unknown(format!(
        "Scripted answer mismatch at '{question}': expected {expected}, got {got:?}"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_answers_in_order() {
        let mut prompter = ScriptedPrompter::new([
            Answer::Confirm(true),
            Answer::Select(1),
            Answer::Input("hi".into()),
        ]);

        assert!(prompter.confirm("Push?", true).unwrap());
        assert_eq!(prompter.select("Pick", &["a", "b"]).unwrap(), 1);
        assert_eq!(prompter.input("Name", "").unwrap(), "hi");
        assert_eq!(prompter.asked(), ["Push?", "Pick", "Name"]);
        assert_eq!(prompter.remaining(), 0);
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let mut prompter = ScriptedPrompter::new([Answer::Input("x".into())]);
        assert!(prompter.confirm("Push?", true).is_err());
    }

    #[test]
    fn out_of_range_selection_is_an_error() {
        let mut prompter = ScriptedPrompter::new([Answer::Select(5)]);
        assert!(prompter.select("Pick", &["a"]).is_err());
    }

    #[test]
    fn exhausted_script_is_an_error() {
        let mut prompter = ScriptedPrompter::new([]);
        assert!(prompter.edit("body").is_err());
        assert_eq!(prompter.edit_seeds(), ["body"]);
    }
}
