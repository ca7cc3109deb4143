//! Interactive review of generated content.
//!
//! [`ReviewSession`] is a pure state machine; [`run_review`] drives it with a
//! [`Prompter`] and shows the artifact on every return to `Reviewing`.

use tracing::debug;

use crate::ai::GeneratedArtifact;
use crate::error::AppError;
use crate::flow::Flow;
use crate::output::OutputSink;
use crate::prompt::Prompter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Reviewing,
    EditingTitle,
    EditingBody,
    Confirmed,
    Cancelled,
}

impl ReviewState {
    pub fn is_terminal(self) -> bool {
        matches!(self, ReviewState::Confirmed | ReviewState::Cancelled)
    }
}

/// Choices offered while reviewing, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Confirm,
    EditTitle,
    EditBody,
    Cancel,
}

impl ReviewAction {
    pub const ALL: [ReviewAction; 4] = [
        ReviewAction::Confirm,
        ReviewAction::EditTitle,
        ReviewAction::EditBody,
        ReviewAction::Cancel,
    ];

    pub fn label(self) -> &'static str {
        match self {
            ReviewAction::Confirm => "Confirm",
            ReviewAction::EditTitle => "Edit title",
            ReviewAction::EditBody => "Edit body",
            ReviewAction::Cancel => "Cancel",
        }
    }
}

/// Input to the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewEvent {
    Choose(ReviewAction),
    /// New title text; blank keeps the current title.
    TitleEdited(String),
    /// Editor result; `None` (editor abandoned) keeps the current body.
    BodyEdited(Option<String>),
}

/// A generated artifact under review.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewSession {
    artifact: GeneratedArtifact,
    state: ReviewState,
}

impl ReviewSession {
    pub fn new(artifact: GeneratedArtifact) -> Self {
        Self {
            artifact,
            state: ReviewState::Reviewing,
        }
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn artifact(&self) -> &GeneratedArtifact {
        &self.artifact
    }

    /// Apply `event`. Events that do not fit the current state are errors
    /// and leave the session untouched.
    pub fn handle(&mut self, event: ReviewEvent) -> Result<ReviewState, AppError> {
        let next = match (self.state, event) {
            (ReviewState::Reviewing, ReviewEvent::Choose(action)) => match action {
                ReviewAction::Confirm => ReviewState::Confirmed,
                ReviewAction::EditTitle => ReviewState::EditingTitle,
                ReviewAction::EditBody => ReviewState::EditingBody,
                ReviewAction::Cancel => ReviewState::Cancelled,
            },
            (ReviewState::EditingTitle, ReviewEvent::TitleEdited(title)) => {
                let title = title.trim();
                if !title.is_empty() {
                    self.artifact.title = title.to_string();
                }
                ReviewState::Reviewing
            }
            (ReviewState::EditingBody, ReviewEvent::BodyEdited(body)) => {
                if let Some(body) = body {
                    self.artifact.body = body;
                }
                ReviewState::Reviewing
            }
            (state, event) => {
                return Err(AppError::unknown(format!(
                    "Invalid review transition: {event:?} while {state:?}"
                )));
            }
        };

        debug!("Review: {:?} -> {:?}", self.state, next);
        self.state = next;
        Ok(next)
    }

    /// The confirmed artifact, or `None` if cancelled or still open.
    pub fn into_confirmed(self) -> Option<GeneratedArtifact> {
        match self.state {
            ReviewState::Confirmed => Some(self.artifact),
            _ => None,
        }
    }
}

/// Let the operator confirm, amend or cancel `artifact`.
///
/// With `skip_confirmations` the artifact is confirmed unchanged.
pub fn run_review(
    artifact: GeneratedArtifact,
    prompter: &mut dyn Prompter,
    sink: &dyn OutputSink,
    skip_confirmations: bool,
) -> Result<Flow<GeneratedArtifact>, AppError> {
    if skip_confirmations {
        return Ok(Flow::Proceed(artifact));
    }

    let labels: Vec<&str> = ReviewAction::ALL.iter().map(|a| a.label()).collect();
    let mut session = ReviewSession::new(artifact);

    while !session.state().is_terminal() {
        let event = match session.state() {
            ReviewState::Reviewing => {
                display(sink, session.artifact());
                let index = prompter.select("What would you like to do?", &labels)?;
                let action = ReviewAction::ALL
                    .get(index)
                    .copied()
                    .ok_or_else(|| AppError::unknown(format!("No review action at index {index}")))?;
                ReviewEvent::Choose(action)
            }
            ReviewState::EditingTitle => {
                ReviewEvent::TitleEdited(prompter.input("Title", &session.artifact().title)?)
            }
            ReviewState::EditingBody => {
                let edited = prompter.edit(&session.artifact().body)?;
                if edited.is_none() {
                    sink.warning("Editor exited without saving; keeping the previous body.");
                }
                ReviewEvent::BodyEdited(edited)
            }
            ReviewState::Confirmed | ReviewState::Cancelled => break,
        };
        session.handle(event)?;
    }

    Ok(match session.into_confirmed() {
        Some(artifact) => Flow::Proceed(artifact),
        None => Flow::Abort("Cancelled.".to_string()),
    })
}

fn display(sink: &dyn OutputSink, artifact: &GeneratedArtifact) {
    let body = if artifact.body.trim().is_empty() {
        "(no body)"
    } else {
        artifact.body.trim_end()
    };
    sink.info(&format!(
        "\nGenerated {}:\n\nTitle: {}\n\n{}\n",
        artifact.kind, artifact.title, body
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::ArtifactKind;
    use crate::output::{Level, MemorySink};
    use crate::prompt::{Answer, ScriptedPrompter};

    fn artifact() -> GeneratedArtifact {
        GeneratedArtifact {
            kind: ArtifactKind::PullRequest,
            title: "Add login".into(),
            body: "- adds a login form".into(),
        }
    }

    const CONFIRM: Answer = Answer::Select(0);
    const EDIT_TITLE: Answer = Answer::Select(1);
    const EDIT_BODY: Answer = Answer::Select(2);
    const CANCEL: Answer = Answer::Select(3);

    #[test]
    fn transitions_from_reviewing() {
        let cases = [
            (ReviewAction::Confirm, ReviewState::Confirmed),
            (ReviewAction::EditTitle, ReviewState::EditingTitle),
            (ReviewAction::EditBody, ReviewState::EditingBody),
            (ReviewAction::Cancel, ReviewState::Cancelled),
        ];
        for (action, expected) in cases {
            let mut session = ReviewSession::new(artifact());
            assert_eq!(session.handle(ReviewEvent::Choose(action)).unwrap(), expected);
        }
    }

    #[test]
    fn edits_return_to_reviewing() {
        let mut session = ReviewSession::new(artifact());
        session.handle(ReviewEvent::Choose(ReviewAction::EditTitle)).unwrap();
        let state = session.handle(ReviewEvent::TitleEdited("New".into())).unwrap();
        assert_eq!(state, ReviewState::Reviewing);
        assert_eq!(session.artifact().title, "New");
        assert_eq!(session.artifact().body, "- adds a login form");
    }

    #[test]
    fn invalid_event_is_rejected_without_change() {
        let mut session = ReviewSession::new(artifact());
        assert!(session.handle(ReviewEvent::TitleEdited("x".into())).is_err());
        assert_eq!(session.state(), ReviewState::Reviewing);
        assert_eq!(session.artifact().title, "Add login");

        session.handle(ReviewEvent::Choose(ReviewAction::Confirm)).unwrap();
        assert!(session.handle(ReviewEvent::Choose(ReviewAction::Cancel)).is_err());
        assert_eq!(session.state(), ReviewState::Confirmed);
    }

    #[test]
    fn immediate_confirm_returns_identical_artifact() {
        let mut prompter = ScriptedPrompter::new([CONFIRM]);
        let sink = MemorySink::new();

        let flow = run_review(artifact(), &mut prompter, &sink, false).unwrap();
        assert_eq!(flow, Flow::Proceed(artifact()));
    }

    #[test]
    fn skip_confirmations_bypasses_the_loop() {
        let mut prompter = ScriptedPrompter::new([]);
        let sink = MemorySink::new();

        let flow = run_review(artifact(), &mut prompter, &sink, true).unwrap();
        assert_eq!(flow, Flow::Proceed(artifact()));
        assert!(prompter.asked().is_empty());
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn cancel_aborts() {
        let mut prompter = ScriptedPrompter::new([CANCEL]);
        let sink = MemorySink::new();

        let flow = run_review(artifact(), &mut prompter, &sink, false).unwrap();
        assert!(flow.is_abort());
    }

    #[test]
    fn title_edit_replaces_only_title_and_redisplays() {
        let mut prompter = ScriptedPrompter::new([
            EDIT_TITLE,
            Answer::Input("Add OAuth login".into()),
            CONFIRM,
        ]);
        let sink = MemorySink::new();

        let Flow::Proceed(result) = run_review(artifact(), &mut prompter, &sink, false).unwrap()
        else {
            panic!("expected confirmation");
        };
        assert_eq!(result.title, "Add OAuth login");
        assert_eq!(result.body, artifact().body);

        let shown = sink.at(Level::Info);
        assert_eq!(shown.len(), 2);
        assert!(shown[1].contains("Add OAuth login"));
    }

    #[test]
    fn blank_title_keeps_previous() {
        let mut prompter =
            ScriptedPrompter::new([EDIT_TITLE, Answer::Input("   ".into()), CONFIRM]);
        let sink = MemorySink::new();

        let flow = run_review(artifact(), &mut prompter, &sink, false).unwrap();
        assert_eq!(flow, Flow::Proceed(artifact()));
    }

    #[test]
    fn body_edits_accumulate_across_cycles() {
        let mut prompter = ScriptedPrompter::new([
            EDIT_BODY,
            Answer::Edit(Some("first draft\n".into())),
            EDIT_BODY,
            Answer::Edit(Some("first draft\nsecond pass\n".into())),
            CONFIRM,
        ]);
        let sink = MemorySink::new();

        let Flow::Proceed(result) = run_review(artifact(), &mut prompter, &sink, false).unwrap()
        else {
            panic!("expected confirmation");
        };
        assert_eq!(result.body, "first draft\nsecond pass\n");
        assert_eq!(
            prompter.edit_seeds(),
            ["- adds a login form", "first draft\n"]
        );
    }

    #[test]
    fn abandoned_editor_keeps_body_and_warns() {
        let mut prompter = ScriptedPrompter::new([EDIT_BODY, Answer::Edit(None), CONFIRM]);
        let sink = MemorySink::new();

        let flow = run_review(artifact(), &mut prompter, &sink, false).unwrap();
        assert_eq!(flow, Flow::Proceed(artifact()));
        assert_eq!(sink.at(Level::Warning).len(), 1);
    }

    #[test]
    fn cancel_after_edits_still_aborts() {
        let mut prompter = ScriptedPrompter::new([
            EDIT_BODY,
            Answer::Edit(Some("kept".into())),
            EDIT_TITLE,
            Answer::Input("Renamed".into()),
            CANCEL,
        ]);
        let sink = MemorySink::new();

        let flow = run_review(artifact(), &mut prompter, &sink, false).unwrap();
        assert!(flow.is_abort());
        assert_eq!(prompter.remaining(), 0);
    }
}
