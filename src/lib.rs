//! quill - A CLI tool that writes pull request descriptions and commit
//! messages from the state of your git working copy.
//!
//! # Overview
//!
//! quill reads branch, tracking and staging state through the system `git`,
//! asks an AI provider for a schema-validated title and body, lets you review
//! and edit the result, then commits or opens a pull request with `gh`.

pub mod ai;
pub mod config;
pub mod error;
pub mod finalize;
pub mod flow;
pub mod git;
pub mod init;
pub mod output;
pub mod preflight;
pub mod process;
pub mod prompt;
pub mod review;
pub mod sync;
pub mod workflow;

// Re-export commonly used types
pub use ai::{AiError, ArtifactKind, GeneratedArtifact};
pub use config::ResolvedConfig;
pub use error::{AppError, ErrorKind};
pub use flow::Flow;
pub use git::{BranchState, ChangeSet};
pub use review::{ReviewSession, ReviewState};
