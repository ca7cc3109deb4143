//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use git2::{Oid, Repository, RepositoryInitOptions, Signature};

use quill::ai::{AiProvider, ProviderFailure, StructuredRequest};
use quill::config::ResolvedConfig;
use quill::process::SystemRunner;

/// A test git repository builder for integration tests.
///
/// The repository starts on `main` with a committer identity configured so the
/// `git` binary can commit in it.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository in a temp directory.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mut opts = RepositoryInitOptions::new();
        opts.initial_head("main");
        let repo = Repository::init_opts(dir.path(), &opts).expect("Failed to init git repo");

        let mut config = repo.config().expect("Failed to open repo config");
        config.set_str("user.name", "Test User").expect("Failed to set user.name");
        config
            .set_str("user.email", "test@example.com")
            .expect("Failed to set user.email");
        config
            .set_bool("commit.gpgsign", false)
            .expect("Failed to set commit.gpgsign");

        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A runner whose commands execute inside this repository.
    pub fn runner(&self) -> SystemRunner {
        SystemRunner::in_dir(self.path())
    }

    /// Get the test signature for commits.
    fn signature(&self) -> Signature<'_> {
        Signature::now("Test User", "test@example.com").expect("Failed to create signature")
    }

    /// Write `content` to `file` in the working tree.
    pub fn write(&self, file: &str, content: &str) -> PathBuf {
        let path = self.path().join(file);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(&path, content).expect("Failed to write test file");
        path
    }

    /// Add `file` to the index.
    pub fn stage(&self, file: &str) {
        let mut index = self.repo.index().expect("Failed to get index");
        index.add_path(Path::new(file)).expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Write, stage and commit `file`. Returns the commit OID.
    pub fn commit_file(&self, file: &str, content: &str, message: &str) -> Oid {
        self.write(file, content);
        self.stage(file);
        self.commit_index(message)
    }

    /// Commit whatever is in the index on top of HEAD.
    pub fn commit_index(&self, message: &str) -> Oid {
        let sig = self.signature();
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Create `name` at HEAD and check it out.
    pub fn checkout_new_branch(&self, name: &str) {
        let head = self
            .repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .expect("Failed to resolve HEAD");
        self.repo.branch(name, &head, false).expect("Failed to create branch");
        self.repo
            .set_head(&format!("refs/heads/{name}"))
            .expect("Failed to switch HEAD");
    }

    /// Full message of the commit at HEAD.
    pub fn head_message(&self) -> String {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.message().unwrap_or_default().to_string())
            .expect("Failed to read HEAD commit")
    }

    pub fn head_oid(&self) -> Oid {
        self.repo
            .head()
            .and_then(|h| h.peel_to_commit())
            .map(|c| c.id())
            .expect("Failed to read HEAD commit")
    }
}

/// Provider that answers every request with the same JSON text and records
/// the prompts it was sent.
pub struct StaticProvider {
    response: Result<String, ProviderFailure>,
    requests: Mutex<Vec<StructuredRequest>>,
}

impl StaticProvider {
    pub fn json(title: &str, body: &str) -> Self {
        Self::raw(serde_json::json!({ "title": title, "body": body }).to_string())
    }

    pub fn raw(text: impl Into<String>) -> Self {
        Self {
            response: Ok(text.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing(failure: ProviderFailure) -> Self {
        Self {
            response: Err(failure),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<StructuredRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiProvider for StaticProvider {
    async fn generate_object(
        &self,
        request: &StructuredRequest,
    ) -> Result<String, ProviderFailure> {
        self.requests.lock().unwrap().push(request.clone());
        self.response.clone()
    }
}

/// Defaults with confirmations on or off.
pub fn config(skip_confirmations: bool) -> ResolvedConfig {
    ResolvedConfig {
        skip_confirmations,
        ..ResolvedConfig::default()
    }
}
