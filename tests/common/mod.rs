//! Shared test utilities for integration tests.
//!
//! Not all functions are used by every test file, but they're shared across tests.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use git2::{Oid, Repository, Signature};

use diffscribe::error::ProviderError;
use diffscribe::llm::{CommitMessageProvider, Provider};

/// A test git repository builder for integration tests.
pub struct TestRepo {
    pub dir: tempfile::TempDir,
    pub repo: Repository,
}

impl TestRepo {
    /// Create a new empty git repository with a committer identity configured.
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let repo = Repository::init(dir.path()).expect("Failed to init git repo");
        {
            let mut config = repo.config().expect("Failed to open repo config");
            config
                .set_str("user.name", "Test User")
                .expect("Failed to set user.name");
            config
                .set_str("user.email", "test@example.com")
                .expect("Failed to set user.email");
        }
        Self { dir, repo }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn git_dir(&self) -> PathBuf {
        self.repo.path().to_path_buf()
    }

    /// Write `content` to `name` in the work tree without staging it.
    pub fn write_file(&self, name: &str, content: &str) {
        let file_path = self.dir.path().join(name);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        std::fs::write(&file_path, content).expect("Failed to write test file");
    }

    /// Write and stage a file.
    pub fn stage_file(&self, name: &str, content: &str) {
        self.write_file(name, content);
        let mut index = self.repo.index().expect("Failed to get index");
        index
            .add_path(Path::new(name))
            .expect("Failed to add file");
        index.write().expect("Failed to write index");
    }

    /// Commit the current index. Returns the commit OID.
    pub fn commit(&self, message: &str) -> Oid {
        let sig = Signature::now("Test User", "test@example.com").expect("Failed to create signature");
        let mut index = self.repo.index().expect("Failed to get index");
        let tree_id = index.write_tree().expect("Failed to write tree");
        let tree = self.repo.find_tree(tree_id).expect("Failed to find tree");

        // Get parent commit if exists
        let parent = self.repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        self.repo
            .commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)
            .expect("Failed to create commit")
    }

    /// Message of the commit HEAD points at.
    pub fn head_message(&self) -> String {
        let head = self
            .repo
            .head()
            .expect("No HEAD")
            .peel_to_commit()
            .expect("HEAD is not a commit");
        head.message().unwrap_or_default().to_string()
    }

    pub fn commit_count(&self) -> usize {
        let mut walk = self.repo.revwalk().expect("Failed to create revwalk");
        if walk.push_head().is_err() {
            return 0;
        }
        walk.count()
    }
}

/// How a [`FakeProvider`] answers.
#[derive(Clone)]
pub enum Reply {
    Message(String),
    Fail(u16),
    Hang(Duration),
}

/// A scripted backend that records the diffs it receives.
pub struct FakeProvider {
    provider: Provider,
    reply: Reply,
    calls: AtomicU32,
    seen: std::sync::Mutex<Vec<String>>,
}

impl FakeProvider {
    pub fn new(provider: Provider, reply: Reply) -> Arc<Self> {
        Arc::new(Self {
            provider,
            reply,
            calls: AtomicU32::new(0),
            seen: std::sync::Mutex::new(Vec::new()),
        })
    }

    pub fn replying(provider: Provider, message: &str) -> Arc<Self> {
        Self::new(provider, Reply::Message(message.to_string()))
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl CommitMessageProvider for FakeProvider {
    fn provider(&self) -> Provider {
        self.provider
    }

    async fn generate(&self, diff: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(diff.to_string());
        match &self.reply {
            Reply::Message(msg) => Ok(msg.clone()),
            Reply::Fail(status) => Err(ProviderError::Http {
                provider: self.provider,
                status: *status,
                body: "scripted failure".to_string(),
            }),
            Reply::Hang(d) => {
                tokio::time::sleep(*d).await;
                Ok("late reply".to_string())
            }
        }
    }
}
