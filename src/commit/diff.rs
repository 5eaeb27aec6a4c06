//! Staged diff collection and the repository seam using git2.

use std::path::{Path, PathBuf};

use git2::{DiffFormat, ErrorCode, Repository, Tree};
use tracing::debug;

use crate::error::GitError;

use super::message::create_commit;

/// File name of the message cache inside the git directory.
pub const CACHE_FILE_NAME: &str = "diffscribe_cache.json";

/// The version-control collaborator the workflow talks to.
#[cfg_attr(test, mockall::automock)]
pub trait Vcs {
    /// Full patch text of the staged changes.
    ///
    /// Returns `GitError::NoStagedChanges` when nothing is staged.
    fn staged_diff(&self) -> Result<String, GitError>;

    /// Commit the staged changes with `message`, returning the new commit id.
    fn commit(&self, message: &str) -> Result<String, GitError>;
}

/// A git repository opened through libgit2.
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Find the repository containing `path`, walking up parent directories.
    pub fn discover(path: &Path) -> Result<Self, GitError> {
        let repo = Repository::discover(path).map_err(GitError::VcsUnavailable)?;
        debug!("Using repository at {}", repo.path().display());
        Ok(Self { repo })
    }

    /// The `.git` directory (or the bare repository root).
    pub fn git_dir(&self) -> &Path {
        self.repo.path()
    }

    /// Where the message cache lives unless overridden.
    pub fn default_cache_path(&self) -> PathBuf {
        self.git_dir().join(CACHE_FILE_NAME)
    }
}

impl Vcs for GitRepository {
    fn staged_diff(&self) -> Result<String, GitError> {
        collect_staged_diff(&self.repo)
    }

    fn commit(&self, message: &str) -> Result<String, GitError> {
        create_commit(&self.repo, message).map(|oid| oid.to_string())
    }
}

/// Resolve the HEAD tree, distinguishing empty-repo errors from real failures.
///
/// Returns `Ok(None)` for repos with no commits (unborn branch / not found),
/// `Ok(Some(tree))` for repos with a valid HEAD, or `Err(GitError::DiffFailed)`
/// for real errors (corrupt HEAD, permission issues, missing objects).
fn resolve_head_tree(repo: &Repository) -> Result<Option<Tree<'_>>, GitError> {
    let head_ref = match repo.head() {
        Ok(r) => r,
        Err(e) if e.code() == ErrorCode::UnbornBranch || e.code() == ErrorCode::NotFound => {
            return Ok(None);
        }
        Err(e) => return Err(GitError::DiffFailed(e)),
    };

    let tree = head_ref.peel_to_tree().map_err(GitError::DiffFailed)?;
    Ok(Some(tree))
}

/// Collect the staged changes (HEAD tree vs index) as unified patch text.
///
/// Equivalent to `git diff --cached`. In a repository without commits every
/// staged file shows up as an addition.
pub fn collect_staged_diff(repo: &Repository) -> Result<String, GitError> {
    let head_tree = resolve_head_tree(repo)?;

    let diff = repo
        .diff_tree_to_index(head_tree.as_ref(), None, None)
        .map_err(GitError::DiffFailed)?;

    if diff.deltas().len() == 0 {
        return Err(GitError::NoStagedChanges);
    }

    let mut text = String::new();
    diff.print(DiffFormat::Patch, |_delta, _hunk, line| {
        // Content lines carry their origin separately from the text.
        let origin = line.origin();
        if matches!(origin, '+' | '-' | ' ') {
            text.push(origin);
        }
        text.push_str(&String::from_utf8_lossy(line.content()));
        true
    })
    .map_err(GitError::DiffFailed)?;

    if text.trim().is_empty() {
        return Err(GitError::NoStagedChanges);
    }

    debug!(
        "Collected staged diff: {} files, {} bytes",
        diff.deltas().len(),
        text.len()
    );
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use git2::Signature;

    fn init_with_commit(dir: &Path) -> Repository {
        let repo = Repository::init(dir).unwrap();
        {
            let sig = Signature::now("Test", "test@test.com").unwrap();
            let tree_id = repo.index().unwrap().write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                .unwrap();
        }
        repo
    }

    fn stage(repo: &Repository, dir: &Path, name: &str, content: &str) {
        std::fs::write(dir.join(name), content).unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new(name)).unwrap();
        index.write().unwrap();
    }

    #[test]
    fn test_clean_repo_has_no_staged_changes() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path());

        let result = collect_staged_diff(&repo);
        assert!(matches!(result, Err(GitError::NoStagedChanges)));
    }

    #[test]
    fn test_untracked_files_are_not_staged() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path());

        std::fs::write(dir.path().join("new.txt"), "hello world\n").unwrap();

        let result = collect_staged_diff(&repo);
        assert!(matches!(result, Err(GitError::NoStagedChanges)));
    }

    #[test]
    fn test_staged_new_file_is_in_patch() {
        let dir = tempfile::tempdir().unwrap();
        let repo = init_with_commit(dir.path());

        stage(&repo, dir.path(), "new.txt", "hello world\n");

        let diff = collect_staged_diff(&repo).unwrap();
        assert!(diff.contains("diff --git a/new.txt b/new.txt"));
        assert!(diff.contains("+hello world"));
    }

    #[test]
    fn test_staged_modification_has_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();
        stage(&repo, dir.path(), "file.txt", "original\n");
        {
            let mut index = repo.index().unwrap();
            let tree_id = index.write_tree().unwrap();
            let tree = repo.find_tree(tree_id).unwrap();
            let sig = Signature::now("Test", "test@test.com").unwrap();
            repo.commit(Some("HEAD"), &sig, &sig, "init", &tree, &[])
                .unwrap();
        }

        stage(&repo, dir.path(), "file.txt", "modified\n");
        // Unstaged edits after staging must not show up.
        std::fs::write(dir.path().join("file.txt"), "unstaged\n").unwrap();

        let diff = collect_staged_diff(&repo).unwrap();
        assert!(diff.contains("-original"));
        assert!(diff.contains("+modified"));
        assert!(!diff.contains("unstaged"));
    }

    #[test]
    fn test_empty_repo_stages_against_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path()).unwrap();

        stage(&repo, dir.path(), "first.txt", "first line\n");

        let diff = collect_staged_diff(&repo).unwrap();
        assert!(diff.contains("+first line"));
    }

    #[test]
    fn test_corrupt_head_propagates_error() {
        let dir = tempfile::tempdir().unwrap();
        init_with_commit(dir.path());

        std::fs::write(dir.path().join(".git/HEAD"), "ref: refs/heads/\0invalid").unwrap();

        let repo = Repository::open(dir.path()).unwrap();
        let result = collect_staged_diff(&repo);
        assert!(
            matches!(result, Err(GitError::DiffFailed(_))),
            "Expected DiffFailed for corrupt HEAD, got: {:?}",
            result
        );
    }

    #[test]
    fn test_discover_outside_repository_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let result = GitRepository::discover(dir.path());
        assert!(matches!(result, Err(GitError::VcsUnavailable(_))));
    }

    #[test]
    fn test_discover_from_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        init_with_commit(dir.path());
        let nested = dir.path().join("src/nested");
        std::fs::create_dir_all(&nested).unwrap();

        let repo = GitRepository::discover(&nested).unwrap();
        assert!(repo.default_cache_path().ends_with(".git/diffscribe_cache.json"));
    }
}
