//! Git Publishing Operations
//!
//! Commits changed content files into the data repository, optionally
//! pushing to a remote

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

use super::Publisher;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("Git2 error: {0}")]
    Git2(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not inside the data repository: {0}")]
    OutsideRepo(PathBuf),

    #[error("Repository has no working directory")]
    BareRepository,

    #[error("Join failed: {0}")]
    Join(String),
}

#[derive(Debug, Clone)]
pub struct GitPublisher {
    repo_dir: PathBuf,
    author_name: String,
    author_email: String,
    push: bool,
    remote: String,
    branch: String,
}

impl GitPublisher {
    pub fn new(
        repo_dir: impl Into<PathBuf>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
    ) -> Self {
        Self {
            repo_dir: repo_dir.into(),
            author_name: author_name.into(),
            author_email: author_email.into(),
            push: false,
            remote: "origin".to_string(),
            branch: "main".to_string(),
        }
    }

    pub fn with_push(mut self, remote: impl Into<String>, branch: impl Into<String>) -> Self {
        self.push = true;
        self.remote = remote.into();
        self.branch = branch.into();
        self
    }

    /// Stage the given paths and commit them. Returns the new commit id.
    fn commit(&self, paths: &[PathBuf], message: &str) -> Result<String, GitError> {
        let repo = git2::Repository::open(&self.repo_dir)?;
        let workdir = repo.workdir().ok_or(GitError::BareRepository)?.to_path_buf();

        let mut index = repo.index()?;
        for path in paths {
            let rel = path
                .strip_prefix(&workdir)
                .map_err(|_| GitError::OutsideRepo(path.clone()))?;
            index.add_path(rel)?;
        }
        index.write()?;

        let tree_id = index.write_tree()?;
        let tree = repo.find_tree(tree_id)?;
        let sig = git2::Signature::now(&self.author_name, &self.author_email)?;

        let parent = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        let parents: Vec<&git2::Commit> = parent.iter().collect();

        let oid = repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parents)?;

        if self.push {
            Self::push_head(&repo, &self.remote, &self.branch)?;
        }

        Ok(oid.to_string())
    }

    fn push_head(repo: &git2::Repository, remote: &str, branch: &str) -> Result<(), GitError> {
        let mut remote = repo.find_remote(remote)?;
        let refspec = format!("refs/heads/{0}:refs/heads/{0}", branch);
        remote.push(&[refspec.as_str()], None)?;
        Ok(())
    }
}

#[async_trait]
impl Publisher for GitPublisher {
    async fn publish(&self, paths: &[PathBuf], message: &str) {
        let publisher = self.clone();
        let paths = paths.to_vec();
        let message = message.to_string();

        // git2 is blocking; keep it off the request runtime.
        let result = tokio::task::spawn_blocking(move || publisher.commit(&paths, &message))
            .await
            .map_err(|e| GitError::Join(e.to_string()))
            .and_then(|r| r);

        match result {
            Ok(oid) => debug!(commit = %oid, "Published content change"),
            Err(e) => warn!(error = %e, "Publish failed, content remains on disk"),
        }
    }
}

/// Open-or-init used at startup so a fresh `DATA_DIR` works out of the box.
pub fn ensure_repository(dir: &Path) -> Result<(), GitError> {
    match git2::Repository::open(dir) {
        Ok(_) => Ok(()),
        Err(_) => {
            debug!(dir = %dir.display(), "Initializing data repository");
            std::fs::create_dir_all(dir)?;
            git2::Repository::init(dir)?;
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn head_message(dir: &Path) -> String {
        let repo = git2::Repository::open(dir).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        head.message().unwrap().to_string()
    }

    #[tokio::test]
    async fn commits_changed_files() {
        let dir = tempdir().unwrap();
        git2::Repository::init(dir.path()).unwrap();

        let file = dir.path().join("days").join("2024-07-14.json");
        std::fs::create_dir_all(file.parent().unwrap()).unwrap();
        std::fs::write(&file, b"{}").unwrap();

        let publisher = GitPublisher::new(dir.path(), "Test", "test@example.com");
        publisher
            .publish(&[file.clone()], "days: update 2024-07-14")
            .await;

        assert_eq!(head_message(dir.path()), "days: update 2024-07-14");

        // A second change produces a second commit on top of the first.
        std::fs::write(&file, b"{\"title\":\"x\"}").unwrap();
        publisher.publish(&[file], "days: update 2024-07-14").await;

        let repo = git2::Repository::open(dir.path()).unwrap();
        let head = repo.head().unwrap().peel_to_commit().unwrap();
        assert_eq!(head.parent_count(), 1);
    }

    #[tokio::test]
    async fn publish_failure_is_swallowed() {
        let dir = tempdir().unwrap();
        // No repository here: commit fails, publish still returns.
        let publisher = GitPublisher::new(dir.path(), "Test", "test@example.com");
        publisher
            .publish(&[dir.path().join("x.json")], "should not panic")
            .await;
    }

    #[test]
    fn ensure_repository_initializes_once() {
        let dir = tempdir().unwrap();
        ensure_repository(dir.path()).unwrap();
        ensure_repository(dir.path()).unwrap();
        assert!(dir.path().join(".git").exists());
    }
}
