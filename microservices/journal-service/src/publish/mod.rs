//! Publish collaborator
//!
//! Records changed content files in version control after they are durably
//! on disk. Categorically best-effort: the on-disk JSON is the source of
//! truth, so implementations log failures and never surface them to the
//! request path.

mod git;

pub use git::{ensure_repository, GitPublisher};

use async_trait::async_trait;
use std::path::PathBuf;

#[async_trait]
pub trait Publisher: Send + Sync {
    /// Stage and commit the changed paths with a human-readable message.
    async fn publish(&self, paths: &[PathBuf], message: &str);
}

/// Publisher used when version control is disabled.
pub struct NoopPublisher;

#[async_trait]
impl Publisher for NoopPublisher {
    async fn publish(&self, _paths: &[PathBuf], _message: &str) {}
}
