//! Atomic JSON document store
//!
//! One JSON document per file under a base directory. Writes go to a
//! sibling temp file and are renamed into place, so a reader sees either
//! the old or the new complete document, never a torn write. Reads fail
//! soft: a missing or unparseable file is indistinguishable from "no data".

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

use crate::error::{Result, StoreError};

#[derive(Debug, Clone)]
pub struct JsonStore {
    base: PathBuf,
}

impl JsonStore {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    /// Resolve a store-relative path, rejecting anything that would land
    /// outside the base directory. Identifiers are grammar-checked before
    /// they reach the store; this check backs that up at the path layer.
    fn resolve(&self, rel: &str) -> Result<PathBuf> {
        let rel_path = Path::new(rel);
        let contained = rel_path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !contained {
            return Err(StoreError::PathEscape(rel_path.to_path_buf()));
        }
        Ok(self.base.join(rel_path))
    }

    /// Read a document. Missing or corrupt files yield `None`, never an
    /// error: absence of a file is a valid state (nothing stored yet).
    pub async fn read<T: DeserializeOwned>(&self, rel: &str) -> Option<T> {
        let path = match self.resolve(rel) {
            Ok(p) => p,
            Err(e) => {
                warn!(rel, error = %e, "Rejected read path");
                return None;
            }
        };

        let bytes = match tokio::fs::read(&path).await {
            Ok(b) => b,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::NotFound {
                    warn!(path = %path.display(), error = %e, "Failed to read document");
                }
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unparseable document, treating as absent");
                None
            }
        }
    }

    /// Write a document atomically and return the absolute path written.
    ///
    /// The temp file lives next to the target so the rename never crosses
    /// a filesystem boundary.
    pub async fn write<T: Serialize>(&self, rel: &str, value: &T) -> Result<PathBuf> {
        let path = self.resolve(rel)?;

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document.json");
        let tmp_path = path.with_file_name(format!("{}.tmp.{}", file_name, std::process::id()));

        let json = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&tmp_path, &json).await?;

        if let Err(e) = tokio::fs::rename(&tmp_path, &path).await {
            let _ = tokio::fs::remove_file(&tmp_path).await;
            return Err(e.into());
        }

        Ok(path)
    }
}
