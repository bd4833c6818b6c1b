//! Waymark File Store
//!
//! JSON-documents-on-disk persistence layer: atomic writes (temp + rename),
//! soft reads, and per-key FIFO locking for read-modify-write sequences.
//! The files it writes are the durable source of truth; version control of
//! those files is a separate, best-effort concern.

mod error;
mod locks;
mod store;

pub use error::{Result, StoreError};
pub use locks::KeyLocks;
pub use store::JsonStore;
