//! Journal Service domain types

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reactions and comments attached to a photo or stack.
///
/// Created lazily: a missing file on disk reads as the default record.
/// Zero-count reaction keys are removed rather than persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(default)]
    pub reactions: BTreeMap<String, u64>,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    /// Millisecond-epoch string, strictly increasing within a record.
    pub id: String,
    pub text: String,
    pub author: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Set to the edit time when the text has been replaced.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edited: Option<i64>,
}

/// Result of a react mutation: the post-mutation count for the emoji and
/// whether this call removed (rather than added) a reaction.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ReactOutcome {
    pub count: u64,
    pub removed: bool,
}

/// Combined view of a stack's interactions plus those of its member photos.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rollup {
    pub reactions: BTreeMap<String, u64>,
    pub comments: Vec<Comment>,
    pub total_comment_count: usize,
    pub total_reaction_count: u64,
}

/// One entry of `days/index.json`, kept sorted by slug (ISO dates, so
/// lexicographic order is chronological).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub segment: Option<String>,
    pub photo_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
}
