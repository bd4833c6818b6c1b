//! Core domain types used across Waymark services

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{Result, WaymarkError};

/// Day identifier, fixed `YYYY-MM-DD` grammar.
///
/// Slugs double as file names on disk, so the grammar is enforced before
/// any path is built from one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DaySlug(String);

impl DaySlug {
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let shaped = bytes.len() == 10
            && bytes[4] == b'-'
            && bytes[7] == b'-'
            && bytes
                .iter()
                .enumerate()
                .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit());
        if shaped {
            Ok(Self(s.to_string()))
        } else {
            Err(WaymarkError::Validation(format!("invalid day slug: {}", s)))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// File name of the day document inside the days directory.
    pub fn file_name(&self) -> String {
        format!("{}.json", self.0)
    }
}

impl fmt::Display for DaySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Photo or stack identifier: one or more of `[A-Za-z0-9_-]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubjectId(String);

impl SubjectId {
    pub fn parse(s: &str) -> Result<Self> {
        if Self::is_valid(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(WaymarkError::Validation(format!("invalid id: {}", s)))
        }
    }

    pub fn is_valid(s: &str) -> bool {
        !s.is_empty()
            && s.chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SubjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Target of an interaction: an individual photo, or a spatial stack of
/// nearby photos (a client-derived grouping, not a persisted entity).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Subject {
    Photo(SubjectId),
    Stack(SubjectId),
}

impl Subject {
    /// File name of the interaction record inside the interactions
    /// directory. Stacks are prefixed so photo and stack ids cannot collide.
    pub fn file_name(&self) -> String {
        match self {
            Self::Photo(id) => format!("{}.json", id),
            Self::Stack(id) => format!("stack_{}.json", id),
        }
    }

    pub fn id(&self) -> &SubjectId {
        match self {
            Self::Photo(id) | Self::Stack(id) => id,
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Photo(id) => write!(f, "photo {}", id),
            Self::Stack(id) => write!(f, "stack {}", id),
        }
    }
}
