//! Error types for Waymark services

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WaymarkError>;

#[derive(Error, Debug)]
pub enum WaymarkError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Publish error: {0}")]
    Publish(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl WaymarkError {
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Validation(_) => 400,
            Self::NotFound(_) => 404,
            _ => 500,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Publish(_) => "PUBLISH_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<std::io::Error> for WaymarkError {
    fn from(err: std::io::Error) -> Self {
        WaymarkError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for WaymarkError {
    fn from(err: serde_json::Error) -> Self {
        WaymarkError::Internal(err.to_string())
    }
}
