//! Journal Service Configuration

use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct JournalConfig {
    pub http_bind: String,
    /// Root of the published content repository. Day documents live under
    /// `days/`, interaction records under `interactions/`.
    pub data_dir: PathBuf,
    pub git_enabled: bool,
    pub git_push: bool,
    pub git_remote: String,
    pub git_branch: String,
    pub git_author_name: String,
    pub git_author_email: String,
}

impl JournalConfig {
    pub fn from_env() -> Self {
        Self {
            http_bind: std::env::var("HTTP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            data_dir: std::env::var("DATA_DIR")
                .unwrap_or_else(|_| "./data".to_string())
                .into(),
            git_enabled: std::env::var("GIT_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .unwrap_or(true),
            git_push: std::env::var("GIT_PUSH")
                .unwrap_or_else(|_| "false".to_string())
                .parse()
                .unwrap_or(false),
            git_remote: std::env::var("GIT_REMOTE").unwrap_or_else(|_| "origin".to_string()),
            git_branch: std::env::var("GIT_BRANCH").unwrap_or_else(|_| "main".to_string()),
            git_author_name: std::env::var("GIT_AUTHOR_NAME")
                .unwrap_or_else(|_| "Waymark Journal".to_string()),
            git_author_email: std::env::var("GIT_AUTHOR_EMAIL")
                .unwrap_or_else(|_| "journal@waymark.local".to_string()),
        }
    }
}
