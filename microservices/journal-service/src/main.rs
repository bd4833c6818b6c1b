//! Journal Service
//!
//! Backend of the Waymark travel journal:
//! - Day documents (route, track points, photos) as JSON files
//! - Reactions and comments on photos and photo stacks
//! - Stack roll-up aggregation for the social feed
//! - Best-effort git publishing of every content change

use std::sync::Arc;
use tracing::info;
use waymark_core::{
    DependencyStatus, HealthStatus, ReadinessStatus, Result, ServiceRuntime, WaymarkService,
};
use waymark_fstore::{JsonStore, KeyLocks};

mod api;
mod config;
mod days;
mod error;
mod interactions;
mod publish;
mod types;

#[cfg(test)]
mod tests;

pub use config::JournalConfig;
pub use days::DayService;
pub use interactions::InteractionService;
pub use types::*;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("journal_service=debug".parse().expect("valid tracing directive")),
        )
        .json()
        .init();

    info!("Starting Journal Service");

    let service = Arc::new(JournalService::new().await?);
    ServiceRuntime::run(service).await
}

pub struct JournalService {
    config: JournalConfig,
    days: DayService,
    interactions: InteractionService,
    start_time: std::time::Instant,
}

impl JournalService {
    pub async fn new() -> Result<Self> {
        let config = JournalConfig::from_env();

        let publisher: Arc<dyn publish::Publisher> = if config.git_enabled {
            publish::ensure_repository(&config.data_dir)
                .map_err(|e| waymark_core::WaymarkError::Publish(e.to_string()))?;
            let mut git = publish::GitPublisher::new(
                &config.data_dir,
                &config.git_author_name,
                &config.git_author_email,
            );
            if config.git_push {
                git = git.with_push(&config.git_remote, &config.git_branch);
            }
            Arc::new(git)
        } else {
            Arc::new(publish::NoopPublisher)
        };

        let store = JsonStore::new(&config.data_dir);
        let locks = Arc::new(KeyLocks::new());

        let days = DayService::new(store.clone(), Arc::clone(&locks), Arc::clone(&publisher));
        let interactions = InteractionService::new(store, locks, publisher);

        Ok(Self {
            config,
            days,
            interactions,
            start_time: std::time::Instant::now(),
        })
    }
}

#[async_trait::async_trait]
impl WaymarkService for JournalService {
    fn service_id(&self) -> &'static str {
        "journal-service"
    }

    async fn health(&self) -> HealthStatus {
        HealthStatus {
            healthy: true,
            service_id: self.service_id().to_string(),
            version: self.version().to_string(),
            uptime_seconds: self.start_time.elapsed().as_secs(),
        }
    }

    async fn ready(&self) -> ReadinessStatus {
        let data_dir_available = tokio::fs::metadata(&self.config.data_dir).await.is_ok();
        ReadinessStatus {
            ready: data_dir_available,
            dependencies: vec![DependencyStatus {
                name: "data-dir".to_string(),
                available: data_dir_available,
            }],
        }
    }

    async fn shutdown(&self) -> Result<()> {
        info!("Shutting down Journal Service");
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        info!(
            http = %self.config.http_bind,
            data_dir = %self.config.data_dir.display(),
            "Starting Journal Service server"
        );

        let router = api::rest::create_router(self.days.clone(), self.interactions.clone());

        let listener = tokio::net::TcpListener::bind(&self.config.http_bind).await?;
        axum::serve(listener, router).await?;

        Ok(())
    }
}
