//! Waymark Core - Shared domain types and service infrastructure
//!
//! This crate provides:
//! - Standard service trait all Waymark services implement
//! - Common domain types (DaySlug, SubjectId, etc.)
//! - Error handling utilities
//! - Configuration management

pub mod config;
pub mod domain;
pub mod error;
pub mod service;

pub use config::ServiceConfig;
pub use domain::*;
pub use error::{Result, WaymarkError};
pub use service::{DependencyStatus, HealthStatus, ReadinessStatus, ServiceRuntime, WaymarkService};
