//! Shared domain types and configuration for the pain-signal radar.

pub mod app_config;
pub mod config;
pub mod filters;
pub mod posts;

use thiserror::Error;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use filters::{AdminFilter, AdminFilterUpdate, GeoScope};
pub use posts::{Platform, RawPost};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("geo_scope must be INDIA or GLOBAL, got {0:?}")]
    InvalidGeoScope(String),

    #[error("unknown platform: {0}")]
    InvalidPlatform(String),
}
