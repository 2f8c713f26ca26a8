//! Platform collectors producing [`RawPost`]s from keyword queries.
//!
//! Every collector is failure-isolated: [`Collector::fetch`] never errors.
//! Missing credentials, transport failures, and bad responses are logged at
//! `warn` and collapse to an empty batch so one platform can never abort a
//! pipeline run.

pub mod error;
mod producthunt;
mod reddit;
mod twitter;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use radar_core::{AppConfig, Platform, RawPost};

pub use error::CollectorError;
pub use producthunt::ProductHuntCollector;
pub use reddit::{RedditCollector, RedditCredentials};
pub use twitter::TwitterCollector;

/// A read-only source of raw posts for one platform.
#[async_trait]
pub trait Collector: Send + Sync {
    fn platform(&self) -> Platform;

    /// Result cap passed by the orchestrator when it has no other preference.
    fn default_limit(&self) -> usize;

    /// Fetch posts matching any of `keywords`. Returns an empty batch on any
    /// failure or when the collector is not configured.
    async fn fetch(&self, keywords: &[String], limit: usize) -> Vec<RawPost>;
}

/// Build the three platform collectors from application config.
///
/// Collectors whose credentials are absent are still returned; they simply
/// always yield empty batches.
///
/// # Errors
///
/// Returns [`CollectorError::Http`] if an HTTP client cannot be constructed.
pub fn collectors_from_config(
    config: &AppConfig,
) -> Result<Vec<Box<dyn Collector>>, CollectorError> {
    Ok(vec![
        Box::new(RedditCollector::from_config(config)?),
        Box::new(ProductHuntCollector::from_config(config)?),
        Box::new(TwitterCollector::from_config(config)?),
    ])
}

pub(crate) fn build_http_client(timeout_secs: u64) -> Result<reqwest::Client, CollectorError> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .build()?;
    Ok(client)
}

/// Clamp a platform counter into the stored `i32` range; negatives become 0.
pub(crate) fn clamp_count(value: i64) -> i32 {
    i32::try_from(value.max(0)).unwrap_or(i32::MAX)
}

/// Parse an RFC 3339 timestamp, falling back to "now" when absent or invalid.
pub(crate) fn parse_timestamp(value: Option<&str>) -> DateTime<Utc> {
    value
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map_or_else(Utc::now, |parsed| parsed.with_timezone(&Utc))
}
