//! Twitter/X collector (API v2 recent search).

use std::collections::HashSet;

use async_trait::async_trait;
use radar_core::{AppConfig, Platform, RawPost};
use serde::Deserialize;

use crate::{build_http_client, clamp_count, parse_timestamp, Collector, CollectorError};

const DEFAULT_API_BASE: &str = "https://api.twitter.com";
const DEFAULT_LIMIT_PER_KEYWORD: usize = 15;
const MAX_TITLE_CHARS: usize = 120;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<Tweet>,
}

#[derive(Debug, Deserialize)]
struct Tweet {
    id: Option<String>,
    #[serde(default)]
    text: String,
    created_at: Option<String>,
    #[serde(default)]
    public_metrics: PublicMetrics,
}

#[derive(Debug, Default, Deserialize)]
struct PublicMetrics {
    #[serde(default)]
    like_count: i64,
    #[serde(default)]
    reply_count: i64,
}

/// Runs one recent-search query per keyword, English only, no retweets.
pub struct TwitterCollector {
    client: reqwest::Client,
    bearer_token: Option<String>,
    api_base: String,
}

impl TwitterCollector {
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn new(bearer_token: Option<String>, timeout_secs: u64) -> Result<Self, CollectorError> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            bearer_token,
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, CollectorError> {
        Self::new(
            config.twitter_bearer_token.clone(),
            config.collector_timeout_secs,
        )
    }

    /// Override the API host (for testing with wiremock).
    #[must_use]
    pub fn with_base_url(mut self, api_base: &str) -> Self {
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.bearer_token.is_some()
    }

    /// A non-success status for one keyword skips that keyword; transport
    /// errors abort the whole fetch.
    async fn try_fetch(
        &self,
        token: &str,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<RawPost>, CollectorError> {
        let endpoint = format!("{}/2/tweets/search/recent", self.api_base);
        // The API rejects max_results outside 10..=100.
        let max_results = limit.clamp(10, 100).to_string();

        let mut seen_ids = HashSet::new();
        let mut posts = Vec::new();

        for keyword in keywords {
            let query = format!("\"{keyword}\" lang:en -is:retweet");
            let response = self
                .client
                .get(&endpoint)
                .bearer_auth(token)
                .query(&[
                    ("query", query.as_str()),
                    ("max_results", max_results.as_str()),
                    ("tweet.fields", "created_at,public_metrics"),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                tracing::warn!(
                    platform = "twitter",
                    keyword = keyword.as_str(),
                    status = response.status().as_u16(),
                    "search returned non-success status; skipping keyword"
                );
                continue;
            }

            let page: SearchResponse = response.json().await?;
            for tweet in page.data {
                let Some(id) = tweet.id.clone().filter(|id| !id.is_empty()) else {
                    continue;
                };
                if seen_ids.insert(id.clone()) {
                    posts.push(to_raw_post(&id, tweet));
                }
            }
        }

        tracing::debug!(posts = posts.len(), keywords = keywords.len(), "collected tweets");
        Ok(posts)
    }
}

#[async_trait]
impl Collector for TwitterCollector {
    fn platform(&self) -> Platform {
        Platform::Twitter
    }

    fn default_limit(&self) -> usize {
        DEFAULT_LIMIT_PER_KEYWORD
    }

    async fn fetch(&self, keywords: &[String], limit: usize) -> Vec<RawPost> {
        let Some(token) = &self.bearer_token else {
            tracing::debug!("Twitter bearer token not configured; skipping");
            return Vec::new();
        };

        match self.try_fetch(token, keywords, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(
                    platform = "twitter",
                    error = %e,
                    "collector failed; returning no posts"
                );
                Vec::new()
            }
        }
    }
}

fn to_raw_post(id: &str, tweet: Tweet) -> RawPost {
    RawPost {
        platform: Platform::Twitter,
        title: tweet.text.chars().take(MAX_TITLE_CHARS).collect(),
        upvotes: clamp_count(tweet.public_metrics.like_count),
        comments: clamp_count(tweet.public_metrics.reply_count),
        url: format!("https://x.com/i/web/status/{id}"),
        created_at: parse_timestamp(tweet.created_at.as_deref()),
        content: tweet.text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tweet_title_is_truncated_and_url_is_canonical() {
        let tweet: Tweet = serde_json::from_value(serde_json::json!({
            "id": "1900",
            "text": "a".repeat(300),
            "created_at": "2026-04-01T08:00:00.000Z",
            "public_metrics": { "like_count": 33, "reply_count": 12, "retweet_count": 2 }
        }))
        .expect("valid tweet json");

        let post = to_raw_post("1900", tweet);

        assert_eq!(post.title.chars().count(), MAX_TITLE_CHARS);
        assert_eq!(post.content.len(), 300);
        assert_eq!(post.url, "https://x.com/i/web/status/1900");
        assert_eq!(post.upvotes, 33);
        assert_eq!(post.comments, 12);
    }

    #[test]
    fn missing_metrics_default_to_zero() {
        let tweet: Tweet = serde_json::from_value(serde_json::json!({
            "id": "7",
            "text": "need a better CRM"
        }))
        .expect("valid tweet json");

        let post = to_raw_post("7", tweet);

        assert_eq!(post.upvotes, 0);
        assert_eq!(post.comments, 0);
    }
}
