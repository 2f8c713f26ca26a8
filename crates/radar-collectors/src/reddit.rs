//! Reddit collector (client-credentials OAuth + subreddit search).

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use radar_core::{AppConfig, Platform, RawPost};
use serde::Deserialize;

use crate::{build_http_client, clamp_count, Collector, CollectorError};

const DEFAULT_AUTH_BASE: &str = "https://www.reddit.com";
const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";
const DEFAULT_LIMIT_PER_KEYWORD: usize = 30;
const MAX_PAGE_LIMIT: usize = 100;

/// Script-app credentials for the Reddit API.
#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Submission>,
}

#[derive(Debug, Deserialize)]
struct Submission {
    data: SubmissionData,
}

#[derive(Debug, Deserialize)]
struct SubmissionData {
    title: Option<String>,
    selftext: Option<String>,
    #[serde(default)]
    score: i64,
    #[serde(default)]
    num_comments: i64,
    url: Option<String>,
    permalink: Option<String>,
    created_utc: Option<f64>,
}

/// Searches a fixed set of subreddits for each keyword, newest first.
pub struct RedditCollector {
    client: reqwest::Client,
    credentials: Option<RedditCredentials>,
    user_agent: String,
    subreddits: Vec<String>,
    auth_base: String,
    api_base: String,
}

impl RedditCollector {
    /// Creates a collector pointed at the production Reddit endpoints.
    ///
    /// With `credentials = None` the collector is disabled and every fetch
    /// returns an empty batch.
    ///
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn new(
        credentials: Option<RedditCredentials>,
        user_agent: &str,
        subreddits: Vec<String>,
        timeout_secs: u64,
    ) -> Result<Self, CollectorError> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            credentials,
            user_agent: user_agent.to_string(),
            subreddits,
            auth_base: DEFAULT_AUTH_BASE.to_string(),
            api_base: DEFAULT_API_BASE.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, CollectorError> {
        let credentials = match (&config.reddit_client_id, &config.reddit_client_secret) {
            (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
                client_id: client_id.clone(),
                client_secret: client_secret.clone(),
            }),
            _ => None,
        };
        Self::new(
            credentials,
            &config.reddit_user_agent,
            config.reddit_subreddits.clone(),
            config.collector_timeout_secs,
        )
    }

    /// Override the token and API hosts (for testing with wiremock).
    #[must_use]
    pub fn with_base_urls(mut self, auth_base: &str, api_base: &str) -> Self {
        self.auth_base = auth_base.trim_end_matches('/').to_string();
        self.api_base = api_base.trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.credentials.is_some()
    }

    async fn fetch_token(&self, credentials: &RedditCredentials) -> Result<String, CollectorError> {
        let response = self
            .client
            .post(format!("{}/api/v1/access_token", self.auth_base))
            .header("User-Agent", &self.user_agent)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(CollectorError::Auth {
                platform: Platform::Reddit,
                message: format!("token exchange failed with status {}", response.status()),
            });
        }

        let token: TokenResponse = response.json().await?;
        Ok(token.access_token)
    }

    async fn try_fetch(
        &self,
        credentials: &RedditCredentials,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<RawPost>, CollectorError> {
        let token = self.fetch_token(credentials).await?;
        let endpoint = format!("{}/r/{}/search", self.api_base, self.subreddits.join("+"));
        let page_limit = limit.clamp(1, MAX_PAGE_LIMIT).to_string();

        let mut seen_urls = HashSet::new();
        let mut posts = Vec::new();

        for keyword in keywords {
            let response = self
                .client
                .get(&endpoint)
                .bearer_auth(&token)
                .header("User-Agent", &self.user_agent)
                .query(&[
                    ("q", keyword.as_str()),
                    ("sort", "new"),
                    ("restrict_sr", "true"),
                    ("type", "link"),
                    ("limit", page_limit.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(CollectorError::UnexpectedStatus {
                    platform: Platform::Reddit,
                    status: response.status().as_u16(),
                });
            }

            let listing: Listing = response.json().await?;
            for submission in listing.data.children {
                let Some(post) = to_raw_post(submission.data) else {
                    continue;
                };
                if seen_urls.insert(post.url.clone()) {
                    posts.push(post);
                }
            }
        }

        tracing::debug!(posts = posts.len(), keywords = keywords.len(), "collected Reddit posts");
        Ok(posts)
    }
}

#[async_trait]
impl Collector for RedditCollector {
    fn platform(&self) -> Platform {
        Platform::Reddit
    }

    fn default_limit(&self) -> usize {
        DEFAULT_LIMIT_PER_KEYWORD
    }

    async fn fetch(&self, keywords: &[String], limit: usize) -> Vec<RawPost> {
        let Some(credentials) = &self.credentials else {
            tracing::debug!("Reddit credentials not configured; skipping");
            return Vec::new();
        };
        if self.subreddits.is_empty() || keywords.is_empty() {
            return Vec::new();
        }

        match self.try_fetch(credentials, keywords, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(
                    platform = "reddit",
                    error = %e,
                    "collector failed; returning no posts"
                );
                Vec::new()
            }
        }
    }
}

/// Submissions without a title or any URL are dropped. Self posts with no
/// body use the title as content.
fn to_raw_post(data: SubmissionData) -> Option<RawPost> {
    let title = data.title.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())?;
    let url = data
        .url
        .filter(|u| !u.is_empty())
        .or_else(|| data.permalink.map(|p| format!("https://www.reddit.com{p}")))?;
    let content = data
        .selftext
        .filter(|body| !body.trim().is_empty())
        .unwrap_or_else(|| title.clone());
    let created_at = data
        .created_utc
        .and_then(from_epoch_secs)
        .unwrap_or_else(Utc::now);

    Some(RawPost {
        platform: Platform::Reddit,
        title,
        content,
        upvotes: clamp_count(data.score),
        comments: clamp_count(data.num_comments),
        url,
        created_at,
    })
}

#[allow(clippy::cast_possible_truncation)]
fn from_epoch_secs(secs: f64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(secs as i64, 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn submission(json: serde_json::Value) -> SubmissionData {
        serde_json::from_value(json).expect("valid submission json")
    }

    #[test]
    fn self_post_without_body_uses_title_as_content() {
        let post = to_raw_post(submission(serde_json::json!({
            "title": "Stuck reconciling invoices",
            "selftext": "",
            "score": 14,
            "num_comments": 3,
            "url": "https://www.reddit.com/r/SaaS/comments/abc/stuck/",
            "created_utc": 1_767_225_600.0
        })))
        .expect("post should map");

        assert_eq!(post.content, "Stuck reconciling invoices");
        assert_eq!(post.upvotes, 14);
        assert_eq!(
            post.created_at,
            Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn negative_scores_are_floored_at_zero() {
        let post = to_raw_post(submission(serde_json::json!({
            "title": "Downvoted rant",
            "selftext": "body",
            "score": -7,
            "num_comments": 0,
            "url": "https://www.reddit.com/r/startups/comments/x/"
        })))
        .expect("post should map");

        assert_eq!(post.upvotes, 0);
    }

    #[test]
    fn missing_url_falls_back_to_permalink() {
        let post = to_raw_post(submission(serde_json::json!({
            "title": "Permalink only",
            "permalink": "/r/SaaS/comments/xyz/permalink_only/"
        })))
        .expect("post should map");

        assert_eq!(
            post.url,
            "https://www.reddit.com/r/SaaS/comments/xyz/permalink_only/"
        );
    }

    #[test]
    fn submission_without_title_is_dropped() {
        let mapped = to_raw_post(submission(serde_json::json!({
            "title": "   ",
            "url": "https://www.reddit.com/r/SaaS/comments/empty/"
        })));

        assert!(mapped.is_none());
    }
}
