//! Product Hunt collector (GraphQL v2 feed, keyword-filtered locally).

use std::collections::HashSet;

use async_trait::async_trait;
use radar_core::{AppConfig, Platform, RawPost};
use serde::Deserialize;

use crate::{build_http_client, clamp_count, parse_timestamp, Collector, CollectorError};

const DEFAULT_ENDPOINT: &str = "https://api.producthunt.com/v2/api/graphql";
const DEFAULT_LIMIT: usize = 30;

const FEED_QUERY: &str = "query FeedPosts($first: Int!) { \
    posts(first: $first, order: VOTES) { \
      edges { node { name tagline description votesCount commentsCount url createdAt } } \
    } \
  }";

#[derive(Debug, Default, Deserialize)]
struct FeedResponse {
    #[serde(default)]
    data: Option<FeedData>,
}

#[derive(Debug, Deserialize)]
struct FeedData {
    posts: PostConnection,
}

#[derive(Debug, Deserialize)]
struct PostConnection {
    #[serde(default)]
    edges: Vec<PostEdge>,
}

#[derive(Debug, Deserialize)]
struct PostEdge {
    node: PostNode,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PostNode {
    name: String,
    tagline: String,
    description: Option<String>,
    votes_count: i64,
    comments_count: i64,
    url: String,
    created_at: Option<String>,
}

/// Pulls the top-voted launch feed and keeps posts mentioning a keyword.
pub struct ProductHuntCollector {
    client: reqwest::Client,
    access_token: Option<String>,
    endpoint: String,
}

impl ProductHuntCollector {
    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn new(access_token: Option<String>, timeout_secs: u64) -> Result<Self, CollectorError> {
        Ok(Self {
            client: build_http_client(timeout_secs)?,
            access_token,
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`CollectorError::Http`] if the HTTP client cannot be built.
    pub fn from_config(config: &AppConfig) -> Result<Self, CollectorError> {
        Self::new(
            config.producthunt_access_token.clone(),
            config.collector_timeout_secs,
        )
    }

    /// Override the GraphQL endpoint (for testing with wiremock).
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = endpoint.to_string();
        self
    }

    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.access_token.is_some()
    }

    async fn try_fetch(
        &self,
        token: &str,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<RawPost>, CollectorError> {
        let body = serde_json::json!({
            "query": FEED_QUERY,
            "variables": { "first": limit },
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(CollectorError::Auth {
                platform: Platform::ProductHunt,
                message: "access token rejected".to_string(),
            });
        }
        if !status.is_success() {
            return Err(CollectorError::UnexpectedStatus {
                platform: Platform::ProductHunt,
                status: status.as_u16(),
            });
        }

        let feed: FeedResponse = response.json().await?;
        let edges = feed.data.map(|data| data.posts.edges).unwrap_or_default();
        let lowered: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        let mut seen_urls = HashSet::new();
        let posts: Vec<RawPost> = edges
            .into_iter()
            .filter_map(|edge| to_raw_post(edge.node, &lowered))
            .filter(|post| seen_urls.insert(post.url.clone()))
            .collect();

        tracing::debug!(posts = posts.len(), "collected Product Hunt posts");
        Ok(posts)
    }
}

#[async_trait]
impl Collector for ProductHuntCollector {
    fn platform(&self) -> Platform {
        Platform::ProductHunt
    }

    fn default_limit(&self) -> usize {
        DEFAULT_LIMIT
    }

    async fn fetch(&self, keywords: &[String], limit: usize) -> Vec<RawPost> {
        let Some(token) = &self.access_token else {
            tracing::debug!("Product Hunt token not configured; skipping");
            return Vec::new();
        };

        match self.try_fetch(token, keywords, limit).await {
            Ok(posts) => posts,
            Err(e) => {
                tracing::warn!(
                    platform = "producthunt",
                    error = %e,
                    "collector failed; returning no posts"
                );
                Vec::new()
            }
        }
    }
}

/// Maps one feed node, dropping it when it has no URL or when `keywords` is
/// non-empty and none appear in its name, tagline, or description.
fn to_raw_post(node: PostNode, keywords: &[String]) -> Option<RawPost> {
    if node.url.trim().is_empty() {
        return None;
    }

    let description = node.description.unwrap_or_default();
    let combined = format!("{} {} {}", node.name, node.tagline, description).to_lowercase();
    if !keywords.is_empty() && !keywords.iter().any(|k| combined.contains(k.as_str())) {
        return None;
    }

    Some(RawPost {
        platform: Platform::ProductHunt,
        content: format!("{}\n\n{}", node.tagline, description).trim().to_string(),
        title: node.name,
        upvotes: clamp_count(node.votes_count),
        comments: clamp_count(node.comments_count),
        url: node.url,
        created_at: parse_timestamp(node.created_at.as_deref()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, tagline: &str, url: &str) -> PostNode {
        PostNode {
            name: name.to_string(),
            tagline: tagline.to_string(),
            description: None,
            votes_count: 120,
            comments_count: 9,
            url: url.to_string(),
            created_at: Some("2026-03-02T10:00:00Z".to_string()),
        }
    }

    #[test]
    fn node_matching_keyword_maps_to_raw_post() {
        let keywords = vec!["churn".to_string()];
        let post = to_raw_post(
            node("RetainIQ", "Predict churn before it happens", "https://ph.com/retainiq"),
            &keywords,
        )
        .expect("node should match");

        assert_eq!(post.platform, Platform::ProductHunt);
        assert_eq!(post.title, "RetainIQ");
        assert_eq!(post.content, "Predict churn before it happens");
        assert_eq!(post.upvotes, 120);
    }

    #[test]
    fn node_without_keyword_is_dropped() {
        let keywords = vec!["invoice".to_string()];
        let mapped = to_raw_post(
            node("PhotoMagic", "Edit photos with AI", "https://ph.com/photomagic"),
            &keywords,
        );

        assert!(mapped.is_none());
    }

    #[test]
    fn empty_keyword_list_keeps_every_node() {
        let mapped = to_raw_post(node("Anything", "At all", "https://ph.com/a"), &[]);
        assert!(mapped.is_some());
    }

    #[test]
    fn node_without_url_is_dropped() {
        let mapped = to_raw_post(node("Nameless", "churn", "  "), &[]);
        assert!(mapped.is_none());
    }
}
