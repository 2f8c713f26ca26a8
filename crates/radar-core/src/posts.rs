use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::CoreError;

/// External platform a post was collected from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Reddit,
    ProductHunt,
    Twitter,
}

impl Platform {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Platform::Reddit => "reddit",
            Platform::ProductHunt => "producthunt",
            Platform::Twitter => "twitter",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reddit" => Ok(Platform::Reddit),
            "producthunt" => Ok(Platform::ProductHunt),
            "twitter" => Ok(Platform::Twitter),
            other => Err(CoreError::InvalidPlatform(other.to_string())),
        }
    }
}

/// A post as returned by a collector, before it is persisted.
///
/// Identity is the `(platform, url)` pair; two raw posts with the same pair
/// are the same post regardless of their text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPost {
    pub platform: Platform,
    pub title: String,
    pub content: String,
    pub upvotes: i32,
    pub comments: i32,
    /// Canonical URL of the post on its platform.
    pub url: String,
    /// When the author published the post.
    pub created_at: DateTime<Utc>,
}

impl RawPost {
    /// Key used for cross-platform deduplication.
    #[must_use]
    pub fn identity_key(&self) -> (Platform, &str) {
        (self.platform, self.url.as_str())
    }

    /// Lowercased `title content` text used by keyword filters.
    #[must_use]
    pub fn haystack(&self) -> String {
        format!("{} {}", self.title, self.content).to_lowercase()
    }
}
