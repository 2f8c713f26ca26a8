use std::net::SocketAddr;

use crate::filters::GeoScope;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub completion_timeout_secs: u64,
    pub collector_timeout_secs: u64,
    pub reddit_client_id: Option<String>,
    pub reddit_client_secret: Option<String>,
    pub reddit_user_agent: String,
    pub reddit_subreddits: Vec<String>,
    pub producthunt_access_token: Option<String>,
    pub twitter_bearer_token: Option<String>,
    /// Keywords used when the admin filter has no include list.
    pub default_keywords: Vec<String>,
    pub default_geo_scope: GeoScope,
    pub default_industries: Vec<String>,
    pub scrape_cron: String,
    pub trends_cron: String,
}

fn redact(value: Option<&String>) -> Option<&'static str> {
    value.map(|_| "[redacted]")
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("openai_api_key", &redact(self.openai_api_key.as_ref()))
            .field("openai_model", &self.openai_model)
            .field("openai_base_url", &self.openai_base_url)
            .field("completion_timeout_secs", &self.completion_timeout_secs)
            .field("collector_timeout_secs", &self.collector_timeout_secs)
            .field("reddit_client_id", &redact(self.reddit_client_id.as_ref()))
            .field(
                "reddit_client_secret",
                &redact(self.reddit_client_secret.as_ref()),
            )
            .field("reddit_user_agent", &self.reddit_user_agent)
            .field("reddit_subreddits", &self.reddit_subreddits)
            .field(
                "producthunt_access_token",
                &redact(self.producthunt_access_token.as_ref()),
            )
            .field(
                "twitter_bearer_token",
                &redact(self.twitter_bearer_token.as_ref()),
            )
            .field("default_keywords", &self.default_keywords)
            .field("default_geo_scope", &self.default_geo_scope)
            .field("default_industries", &self.default_industries)
            .field("scrape_cron", &self.scrape_cron)
            .field("trends_cron", &self.trends_cron)
            .finish()
    }
}
