use crate::app_config::{AppConfig, Environment};
use crate::filters::GeoScope;
use crate::ConfigError;

const DEFAULT_KEYWORDS: &str = "churn,bottleneck,manual process,costly,repetitive";
const DEFAULT_INDUSTRIES: &str = "SaaS,AI,B2B";
const DEFAULT_SUBREDDITS: &str = "startups,Entrepreneur,SaaS,smallbusiness,ArtificialInteligence";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar(var.to_string()))
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let database_url = normalize_database_url(&require("DATABASE_URL")?);

    let env = parse_environment(&or_default("RADAR_ENV", "development"))?;
    let bind_addr = or_default("RADAR_BIND_ADDR", "0.0.0.0:8000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("RADAR_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("RADAR_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("RADAR_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("RADAR_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("RADAR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let openai_api_key = optional("OPENAI_API_KEY");
    let openai_model = or_default("OPENAI_MODEL", "gpt-4o-mini");
    let openai_base_url = or_default("OPENAI_BASE_URL", "https://api.openai.com/v1");
    let completion_timeout_secs = parse_u64("RADAR_COMPLETION_TIMEOUT_SECS", "45")?;
    let collector_timeout_secs = parse_u64("RADAR_COLLECTOR_TIMEOUT_SECS", "20")?;

    let reddit_client_id = optional("REDDIT_CLIENT_ID");
    let reddit_client_secret = optional("REDDIT_CLIENT_SECRET");
    let reddit_user_agent = or_default("REDDIT_USER_AGENT", "market-war-radar/1.0");
    let reddit_subreddits = parse_csv(&or_default("REDDIT_SUBREDDITS", DEFAULT_SUBREDDITS));
    let producthunt_access_token = optional("PRODUCTHUNT_ACCESS_TOKEN");
    let twitter_bearer_token = optional("TWITTER_BEARER_TOKEN");

    let default_keywords = parse_csv(&or_default("RADAR_DEFAULT_KEYWORDS", DEFAULT_KEYWORDS));
    let default_geo_scope = or_default("RADAR_DEFAULT_GEO_SCOPE", "GLOBAL")
        .parse::<GeoScope>()
        .map_err(|e| invalid("RADAR_DEFAULT_GEO_SCOPE", e.to_string()))?;
    let default_industries =
        parse_csv(&or_default("RADAR_DEFAULT_INDUSTRIES", DEFAULT_INDUSTRIES));

    let scrape_cron = or_default("RADAR_SCRAPE_CRON", "0 0 */6 * * *");
    let trends_cron = or_default("RADAR_TRENDS_CRON", "0 0 1 * * *");

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        openai_api_key,
        openai_model,
        openai_base_url,
        completion_timeout_secs,
        collector_timeout_secs,
        reddit_client_id,
        reddit_client_secret,
        reddit_user_agent,
        reddit_subreddits,
        producthunt_access_token,
        twitter_bearer_token,
        default_keywords,
        default_geo_scope,
        default_industries,
        scrape_cron,
        trends_cron,
    })
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "RADAR_ENV".to_string(),
            reason: format!("unknown environment {other:?}"),
        }),
    }
}

/// Rewrite driver-qualified Postgres URLs to the plain `postgres://` scheme.
fn normalize_database_url(raw: &str) -> String {
    let url = raw.trim();
    for prefix in [
        "postgresql+asyncpg://",
        "postgresql+psycopg2://",
        "postgresql+psycopg://",
        "postgresql://",
    ] {
        if let Some(rest) = url.strip_prefix(prefix) {
            return format!("postgres://{rest}");
        }
    }
    url.to_string()
}

/// Split a comma-separated list, trimming items and dropping empties.
fn parse_csv(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
