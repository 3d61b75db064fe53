use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Fails at startup if a variable is set but malformed.
#[derive(Debug, Clone)]
pub struct Config {
    /// Visitor state lives in Redis when set, otherwise in process memory.
    pub redis_url: Option<String>,
    /// Visits go to Postgres when set, otherwise only to the service log.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// Track reading history and forward visits to the analytics sink.
    pub campaign_event_logging: bool,
    /// Expiry applied to every stored client and campaign record.
    pub campaign_data_ttl_secs: Option<u64>,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            redis_url: optional_env("REDIS_URL"),
            database_url: optional_env("DATABASE_URL"),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            campaign_event_logging: optional_env("ENABLE_CAMPAIGN_EVENT_LOGGING")
                .map(|v| parse_flag(&v))
                .transpose()
                .context("ENABLE_CAMPAIGN_EVENT_LOGGING must be true/false")?
                .unwrap_or(false),
            campaign_data_ttl_secs: optional_env("CAMPAIGN_DATA_TTL_SECS")
                .map(|v| v.parse::<u64>())
                .transpose()
                .context("CAMPAIGN_DATA_TTL_SECS must be a number of seconds")?
                .filter(|ttl| *ttl > 0),
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .unwrap_or_else(|_| "5".to_string())
                .parse::<u64>()
                .context("REQUEST_TIMEOUT_SECS must be a number of seconds")?,
        })
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("unrecognised flag value '{other}'"),
    }
}
