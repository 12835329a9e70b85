//! Configuration module - environment variable parsing

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

/// Default mail compose endpoint used for contact deep-links
pub const DEFAULT_MAIL_COMPOSE_URL: &str = "https://outlook.office365.com/mail/deeplink/compose";

/// Application configuration loaded from environment variables
#[derive(Clone, Debug)]
pub struct Config {
    /// Server binding address
    pub server_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Supabase project URL
    pub supabase_url: String,
    /// Supabase anonymous key
    pub supabase_anon_key: String,
    /// Supabase service role key, preferred over the anon key when present
    pub supabase_service_role_key: Option<String>,
    /// Supabase JWT secret for verifying posters' access tokens
    pub supabase_jwt_secret: String,

    /// Allowed client origins for CORS (comma-separated)
    pub client_origin: String,
    /// Mail compose endpoint for contact links
    pub mail_compose_url: String,
    /// Background feed refresh interval, `None` when disabled
    pub feed_refresh: Option<Duration>,
    /// Upper bound on any single gateway request
    pub gateway_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Hosting platforms provide PORT, fall back to SERVER_ADDR or default
        let server_addr = match lookup("PORT") {
            Some(port) => format!("0.0.0.0:{}", port),
            None => lookup("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:8080".to_string()),
        };

        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let feed_refresh_secs = parse_secs(&lookup, "FEED_REFRESH_SECS", 60)?;
        let gateway_timeout_secs = parse_secs(&lookup, "GATEWAY_TIMEOUT_SECS", 10)?;
        if gateway_timeout_secs == 0 {
            return Err(ConfigError::Invalid("GATEWAY_TIMEOUT_SECS"));
        }

        Ok(Self {
            server_addr: server_addr
                .parse()
                .map_err(|_| ConfigError::InvalidAddress)?,

            log_level: lookup("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),

            supabase_url: required("SUPABASE_URL")?.trim_end_matches('/').to_string(),
            supabase_anon_key: required("SUPABASE_ANON_KEY")?,
            supabase_service_role_key: lookup("SUPABASE_SERVICE_ROLE_KEY")
                .filter(|key| !key.is_empty()),
            supabase_jwt_secret: required("SUPABASE_JWT_SECRET")?,

            client_origin: lookup("CLIENT_ORIGIN").unwrap_or_default(),
            mail_compose_url: lookup("MAIL_COMPOSE_URL")
                .unwrap_or_else(|| DEFAULT_MAIL_COMPOSE_URL.to_string()),
            feed_refresh: (feed_refresh_secs > 0).then(|| Duration::from_secs(feed_refresh_secs)),
            gateway_timeout: Duration::from_secs(gateway_timeout_secs),
        })
    }

    /// Key used to authenticate gateway requests
    pub fn gateway_key(&self) -> &str {
        self.supabase_service_role_key
            .as_deref()
            .unwrap_or(&self.supabase_anon_key)
    }
}

fn parse_secs<F>(lookup: &F, key: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid(key)),
        None => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),

    #[error("Invalid server address format")]
    InvalidAddress,
}
