use std::net::SocketAddr;

use crate::appresult::AppResult;

/// Runtime configuration, read once at startup from the environment
/// (`.env` supported via dotenv).
#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Identity service endpoint that exchanges a bearer token for a user id.
    pub identity_url: String,
    /// Optional notification-persistence endpoint; `None` disables the sink.
    pub notify_url: Option<String>,
    /// Optional subscription service endpoint; `None` means every
    /// capability is allowed.
    pub gate_url: Option<String>,
    /// Cooldown applied when a reject request does not carry a duration.
    pub default_cooldown_days: i64,
    /// Hard cap on the suggestion page size.
    pub max_suggestions: usize,
}

impl Config {
    pub fn from_env() -> AppResult<Config> {
        let bind_addr = dotenv::var("BIND_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()?;

        Ok(Config {
            database_url: dotenv::var("DATABASE_URL")?,
            bind_addr,
            identity_url: dotenv::var("IDENTITY_URL")?,
            notify_url: dotenv::var("NOTIFY_URL").ok(),
            gate_url: dotenv::var("GATE_URL").ok(),
            default_cooldown_days: dotenv::var("DEFAULT_COOLDOWN_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
            max_suggestions: dotenv::var("MAX_SUGGESTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(50),
        })
    }
}
