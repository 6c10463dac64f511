//! Engine configuration loaded from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Engine configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// GCP project ID (Firestore)
    pub gcp_project_id: String,
    /// Attempts for a user read-modify-write before giving up on conflicts
    pub recompute_max_attempts: u32,
    /// Upper bound on a single ranking computation
    pub ranking_timeout: Duration,
    /// Concurrent user-record loads while building a ranking
    pub ranking_concurrency: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gcp_project_id: "local-dev".to_string(),
            recompute_max_attempts: 3,
            ranking_timeout: Duration::from_secs(10),
            ranking_concurrency: 50,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable is optional; unset ones fall back to `Config::default()`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let defaults = Self::default();

        let recompute_max_attempts =
            parse_var("RECOMPUTE_MAX_ATTEMPTS", defaults.recompute_max_attempts)?;
        if recompute_max_attempts == 0 {
            return Err(ConfigError::Invalid {
                var: "RECOMPUTE_MAX_ATTEMPTS",
                reason: "must be at least 1".to_string(),
            });
        }

        Ok(Self {
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or(defaults.gcp_project_id),
            recompute_max_attempts,
            ranking_timeout: Duration::from_secs(parse_var(
                "RANKING_TIMEOUT_SECS",
                defaults.ranking_timeout.as_secs(),
            )?),
            ranking_concurrency: parse_var("RANKING_CONCURRENCY", defaults.ranking_concurrency)?
                .max(1),
        })
    }
}

fn parse_var<T>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}
