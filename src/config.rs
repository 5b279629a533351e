use std::env;

use crate::series::metric::{MetricProfile, OUTLET_CHANNELS};

/// Hard upper bound on raw readings pulled per snapshot.
pub const MAX_READING_LIMIT: u64 = 5000;

#[derive(Debug, Clone)]
pub enum Deployment {
    Local,
    Dev,
    Stage,
    Prod,
}

impl Deployment {
    #[must_use]
    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "dev" | "development" => Self::Dev,
            "stage" | "staging" => Self::Stage,
            "prod" | "production" => Self::Prod,
            _ => Self::Local,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct Config {
    // Reading store
    pub store_backend: StoreBackend,
    pub database_url: Option<String>,
    pub run_migrations: bool,
    pub store_timeout_seconds: u64,
    /// Minutes of synthetic readings loaded into the memory backend at startup.
    pub memory_seed_minutes: u32,

    // Aggregation
    pub reading_limit: u64,
    pub metrics: MetricProfile,

    // Dashboard
    pub poll_interval_seconds: u64,

    // API settings
    pub api_host: String,
    pub api_port: u16,

    // Rate limiting
    pub disable_rate_limiting: bool,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,

    // Application metadata
    pub deployment: Deployment,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if `DATABASE_URL` is not set for the Postgres
    /// backend, or `ConfigError::Invalid` for values that cannot be used.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let store_backend = match env::var("STORE_BACKEND")
            .unwrap_or_else(|_| "postgres".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => StoreBackend::Memory,
            "postgres" | "postgresql" => StoreBackend::Postgres,
            other => {
                return Err(ConfigError::Invalid(
                    "STORE_BACKEND",
                    format!("unknown backend '{other}'"),
                ));
            }
        };

        let database_url = env::var("DATABASE_URL").ok();
        if store_backend == StoreBackend::Postgres && database_url.is_none() {
            return Err(ConfigError::Missing("DATABASE_URL"));
        }

        let averaged_outlets = parse_outlet_list(
            &env::var("AVERAGED_OUTLETS").unwrap_or_default(),
        )?;
        let metrics = MetricProfile::new(
            env_flag("TRACK_PH", true),
            env_flag("TRACK_TEMPERATURE", true),
            &averaged_outlets,
        );

        Ok(Self {
            // Reading store
            store_backend,
            database_url,
            run_migrations: env_flag("RUN_MIGRATIONS", true),
            store_timeout_seconds: env::var("STORE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()
                .unwrap_or(10),
            memory_seed_minutes: env::var("MEMORY_SEED_MINUTES")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),

            // Aggregation
            reading_limit: clamp_reading_limit(
                env::var("READING_LIMIT")
                    .unwrap_or_else(|_| MAX_READING_LIMIT.to_string())
                    .parse()
                    .unwrap_or(MAX_READING_LIMIT),
            )?,
            metrics,

            // Dashboard
            poll_interval_seconds: env::var("POLL_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),

            // API settings
            api_host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            api_port: env::var("API_PORT")
                .unwrap_or_else(|_| "8085".to_string())
                .parse()
                .unwrap_or(8085),

            // Rate limiting
            disable_rate_limiting: env_flag("DISABLE_RATE_LIMITING", false),
            rate_limit_per_second: env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| "1".to_string())
                .parse()
                .unwrap_or(1),
            rate_limit_burst: env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| "30".to_string())
                .parse()
                .unwrap_or(30),

            // Application metadata
            deployment: Deployment::from_str(
                &env::var("DEPLOYMENT").unwrap_or_else(|_| "local".to_string()),
            ),
        })
    }

    /// Configuration for an in-memory deployment, used by tests and demos.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            store_backend: StoreBackend::Memory,
            database_url: None,
            run_migrations: false,
            store_timeout_seconds: 10,
            memory_seed_minutes: 0,
            reading_limit: MAX_READING_LIMIT,
            metrics: MetricProfile::default(),
            poll_interval_seconds: 120,
            api_host: "127.0.0.1".to_string(),
            api_port: 8085,
            disable_rate_limiting: true,
            rate_limit_per_second: 1,
            rate_limit_burst: 30,
            deployment: Deployment::Local,
        }
    }

    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

/// Settings for the headless `reef-poll` client.
#[derive(Debug, Clone)]
pub struct PollerConfig {
    pub base_url: String,
    pub poll_interval_seconds: u64,
    pub request_timeout_seconds: u64,
}

impl PollerConfig {
    #[must_use]
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            base_url: env::var("SNAPSHOT_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8085".to_string()),
            poll_interval_seconds: env::var("POLL_INTERVAL_SECONDS")
                .unwrap_or_else(|_| "120".to_string())
                .parse()
                .unwrap_or(120),
            request_timeout_seconds: env::var("POLL_REQUEST_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| "60".to_string())
                .parse()
                .unwrap_or(60),
        }
    }
}

fn env_flag(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Reject a zero limit and cap anything above [`MAX_READING_LIMIT`].
pub fn clamp_reading_limit(limit: u64) -> Result<u64, ConfigError> {
    if limit == 0 {
        return Err(ConfigError::Invalid(
            "READING_LIMIT",
            "must be greater than zero".to_string(),
        ));
    }
    if limit > MAX_READING_LIMIT {
        tracing::warn!(
            requested = limit,
            max = MAX_READING_LIMIT,
            "READING_LIMIT above maximum, clamping"
        );
        return Ok(MAX_READING_LIMIT);
    }
    Ok(limit)
}

/// Parse a comma separated list of outlet channels, e.g. `"1,3"`.
pub fn parse_outlet_list(raw: &str) -> Result<Vec<u8>, ConfigError> {
    let mut channels = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let channel: u8 = part.parse().map_err(|_| {
            ConfigError::Invalid("AVERAGED_OUTLETS", format!("'{part}' is not a channel number"))
        })?;
        if !(1..=OUTLET_CHANNELS).contains(&channel) {
            return Err(ConfigError::Invalid(
                "AVERAGED_OUTLETS",
                format!("channel {channel} outside 1..={OUTLET_CHANNELS}"),
            ));
        }
        if !channels.contains(&channel) {
            channels.push(channel);
        }
    }
    channels.sort_unstable();
    Ok(channels)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn outlet_list_parses_and_dedups() {
        assert_eq!(parse_outlet_list("").unwrap(), Vec::<u8>::new());
        assert_eq!(parse_outlet_list("3, 1,3").unwrap(), vec![1, 3]);
        assert!(parse_outlet_list("5").is_err());
        assert!(parse_outlet_list("one").is_err());
    }

    #[test]
    fn reading_limit_is_clamped() {
        assert_eq!(clamp_reading_limit(100).unwrap(), 100);
        assert_eq!(clamp_reading_limit(9000).unwrap(), MAX_READING_LIMIT);
        assert!(clamp_reading_limit(0).is_err());
    }
}
