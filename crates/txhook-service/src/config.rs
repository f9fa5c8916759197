//! Service configuration.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Storage backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// Process-local map; records are lost on restart.
    Memory,
    /// `RocksDB` at `data_dir` (requires the `rocksdb-backend` feature).
    Rocks,
}

impl StorageBackend {
    /// Backend used when `STORAGE_BACKEND` is unset.
    #[must_use]
    pub const fn default_for_build() -> Self {
        if cfg!(feature = "rocksdb-backend") {
            Self::Rocks
        } else {
            Self::Memory
        }
    }
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "rocksdb" | "rocks" => Ok(Self::Rocks),
            other => Err(format!("unknown storage backend: {other}")),
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => f.write_str("memory"),
            Self::Rocks => f.write_str("rocksdb"),
        }
    }
}

/// Service configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Address to listen on (default: "0.0.0.0:8080").
    pub listen_addr: String,

    /// Storage backend (default: `rocksdb` when compiled in, else `memory`).
    pub storage: StorageBackend,

    /// Path to `RocksDB` data directory (default: "/data/txhook").
    pub data_dir: String,

    /// Simulated downstream latency before a transaction is completed.
    pub completion_delay: Duration,

    /// Maximum number of completions waiting on the downstream call at once.
    pub max_concurrent_completions: usize,

    /// How long shutdown waits for outstanding completions.
    pub shutdown_grace: Duration,

    /// CORS allowed origins.
    pub cors_origins: Vec<String>,

    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,

    /// Request timeout in seconds.
    pub request_timeout_seconds: u64,
}

impl ServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// Unparseable values fall back to their defaults with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            listen_addr: std::env::var("LISTEN_ADDR").unwrap_or(defaults.listen_addr),
            storage: env_parse("STORAGE_BACKEND").unwrap_or(defaults.storage),
            data_dir: std::env::var("DATA_DIR").unwrap_or(defaults.data_dir),
            completion_delay: env_seconds("COMPLETION_DELAY_SECONDS")
                .unwrap_or(defaults.completion_delay),
            max_concurrent_completions: env_parse("MAX_CONCURRENT_COMPLETIONS")
                .filter(|n: &usize| *n > 0)
                .unwrap_or(defaults.max_concurrent_completions),
            shutdown_grace: env_seconds("SHUTDOWN_GRACE_SECONDS")
                .unwrap_or(defaults.shutdown_grace),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|raw| parse_origins(&raw))
                .unwrap_or(defaults.cors_origins),
            max_body_bytes: env_parse("MAX_BODY_BYTES").unwrap_or(defaults.max_body_bytes),
            request_timeout_seconds: env_parse("REQUEST_TIMEOUT_SECONDS")
                .unwrap_or(defaults.request_timeout_seconds),
        }
    }

    /// Set the completion delay.
    #[must_use]
    pub fn with_completion_delay(mut self, delay: Duration) -> Self {
        self.completion_delay = delay;
        self
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8080".into(),
            storage: StorageBackend::default_for_build(),
            data_dir: "/data/txhook".into(),
            completion_delay: Duration::from_secs(30),
            max_concurrent_completions: 1024,
            shutdown_grace: Duration::from_secs(35),
            cors_origins: vec!["*".into()],
            max_body_bytes: 64 * 1024,
            request_timeout_seconds: 30,
        }
    }
}

/// Read and parse an environment variable, warning on bad values.
fn env_parse<T>(name: &str) -> Option<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    let raw = std::env::var(name).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(var = %name, value = %raw, error = %e, "Ignoring invalid configuration value");
            None
        }
    }
}

/// Read a non-negative, possibly fractional, number of seconds.
fn env_seconds(name: &str) -> Option<Duration> {
    let seconds: f64 = env_parse(name)?;
    parse_seconds(seconds).or_else(|| {
        tracing::warn!(var = %name, seconds, "Ignoring out-of-range duration");
        None
    })
}

fn parse_seconds(seconds: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(seconds).ok()
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ServiceConfig::default();
        assert_eq!(config.completion_delay, Duration::from_secs(30));
        assert_eq!(config.listen_addr, "0.0.0.0:8080");
        assert_eq!(config.storage, StorageBackend::default_for_build());
    }

    #[test]
    fn fractional_seconds() {
        assert_eq!(parse_seconds(0.25), Some(Duration::from_millis(250)));
        assert_eq!(parse_seconds(0.0), Some(Duration::ZERO));
        assert_eq!(parse_seconds(-1.0), None);
        assert_eq!(parse_seconds(f64::NAN), None);
    }

    #[test]
    fn storage_backend_parsing() {
        assert_eq!("memory".parse::<StorageBackend>(), Ok(StorageBackend::Memory));
        assert_eq!(" RocksDB ".parse::<StorageBackend>(), Ok(StorageBackend::Rocks));
        assert!("postgres".parse::<StorageBackend>().is_err());
    }

    #[test]
    fn origins_are_trimmed() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
    }
}
