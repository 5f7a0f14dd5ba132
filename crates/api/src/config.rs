//! Configuration loaded from environment variables.
//!
//! Parsing is a pure function over a lookup closure; `from_env` only
//! supplies `std::env::var`. Any missing required value or unparsable
//! number is a [`CoreError::Configuration`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use axum::http::HeaderValue;
use spice_catalog::sync::SyncSettings;
use spice_core::error::CoreError;
use sqlx::postgres::PgConnectOptions;

/// Default PostgreSQL port when `REMOTE_DB_HOST` has none.
const DEFAULT_PG_PORT: u16 = 5432;

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Read `key`, treating blank values as unset.
fn optional(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<String, CoreError> {
    optional(lookup, key)
        .ok_or_else(|| CoreError::Configuration(format!("{key} must be set")))
}

fn parsed<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> Result<T, CoreError> {
    match optional(lookup, key) {
        None => Ok(default),
        Some(raw) => raw.parse().map_err(|_| {
            CoreError::Configuration(format!("{key} has an invalid value '{raw}'"))
        }),
    }
}

fn positive_secs(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: u64,
) -> Result<Duration, CoreError> {
    match parsed(lookup, key, default)? {
        0 => Err(CoreError::Configuration(format!("{key} must be at least 1"))),
        secs => Ok(Duration::from_secs(secs)),
    }
}

/* --------------------------------------------------------------------------
HTTP server
-------------------------------------------------------------------------- */

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
}

impl ServerConfig {
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let cors_origins: Vec<String> = optional(&lookup, "CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        if let Some(bad) = cors_origins
            .iter()
            .find(|o| o.parse::<HeaderValue>().is_err())
        {
            return Err(CoreError::Configuration(format!(
                "CORS_ORIGINS contains an invalid origin '{bad}'"
            )));
        }

        Ok(Self {
            host: optional(&lookup, "HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port: parsed(&lookup, "PORT", 3000)?,
            cors_origins,
            request_timeout_secs: parsed(&lookup, "REQUEST_TIMEOUT_SECS", 30)?,
        })
    }
}

/* --------------------------------------------------------------------------
Stores
-------------------------------------------------------------------------- */

/// Remote store credentials, mirror location, and freshness settings.
#[derive(Clone)]
pub struct StoreConfig {
    pub remote_host: String,
    pub remote_port: u16,
    pub remote_user: String,
    pub remote_password: String,
    pub remote_database: String,
    pub mirror_path: PathBuf,
    pub cache_ttl: Duration,
    pub sync_interval: Duration,
    /// Wait for a remote connection before a call fails.
    pub remote_acquire_timeout: Duration,
    /// Pause after a failed refresh before searches contact the remote
    /// store again.
    pub sync_retry_cooldown: Duration,
    /// Longest a search waits on a refresh while stale data is available.
    pub sync_stale_timeout: Duration,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("remote_host", &self.remote_host)
            .field("remote_port", &self.remote_port)
            .field("remote_user", &self.remote_user)
            .field("remote_password", &"<redacted>")
            .field("remote_database", &self.remote_database)
            .field("mirror_path", &self.mirror_path)
            .field("cache_ttl", &self.cache_ttl)
            .field("sync_interval", &self.sync_interval)
            .field("remote_acquire_timeout", &self.remote_acquire_timeout)
            .field("sync_retry_cooldown", &self.sync_retry_cooldown)
            .field("sync_stale_timeout", &self.sync_stale_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// | Env Var              | Default            |
    /// |----------------------|--------------------|
    /// | `REMOTE_DB_HOST`     | required           |
    /// | `REMOTE_DB_USER`     | required           |
    /// | `REMOTE_DB_PASSWORD` | required           |
    /// | `REMOTE_DB_NAME`     | `miami_spice`      |
    /// | `MIRROR_PATH`        | `spice_mirror.db`  |
    /// | `CACHE_TTL_SECS`     | `300`              |
    /// | `SYNC_INTERVAL_SECS` | `3600`             |
    /// | `REMOTE_ACQUIRE_TIMEOUT_SECS` | `3`       |
    /// | `SYNC_RETRY_COOLDOWN_SECS`    | `60`      |
    /// | `SYNC_STALE_TIMEOUT_SECS`     | `5`       |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(env_lookup)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let host = required(&lookup, "REMOTE_DB_HOST")?;
        let (remote_host, remote_port) = split_host_port(&host)?;

        Ok(Self {
            remote_host,
            remote_port,
            remote_user: required(&lookup, "REMOTE_DB_USER")?,
            remote_password: required(&lookup, "REMOTE_DB_PASSWORD")?,
            remote_database: optional(&lookup, "REMOTE_DB_NAME")
                .unwrap_or_else(|| "miami_spice".into()),
            mirror_path: optional(&lookup, "MIRROR_PATH")
                .unwrap_or_else(|| "spice_mirror.db".into())
                .into(),
            cache_ttl: Duration::from_secs(parsed(&lookup, "CACHE_TTL_SECS", 300)?),
            sync_interval: Duration::from_secs(parsed(&lookup, "SYNC_INTERVAL_SECS", 3600)?),
            remote_acquire_timeout: positive_secs(&lookup, "REMOTE_ACQUIRE_TIMEOUT_SECS", 3)?,
            sync_retry_cooldown: Duration::from_secs(parsed(
                &lookup,
                "SYNC_RETRY_COOLDOWN_SECS",
                60,
            )?),
            sync_stale_timeout: positive_secs(&lookup, "SYNC_STALE_TIMEOUT_SECS", 5)?,
        })
    }

    /// Remote waits must be shorter than the HTTP request timeout.
    pub fn check_against(&self, server: &ServerConfig) -> Result<(), CoreError> {
        let request_timeout = Duration::from_secs(server.request_timeout_secs);
        for (key, wait) in [
            ("REMOTE_ACQUIRE_TIMEOUT_SECS", self.remote_acquire_timeout),
            ("SYNC_STALE_TIMEOUT_SECS", self.sync_stale_timeout),
        ] {
            if wait >= request_timeout {
                return Err(CoreError::Configuration(format!(
                    "{key} ({}s) must be shorter than REQUEST_TIMEOUT_SECS ({}s)",
                    wait.as_secs(),
                    server.request_timeout_secs,
                )));
            }
        }
        Ok(())
    }

    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            interval: self.sync_interval,
            retry_cooldown: self.sync_retry_cooldown,
            stale_refresh_timeout: self.sync_stale_timeout,
        }
    }

    pub fn connect_options(&self) -> PgConnectOptions {
        PgConnectOptions::new()
            .host(&self.remote_host)
            .port(self.remote_port)
            .username(&self.remote_user)
            .password(&self.remote_password)
            .database(&self.remote_database)
    }
}

/// Split `host[:port]`, defaulting the port.
fn split_host_port(raw: &str) -> Result<(String, u16), CoreError> {
    match raw.rsplit_once(':') {
        None => Ok((raw.to_string(), DEFAULT_PG_PORT)),
        Some((host, port)) => {
            let port = port.parse().map_err(|_| {
                CoreError::Configuration(format!("REMOTE_DB_HOST has an invalid port '{port}'"))
            })?;
            if host.is_empty() {
                return Err(CoreError::Configuration(
                    "REMOTE_DB_HOST has an empty host".to_string(),
                ));
            }
            Ok((host.to_string(), port))
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use assert_matches::assert_matches;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    const CREDENTIALS: [(&str, &str); 3] = [
        ("REMOTE_DB_HOST", "db.internal"),
        ("REMOTE_DB_USER", "spice"),
        ("REMOTE_DB_PASSWORD", "secret"),
    ];

    #[test]
    fn server_defaults() {
        let config = ServerConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.cors_origins, vec!["http://localhost:5173"]);
        assert_eq!(config.request_timeout_secs, 30);
    }

    #[test]
    fn cors_origins_are_split_and_trimmed() {
        let config = ServerConfig::from_lookup(lookup_from(&[(
            "CORS_ORIGINS",
            "https://a.example, https://b.example,,",
        )]))
        .unwrap();
        assert_eq!(config.cors_origins, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn unparsable_port_is_a_configuration_error() {
        let err = ServerConfig::from_lookup(lookup_from(&[("PORT", "eighty")])).unwrap_err();
        assert_matches!(err, CoreError::Configuration(msg) if msg.contains("PORT"));
    }

    #[test]
    fn store_defaults() {
        let config = StoreConfig::from_lookup(lookup_from(&CREDENTIALS)).unwrap();
        assert_eq!(config.remote_host, "db.internal");
        assert_eq!(config.remote_port, 5432);
        assert_eq!(config.remote_database, "miami_spice");
        assert_eq!(config.mirror_path, PathBuf::from("spice_mirror.db"));
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
        assert_eq!(config.sync_interval, Duration::from_secs(3600));
        assert_eq!(config.remote_acquire_timeout, Duration::from_secs(3));
        assert_eq!(config.sync_retry_cooldown, Duration::from_secs(60));
        assert_eq!(config.sync_stale_timeout, Duration::from_secs(5));
    }

    #[test]
    fn sync_settings_follow_store_config() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("SYNC_INTERVAL_SECS", "600"));
        pairs.push(("SYNC_RETRY_COOLDOWN_SECS", "30"));
        pairs.push(("SYNC_STALE_TIMEOUT_SECS", "2"));
        let settings = StoreConfig::from_lookup(lookup_from(&pairs))
            .unwrap()
            .sync_settings();

        assert_eq!(settings.interval, Duration::from_secs(600));
        assert_eq!(settings.retry_cooldown, Duration::from_secs(30));
        assert_eq!(settings.stale_refresh_timeout, Duration::from_secs(2));
    }

    #[test]
    fn zero_acquire_timeout_is_rejected() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("REMOTE_ACQUIRE_TIMEOUT_SECS", "0"));
        let err = StoreConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_matches!(err, CoreError::Configuration(msg) if msg.contains("REMOTE_ACQUIRE_TIMEOUT_SECS"));
    }

    #[test]
    fn remote_waits_must_fit_inside_a_request() {
        let server = ServerConfig::from_lookup(lookup_from(&[("REQUEST_TIMEOUT_SECS", "10")])).unwrap();

        let defaults = StoreConfig::from_lookup(lookup_from(&CREDENTIALS)).unwrap();
        assert!(defaults.check_against(&server).is_ok());

        let mut pairs = CREDENTIALS.to_vec();
        pairs.push(("REMOTE_ACQUIRE_TIMEOUT_SECS", "10"));
        let slow = StoreConfig::from_lookup(lookup_from(&pairs)).unwrap();
        let err = slow.check_against(&server).unwrap_err();
        assert_matches!(err, CoreError::Configuration(msg) if msg.contains("REMOTE_ACQUIRE_TIMEOUT_SECS"));
    }

    #[test]
    fn host_may_carry_a_port() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs[0] = ("REMOTE_DB_HOST", "10.0.0.5:6543");
        let config = StoreConfig::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.remote_host, "10.0.0.5");
        assert_eq!(config.remote_port, 6543);
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let err = StoreConfig::from_lookup(lookup_from(&CREDENTIALS[..2])).unwrap_err();
        assert_matches!(err, CoreError::Configuration(msg) if msg.contains("REMOTE_DB_PASSWORD"));
    }

    #[test]
    fn blank_value_counts_as_missing() {
        let mut pairs = CREDENTIALS.to_vec();
        pairs[1] = ("REMOTE_DB_USER", "  ");
        let err = StoreConfig::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert_matches!(err, CoreError::Configuration(msg) if msg.contains("REMOTE_DB_USER"));
    }

    #[test]
    fn debug_output_hides_password() {
        let config = StoreConfig::from_lookup(lookup_from(&CREDENTIALS)).unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret"));
    }
}
