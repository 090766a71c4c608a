use crate::auth::jwt::JwtConfig;

/// Default interval between history retention sweeps: 24 hours.
const DEFAULT_RETENTION_INTERVAL_SECS: u64 = 86_400;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// How long background tasks get to stop after the server drains (default: `30`).
    pub shutdown_timeout_secs: u64,
    /// JWT token configuration (secret, expiry duration).
    pub jwt: JwtConfig,
    /// Version records kept per key by the retention task. `None` disables it.
    pub history_retention_keep: Option<i64>,
    /// Seconds between retention sweeps (default: `86400`).
    pub history_retention_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                           | Default                 |
    /// |-----------------------------------|-------------------------|
    /// | `HOST`                            | `0.0.0.0`               |
    /// | `PORT`                            | `3000`                  |
    /// | `CORS_ORIGINS`                    | `http://localhost:5173` |
    /// | `REQUEST_TIMEOUT_SECS`            | `30`                    |
    /// | `SHUTDOWN_TIMEOUT_SECS`           | `30`                    |
    /// | `HISTORY_RETENTION_KEEP`          | unset (task disabled)   |
    /// | `HISTORY_RETENTION_INTERVAL_SECS` | `86400`                 |
    ///
    /// JWT settings are read by [`JwtConfig::from_env`].
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = std::env::var("SHUTDOWN_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let history_retention_keep: Option<i64> = std::env::var("HISTORY_RETENTION_KEEP")
            .ok()
            .map(|v| {
                let keep: i64 = v
                    .parse()
                    .expect("HISTORY_RETENTION_KEEP must be a valid i64");
                assert!(keep >= 0, "HISTORY_RETENTION_KEEP must not be negative");
                keep
            });

        let history_retention_interval_secs = parse_retention_interval(
            std::env::var("HISTORY_RETENTION_INTERVAL_SECS").ok().as_deref(),
        );

        let jwt = JwtConfig::from_env();

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            jwt,
            history_retention_keep,
            history_retention_interval_secs,
        }
    }
}

/// Parse `HISTORY_RETENTION_INTERVAL_SECS`, defaulting when unset.
///
/// # Panics
///
/// Panics on a non-numeric or zero value; `tokio::time::interval` cannot
/// tick with a zero period.
fn parse_retention_interval(raw: Option<&str>) -> u64 {
    let secs: u64 = match raw {
        Some(v) => v
            .parse()
            .expect("HISTORY_RETENTION_INTERVAL_SECS must be a valid u64"),
        None => DEFAULT_RETENTION_INTERVAL_SECS,
    };
    assert!(secs > 0, "HISTORY_RETENTION_INTERVAL_SECS must be greater than 0");
    secs
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_interval_defaults_to_a_day() {
        assert_eq!(parse_retention_interval(None), 86_400);
        assert_eq!(parse_retention_interval(Some("60")), 60);
    }

    #[test]
    #[should_panic(expected = "must be greater than 0")]
    fn zero_retention_interval_is_rejected() {
        parse_retention_interval(Some("0"));
    }

    #[test]
    #[should_panic(expected = "must be a valid u64")]
    fn non_numeric_retention_interval_is_rejected() {
        parse_retention_interval(Some("daily"));
    }
}
