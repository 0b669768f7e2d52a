use std::{env, net::SocketAddr};

/// Fixed listen address; there is no override for it.
pub const LISTEN_ADDRESS: &str = "127.0.0.1";
pub const LISTEN_PORT: u16 = 8721;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:peopler.db?mode=rwc";

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub listen_address: String,
    pub listen_port: u16,
    /// sqlx connection URL for the SQLite file.
    pub database_url: String,
    /// Export traces and metrics over OTLP.
    pub otel_enabled: bool,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// - `DATABASE_URL` - sqlx SQLite URL (default: `sqlite:peopler.db?mode=rwc`)
    /// - `OTEL_EXPORTER_OTLP_ENDPOINT` - enables OTLP export when present
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            listen_address: LISTEN_ADDRESS.to_string(),
            listen_port: LISTEN_PORT,
            database_url: lookup("DATABASE_URL")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            otel_enabled: lookup("OTEL_EXPORTER_OTLP_ENDPOINT").is_some_and(|v| !v.is_empty()),
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.listen_address, self.listen_port).parse()?)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
