use envconfig::Envconfig;
use log::LevelFilter;
use std::str::FromStr;
use thiserror::Error;

/// Where records are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    /// Process-local tables, lost on exit. For demos and tests.
    Memory,
}

#[derive(Debug, Error)]
#[error("unknown store backend `{0}`, expected postgres or memory")]
pub struct UnknownBackend(String);

impl FromStr for StoreBackend {
    type Err = UnknownBackend;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "pg" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            other => Err(UnknownBackend(other.to_string())),
        }
    }
}

#[derive(Envconfig)]
pub struct Config {
    /// Required by the postgres backend only.
    #[envconfig(from = "DATABASE_URL")]
    pub db_url: Option<String>,
    #[envconfig(from = "PORT", default = "8080")]
    pub port: u16,
    #[envconfig(from = "STORE_BACKEND", default = "postgres")]
    pub store_backend: StoreBackend,
    #[envconfig(from = "LOG_LEVEL", default = "info")]
    pub log_level: LevelFilter,
}

impl Config {
    pub fn database_url(&self) -> anyhow::Result<&str> {
        self.db_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set for the postgres store"))
    }
}
