use anyhow::Result;
use figment::{providers::{Env, Format, Toml}, Figment};
use serde::Deserialize;
use std::net::SocketAddr;

use crate::domain::Metric;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub source: SourceConfig,
    pub likeday: LikeDayConfig,
    pub slack: SlackConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub enable_cors: bool,
}
impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(format!("{}:{}", self.host, self.port).parse()?)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Price history backend: "sim" or "postgres".
    pub provider: String,
    /// Default PJM pricing hub when a request does not name one.
    pub hub: String,
    /// Schema holding the hourly LMP table (postgres provider only).
    pub schema: String,
    pub db_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LikeDayConfig {
    pub default_n_neighbors: u32,
    pub default_metric: Metric,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlackConfig {
    /// Incoming-webhook URL. Absent means notifications are disabled.
    pub webhook_url: Option<String>,
    pub channel: String,
    /// IANA timezone used for message timestamps.
    pub timezone: String,
}

impl Config {
    pub fn load() -> Result<Self> {
        let figment = Figment::new()
            .merge(Toml::file("config/default.toml"))
            .merge(Env::prefixed("LIKEDAY__").split("__"));
        Ok(figment.extract()?)
    }
}
