use serde::Deserialize;
use std::env;
use std::path::Path;
use std::time::Duration;

use crate::models::{DataSourceSettings, NullPolicy, DEFAULT_LAKE_URL};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub lake: LakeConfig,
    pub query: QueryConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LakeConfig {
    pub url: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    pub null_policy: NullPolicy,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub style: String,
}

impl Config {
    /// Defaults, then the optional `CONFIG_FILE`, then environment variables
    pub fn from_env() -> Result<Self, config::ConfigError> {
        let _ = dotenv::dotenv();
        Self::load(env::var("CONFIG_FILE").ok().as_deref())
    }

    pub fn load(config_file: Option<&str>) -> Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 3000)?
            .set_default("lake.url", DEFAULT_LAKE_URL)?
            .set_default("lake.timeout_secs", 30)?
            .set_default("query.null_policy", "preserve")?
            .set_default("logging.level", "info")?
            .set_default("logging.style", "auto")?;

        if let Some(path) = config_file {
            builder = builder.add_source(config::File::from(Path::new(path)).required(true));
        }

        if let Ok(host) = env::var("HOST") {
            builder = builder.set_override("server.host", host)?;
        }

        if let Ok(port) = env::var("PORT") {
            builder = builder.set_override("server.port", port.parse::<u16>().unwrap_or(3000))?;
        }

        if let Ok(lake_url) = env::var("LAKE_URL") {
            builder = builder.set_override("lake.url", lake_url)?;
        }

        if let Ok(timeout) = env::var("LAKE_TIMEOUT_SECS") {
            builder = builder.set_override("lake.timeout_secs", timeout.parse::<u64>().unwrap_or(30))?;
        }

        if let Ok(null_policy) = env::var("NULL_POLICY") {
            builder = builder.set_override("query.null_policy", null_policy.to_lowercase())?;
        }

        if let Ok(log_level) = env::var("RUST_LOG") {
            builder = builder.set_override("logging.level", log_level)?;
        }

        if let Ok(log_style) = env::var("RUST_LOG_STYLE") {
            builder = builder.set_override("logging.style", log_style)?;
        }

        builder.build()?.try_deserialize()
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn datasource_settings(&self) -> DataSourceSettings {
        DataSourceSettings::new(self.lake.url.clone())
    }

    pub fn lake_timeout(&self) -> Duration {
        Duration::from_secs(self.lake.timeout_secs)
    }
}
