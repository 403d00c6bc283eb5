//! Server configuration from environment variables

use crate::driver::UnknownEffectPolicy;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

const DEFAULT_PORT: u16 = 8000;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(format!("expected `json` or `pretty`, got `{other}`")),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid SAYBOT_HOST `{0}`")]
    InvalidAddr(String),
    #[error("Invalid SAYBOT_PORT `{0}`")]
    InvalidPort(String),
    #[error("Invalid SAYBOT_UNKNOWN_EFFECTS: {0}")]
    InvalidPolicy(String),
    #[error("Invalid SAYBOT_LOG_FORMAT: {0}")]
    InvalidLogFormat(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    /// Served ahead of the embedded client assets when set
    pub static_dir: Option<PathBuf>,
    pub unknown_effects: UnknownEffectPolicy,
    pub log_format: LogFormat,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: DEFAULT_PORT,
            static_dir: None,
            unknown_effects: UnknownEffectPolicy::default(),
            log_format: LogFormat::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(host) = lookup("SAYBOT_HOST") {
            config.host = host.parse().map_err(|_| ConfigError::InvalidAddr(host))?;
        }
        if let Some(port) = lookup("SAYBOT_PORT") {
            config.port = port.parse().map_err(|_| ConfigError::InvalidPort(port))?;
        }
        if let Some(dir) = lookup("SAYBOT_STATIC_DIR").filter(|d| !d.is_empty()) {
            config.static_dir = Some(PathBuf::from(dir));
        }
        if let Some(policy) = lookup("SAYBOT_UNKNOWN_EFFECTS") {
            config.unknown_effects = policy.parse().map_err(ConfigError::InvalidPolicy)?;
        }
        if let Some(format) = lookup("SAYBOT_LOG_FORMAT") {
            config.log_format = format.parse().map_err(ConfigError::InvalidLogFormat)?;
        }

        Ok(config)
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
