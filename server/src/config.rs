//! Configuration management for the server.

use roster_engine::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use std::env;

/// Server configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Page size used when a listing omits `size`
    pub default_page_size: i64,
    /// Populate the directory with a handful of users on startup
    pub seed_demo_data: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            default_page_size: DEFAULT_PAGE_SIZE as i64,
            seed_demo_data: true,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let host = lookup("HOST").unwrap_or(defaults.host);

        let port = match lookup("PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let default_page_size = match lookup("DEFAULT_PAGE_SIZE") {
            Some(raw) => match raw.parse::<i64>() {
                Ok(size) if (1..=MAX_PAGE_SIZE as i64).contains(&size) => size,
                _ => return Err(ConfigError::InvalidPageSize(raw)),
            },
            None => defaults.default_page_size,
        };

        let seed_demo_data = match lookup("SEED_DEMO_DATA") {
            Some(raw) => parse_flag(&raw).ok_or(ConfigError::InvalidFlag {
                key: "SEED_DEMO_DATA",
                value: raw,
            })?,
            None => defaults.seed_demo_data,
        };

        Ok(Self {
            host,
            port,
            default_page_size,
            seed_demo_data,
        })
    }

    /// Socket address string to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),

    #[error("DEFAULT_PAGE_SIZE must be between 1 and {max}, got {0}", max = MAX_PAGE_SIZE)]
    InvalidPageSize(String),

    #[error("Invalid boolean for {key}: {value}")]
    InvalidFlag { key: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = load(&[]).unwrap();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
        assert_eq!(config.default_page_size, 10);
        assert!(config.seed_demo_data);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("DEFAULT_PAGE_SIZE", "25"),
            ("SEED_DEMO_DATA", "off"),
        ])
        .unwrap();
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.default_page_size, 25);
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[("PORT", "http")]),
            Err(ConfigError::InvalidPort(_))
        ));
        assert!(matches!(
            load(&[("DEFAULT_PAGE_SIZE", "0")]),
            Err(ConfigError::InvalidPageSize(_))
        ));
        assert!(matches!(
            load(&[("DEFAULT_PAGE_SIZE", "101")]),
            Err(ConfigError::InvalidPageSize(_))
        ));
        assert!(matches!(
            load(&[("SEED_DEMO_DATA", "maybe")]),
            Err(ConfigError::InvalidFlag { .. })
        ));
    }
}
