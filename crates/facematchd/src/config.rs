use std::env;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use thiserror::Error;

const ENV_PORT: &str = "PORT";
const ENV_DEBUG: &str = "DEBUG";
const ENV_BIND_ADDR: &str = "FACEMATCH_BIND_ADDR";
const ENV_MODEL_DIR: &str = "FACEMATCH_MODEL_DIR";
const ENV_MAX_BODY_BYTES: &str = "FACEMATCH_MAX_BODY_BYTES";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    #[error("failed to parse {name} '{value}': {source}")]
    InvalidNumber {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
}

/// Service configuration, loaded once at startup from environment variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Listen port (default: 5000).
    pub port: u16,
    /// Verbose logging; only the literal `true` (any case) enables it.
    pub debug: bool,
    /// Listen address (default: 0.0.0.0).
    pub bind_addr: IpAddr,
    /// Directory containing the detector and recognizer ONNX files.
    pub model_dir: PathBuf,
    /// Largest accepted request body; base64 images are big.
    pub max_body_bytes: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 5000,
            debug: false,
            bind_addr: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            model_dir: PathBuf::from("./models"),
            max_body_bytes: 16 * 1024 * 1024,
        }
    }
}

impl Config {
    /// Load configuration from the process environment with defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = match lookup(ENV_PORT) {
            Some(value) => parse_port(value)?,
            None => defaults.port,
        };

        let debug = lookup(ENV_DEBUG)
            .map(|v| v.eq_ignore_ascii_case("true"))
            .unwrap_or(defaults.debug);

        let bind_addr = match lookup(ENV_BIND_ADDR) {
            Some(value) => value
                .parse()
                .map_err(|source| ConfigError::InvalidBindAddr { value, source })?,
            None => defaults.bind_addr,
        };

        let model_dir = lookup(ENV_MODEL_DIR)
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);

        let max_body_bytes = match lookup(ENV_MAX_BODY_BYTES) {
            Some(value) => value.parse().map_err(|source| ConfigError::InvalidNumber {
                name: ENV_MAX_BODY_BYTES,
                value,
                source,
            })?,
            None => defaults.max_body_bytes,
        };

        Ok(Self {
            port,
            debug,
            bind_addr,
            model_dir,
            max_body_bytes,
        })
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    /// Default tracing filter when `RUST_LOG` is not set.
    pub fn log_filter(&self) -> &'static str {
        if self.debug { "debug" } else { "info" }
    }
}

fn parse_port(value: String) -> Result<u16, ConfigError> {
    let port: u16 = value.trim().parse().map_err(|source| ConfigError::InvalidNumber {
        name: ENV_PORT,
        value: value.clone(),
        source,
    })?;
    if port == 0 {
        return Err(ConfigError::InvalidPort { value });
    }
    Ok(port)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 5000);
        assert!(!config.debug);
        assert_eq!(config.socket_addr().to_string(), "0.0.0.0:5000");
        assert_eq!(config.log_filter(), "info");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8088"),
            ("DEBUG", "True"),
            ("FACEMATCH_BIND_ADDR", "127.0.0.1"),
            ("FACEMATCH_MODEL_DIR", "/opt/models"),
            ("FACEMATCH_MAX_BODY_BYTES", "1024"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:8088");
        assert!(config.debug);
        assert_eq!(config.log_filter(), "debug");
        assert_eq!(config.model_dir, PathBuf::from("/opt/models"));
        assert_eq!(config.max_body_bytes, 1024);
    }

    #[test]
    fn test_debug_only_accepts_true() {
        for value in ["1", "yes", "on", "false", ""] {
            let config = Config::from_lookup(lookup_from(&[("DEBUG", value)])).unwrap();
            assert!(!config.debug, "DEBUG={value:?} should not enable debug");
        }
    }

    #[test]
    fn test_invalid_port() {
        let err = Config::from_lookup(lookup_from(&[("PORT", "abc")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { name: "PORT", .. }));

        let err = Config::from_lookup(lookup_from(&[("PORT", "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPort { .. }));

        let err = Config::from_lookup(lookup_from(&[("PORT", "70000")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidNumber { .. }));
    }

    #[test]
    fn test_invalid_bind_addr() {
        let err = Config::from_lookup(lookup_from(&[("FACEMATCH_BIND_ADDR", "localhost")])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBindAddr { .. }));
    }

    #[test]
    #[serial]
    fn test_from_env() {
        env::set_var(ENV_PORT, "5123");
        env::remove_var(ENV_DEBUG);

        let config = Config::from_env();
        env::remove_var(ENV_PORT);

        assert_eq!(config.unwrap().port, 5123);
    }
}
