//! Configuration module for the linecache server.
//!
//! Supports both command-line arguments and TOML configuration file.
//! CLI arguments take precedence over config file values.

use clap::Parser;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Command-line arguments for the server
#[derive(Parser, Debug)]
#[command(name = "linecache")]
#[command(version = "0.1.0")]
#[command(about = "A line-oriented key-value server", long_about = None)]
pub struct CliArgs {
    /// Path to TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Address to bind to (e.g., 127.0.0.1:8888)
    #[arg(short = 'l', long)]
    pub listen: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,
}

/// TOML configuration file structure
#[derive(Debug, Deserialize, Default)]
pub struct TomlConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server-related configuration
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_listen() -> String {
    "127.0.0.1:8888".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Final resolved configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub listen: SocketAddr,
    pub log_level: String,
}

impl Config {
    /// Load configuration from CLI args and optional TOML file.
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_args(CliArgs::parse())
    }

    /// Merge parsed CLI args over the TOML file they name, if any.
    pub fn from_args(cli: CliArgs) -> Result<Self, ConfigError> {
        let toml_config = if let Some(ref config_path) = cli.config {
            let contents = std::fs::read_to_string(config_path)
                .map_err(|e| ConfigError::FileRead(config_path.clone(), e))?;
            toml::from_str(&contents)
                .map_err(|e| ConfigError::TomlParse(config_path.clone(), e))?
        } else {
            TomlConfig::default()
        };

        let listen = cli.listen.unwrap_or(toml_config.server.listen);
        let listen = listen
            .parse()
            .map_err(|_| ConfigError::InvalidListen(listen))?;

        Ok(Config {
            listen,
            log_level: cli.log_level.unwrap_or(toml_config.logging.level),
        })
    }
}

/// Configuration loading errors
#[derive(Debug)]
pub enum ConfigError {
    FileRead(PathBuf, std::io::Error),
    TomlParse(PathBuf, toml::de::Error),
    InvalidListen(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::FileRead(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::TomlParse(path, e) => {
                write!(f, "Failed to parse config file '{}': {}", path.display(), e)
            }
            ConfigError::InvalidListen(addr) => {
                write!(f, "Invalid listen address '{}'", addr)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::assert_err;

    fn cli(args: &[&str]) -> CliArgs {
        CliArgs::try_parse_from(std::iter::once("linecache").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = TomlConfig::default();
        assert_eq!(config.server.listen, "127.0.0.1:8888");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_toml_parsing() {
        let toml_str = r#"
            [server]
            listen = "0.0.0.0:9999"

            [logging]
            level = "debug"
        "#;

        let config: TomlConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.server.listen, "0.0.0.0:9999");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: TomlConfig = toml::from_str("[logging]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(config.server.listen, "127.0.0.1:8888");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_resolve_without_file() {
        let config = Config::from_args(cli(&[])).unwrap();
        assert_eq!(config.listen, "127.0.0.1:8888".parse().unwrap());
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_cli_overrides() {
        let config =
            Config::from_args(cli(&["--listen", "127.0.0.1:7000", "--log-level", "trace"]))
                .unwrap();
        assert_eq!(config.listen.port(), 7000);
        assert_eq!(config.log_level, "trace");
    }

    #[test]
    fn test_invalid_listen() {
        let err = assert_err!(Config::from_args(cli(&["-l", "localhost"])));
        assert!(matches!(err, ConfigError::InvalidListen(_)));
    }

    #[test]
    fn test_missing_config_file() {
        let err = assert_err!(Config::from_args(cli(&[
            "--config",
            "/nonexistent/linecache.toml"
        ])));
        assert!(matches!(err, ConfigError::FileRead(_, _)));
    }
}
