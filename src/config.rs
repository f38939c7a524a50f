//! Layered configuration for the task board.
//!
//! Priority, highest first:
//! 1. CLI arguments
//! 2. Environment variables (via clap `env` attributes, after `.env` is loaded)
//! 3. TOML config file (`.taskboard/taskboard.toml` unless `--config` is given)
//! 4. Compiled defaults
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 8000
//! cors = true
//!
//! [storage]
//! db_path = ".taskboard/board.db"
//!
//! [auth]
//! api_token = "secret"
//!
//! [logging]
//! level = "debug"
//! format = "json"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::board::server::ServerConfig;

/// Config file consulted when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = ".taskboard/taskboard.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

// ── TOML file structs (every field optional) ─────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct BoardConfigFile {
    server: ServerSection,
    storage: StorageSection,
    auth: AuthSection,
    logging: LoggingSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ServerSection {
    host: Option<String>,
    port: Option<u16>,
    cors: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StorageSection {
    db_path: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct AuthSection {
    api_token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct LoggingSection {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl BoardConfigFile {
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|source| ConfigError::ParseToml {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read the config file. An explicit path must exist; the default path
    /// may be missing, in which case every value falls through to defaults.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = explicit_path.unwrap_or(Path::new(DEFAULT_CONFIG_PATH));
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content, path),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && explicit_path.is_none() => {
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::ReadFile {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

// ── Overrides from CLI and environment ───────────────────────────────

/// Values taken from command-line flags and their environment fallbacks.
/// `None` means "not given", letting the file or defaults decide.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub db_path: Option<PathBuf>,
    pub api_token: Option<String>,
    pub no_cors: bool,
    pub log_level: Option<String>,
    pub log_format: Option<LogFormat>,
}

/// `PORT` is honoured when `TASKBOARD_PORT` and `--port` are both absent.
pub fn port_from_env() -> Option<u16> {
    std::env::var("PORT").ok()?.trim().parse().ok()
}

// ── Resolved configuration ───────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: ServerConfig,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
        }
    }
}

impl Settings {
    pub fn load(config_path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let file = BoardConfigFile::load(config_path)?;
        Ok(Self::resolve(overrides, &file))
    }

    pub fn resolve(overrides: &Overrides, file: &BoardConfigFile) -> Self {
        let defaults = Self::default();

        // An empty token means "no token": the gate stays open.
        let api_token = overrides
            .api_token
            .clone()
            .or_else(|| file.auth.api_token.clone())
            .filter(|t| !t.is_empty());

        let cors = !overrides.no_cors && file.server.cors.unwrap_or(defaults.server.cors);

        Self {
            server: ServerConfig {
                host: overrides
                    .host
                    .clone()
                    .or_else(|| file.server.host.clone())
                    .unwrap_or(defaults.server.host),
                port: overrides
                    .port
                    .or(file.server.port)
                    .unwrap_or(defaults.server.port),
                db_path: overrides
                    .db_path
                    .clone()
                    .or_else(|| file.storage.db_path.clone())
                    .unwrap_or(defaults.server.db_path),
                api_token,
                cors,
            },
            log_level: overrides
                .log_level
                .clone()
                .or_else(|| file.logging.level.clone())
                .unwrap_or(defaults.log_level),
            log_format: overrides
                .log_format
                .or(file.logging.format)
                .unwrap_or(defaults.log_format),
        }
    }
}
