//! Configuration system for padwatch.
//!
//! Resolution order: environment variables → config file → defaults.
//! Command-line flags are applied on top by the daemon.
//!
//! Config file location:
//!   1. $PADWATCH_CONFIG (explicit override)
//!   2. $XDG_CONFIG_HOME/padwatch/config.toml
//!   3. ~/.config/padwatch/config.toml

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default TCP port the dongle bridge connects to.
pub const DEFAULT_PORT: u16 = 50007;

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PadwatchConfig {
    pub network: NetworkConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Bind address. "0.0.0.0" = all interfaces.
    pub host: String,
    pub port: u16,
    /// Bytes per socket read. One read carries one message.
    pub read_buffer: usize,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log received bytes and registry state.
    pub debug: bool,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            read_buffer: 1024,
        }
    }
}

impl NetworkConfig {
    /// `host:port`, suitable for `SocketAddr` parsing.
    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

// ── Path helpers ──────────────────────────────────────────────────────────────

fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_or_home().join(".config"))
        .join("padwatch")
}

fn dirs_or_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
}

// ── Errors ────────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {0}: {1}")]
    ReadFailed(PathBuf, std::io::Error),
    #[error("failed to parse {0}: {1}")]
    ParseFailed(PathBuf, toml::de::Error),
    #[error("failed to write {0}: {1}")]
    WriteFailed(PathBuf, std::io::Error),
    #[error("failed to serialize: {0}")]
    SerializeFailed(toml::ser::Error),
}

// ── Loading ───────────────────────────────────────────────────────────────────

impl PadwatchConfig {
    /// Load config: env vars → file → defaults.
    ///
    /// Also returns a warning for every env override that was ignored. The
    /// caller logs them once a subscriber is installed.
    pub fn load() -> Result<(Self, Vec<String>), ConfigError> {
        let mut config = Self::load_file(&Self::file_path())?;
        let warnings = config.apply_env_overrides();
        Ok((config, warnings))
    }

    /// Parse a config file, or return defaults if it does not exist.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text =
            std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed(path.to_path_buf(), e))?;
        Self::from_toml(&text).map_err(|e| ConfigError::ParseFailed(path.to_path_buf(), e))
    }

    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Config file path.
    pub fn file_path() -> PathBuf {
        std::env::var("PADWATCH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| config_dir().join("config.toml"))
    }

    /// Write default config if none exists. Returns the path.
    pub fn write_default_if_missing() -> Result<PathBuf, ConfigError> {
        let path = Self::file_path();
        if !path.exists() {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
            }
            let text = toml::to_string_pretty(&PadwatchConfig::default())
                .map_err(ConfigError::SerializeFailed)?;
            std::fs::write(&path, text).map_err(|e| ConfigError::WriteFailed(path.clone(), e))?;
        }
        Ok(path)
    }

    /// Apply PADWATCH_* env var overrides.
    fn apply_env_overrides(&mut self) -> Vec<String> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Vec<String> {
        let mut warnings = Vec::new();
        if let Some(v) = lookup("PADWATCH_NETWORK__HOST") {
            self.network.host = v;
        }
        if let Some(v) = lookup("PADWATCH_NETWORK__PORT") {
            match v.parse() {
                Ok(p) => self.network.port = p,
                Err(_) => warnings.push(format!("ignoring invalid PADWATCH_NETWORK__PORT {v:?}")),
            }
        }
        if let Some(v) = lookup("PADWATCH_LOGGING__DEBUG") {
            self.logging.debug = v == "true" || v == "1";
        }
        warnings
    }
}
