//! Runtime configuration for the server and client sessions
//!
//! Loaded from an optional JSON file; every field has a default so a
//! partial file (or none at all) is valid.

use crate::error::{EditError, Result};
use crate::ClientID;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Config {
    /// Address the server listens on
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Port the server listens on and the client connects to
    #[serde(default = "default_port")]
    pub port: u16,

    /// Address the client connects to
    #[serde(default = "default_server_address")]
    pub server_address: String,

    /// Identity announced in the handshake and carried in every operation
    #[serde(default = "default_client_id")]
    pub client_id: ClientID,

    /// File the server loads as the starting document
    #[serde(default)]
    pub initial_document: Option<PathBuf>,

    /// Frames larger than this are discarded
    #[serde(default = "default_max_message_bytes")]
    pub max_message_bytes: usize,

    /// Fallback log filter when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5555
}

fn default_server_address() -> String {
    "127.0.0.1".to_string()
}

fn default_client_id() -> ClientID {
    format!("client_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

fn default_max_message_bytes() -> usize {
    1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load from `path`, or defaults when no path is given
    ///
    /// A missing or empty file falls back to defaults with a warning; a
    /// file that does not parse is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Config::default());
        };

        if !path.exists() {
            tracing::warn!("Config file {} not found, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;

        // Handle empty or whitespace-only config file
        if content.trim().is_empty() {
            tracing::warn!("Config file {} is empty, using defaults", path.display());
            return Ok(Config::default());
        }

        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Write as pretty-printed JSON
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values that would break the wire format or framing
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(EditError::Config("client_id must not be empty".to_string()));
        }
        // The client id is the second colon-delimited field of every message
        if self.client_id.contains(':') {
            return Err(EditError::Config(format!(
                "client_id {:?} must not contain ':'",
                self.client_id
            )));
        }
        if self.max_message_bytes == 0 {
            return Err(EditError::Config(
                "max_message_bytes must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// `bind_address:port`
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }

    /// `server_address:port`
    pub fn connect_addr(&self) -> String {
        format!("{}:{}", self.server_address, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            server_address: default_server_address(),
            client_id: default_client_id(),
            initial_document: None,
            max_message_bytes: default_max_message_bytes(),
            log_level: default_log_level(),
        }
    }
}
