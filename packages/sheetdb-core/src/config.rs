//! Service configuration.
//!
//! Supports TOML config files, environment variable overrides, and defaults.
//! Credentials are never read from disk by this crate beyond what the config
//! file carries; the access token is expected to be supplied out of band.

use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::error::{Result, StoreError};
use crate::range::SheetLayout;

/// Which tabular service backs the record store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Google Sheets v4 REST API
    Google,
    /// In-process grid, lost on restart
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "google" => Ok(Backend::Google),
            "memory" => Ok(Backend::Memory),
            other => Err(StoreError::Config(format!("Unknown backend: {}", other))),
        }
    }
}

/// Settings for reaching the spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Backend selection (default: google)
    pub backend: Backend,
    /// Spreadsheet identifier from the document URL
    pub spreadsheet_id: String,
    /// OAuth bearer token with spreadsheet write scope
    pub access_token: String,
    /// Sheets API root (default: "https://sheets.googleapis.com/v4")
    pub api_base_url: String,
    /// Upstream request timeout in milliseconds (default: 30000)
    pub upstream_timeout_ms: u64,
    /// Sheet name, id and record columns
    pub layout: SheetLayout,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Google,
            spreadsheet_id: String::new(),
            access_token: String::new(),
            api_base_url: "https://sheets.googleapis.com/v4".to_string(),
            upstream_timeout_ms: 30_000,
            layout: SheetLayout::default(),
        }
    }
}

/// Settings for the HTTP listener.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to (default: "127.0.0.1")
    pub host: String,
    /// Port to listen on (default: 8080)
    pub port: u16,
    /// Request body read timeout in milliseconds (default: 5000)
    pub request_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            request_timeout_ms: 5000,
        }
    }
}

/// Complete configuration as read from a config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub sheets: SheetConfig,
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| StoreError::Config(format!("Failed to read config file: {}", e)))?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).map_err(|e| StoreError::Config(format!("Invalid TOML: {}", e)))
    }

    /// Saves the configuration to a TOML file.
    pub fn save_to_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let toml = toml::to_string_pretty(self)
            .map_err(|e| StoreError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path.as_ref(), toml)
            .map_err(|e| StoreError::Config(format!("Failed to write config file: {}", e)))?;
        Ok(())
    }

    /// Applies environment variable overrides.
    ///
    /// `SPREADSHEET_ID` and `SHEETS_*` variables override the sheet section,
    /// `SHEETDB_*` variables override the server section.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = env::var("SPREADSHEET_ID") {
            self.sheets.spreadsheet_id = val;
        }
        if let Ok(val) = env::var("SHEETS_ACCESS_TOKEN") {
            self.sheets.access_token = val;
        }
        if let Ok(val) = env::var("SHEETS_BACKEND") {
            self.sheets.backend = val.parse()?;
        }
        if let Ok(val) = env::var("SHEETS_API_BASE_URL") {
            self.sheets.api_base_url = val;
        }
        if let Ok(val) = env::var("SHEETS_UPSTREAM_TIMEOUT_MS") {
            self.sheets.upstream_timeout_ms = val.parse().map_err(|_| {
                StoreError::Config(format!("Invalid upstream_timeout_ms: {}", val))
            })?;
        }
        if let Ok(val) = env::var("SHEETS_SHEET_NAME") {
            self.sheets.layout.sheet_name = val;
        }
        if let Ok(val) = env::var("SHEETS_SHEET_ID") {
            self.sheets.layout.sheet_id = val
                .parse()
                .map_err(|_| StoreError::Config(format!("Invalid sheet_id: {}", val)))?;
        }
        if let Ok(val) = env::var("SHEETDB_HOST") {
            self.server.host = val;
        }
        if let Ok(val) = env::var("SHEETDB_PORT") {
            self.server.port = val
                .parse()
                .map_err(|_| StoreError::Config(format!("Invalid port: {}", val)))?;
        }
        if let Ok(val) = env::var("SHEETDB_REQUEST_TIMEOUT_MS") {
            self.server.request_timeout_ms = val.parse().map_err(|_| {
                StoreError::Config(format!("Invalid request_timeout_ms: {}", val))
            })?;
        }
        Ok(())
    }

    /// Checks that the selected backend has what it needs to start.
    pub fn validate(&self) -> Result<()> {
        if self.sheets.backend == Backend::Google {
            if self.sheets.spreadsheet_id.trim().is_empty() {
                return Err(StoreError::Config(
                    "Missing SPREADSHEET_ID for the google backend".to_string(),
                ));
            }
            if self.sheets.access_token.trim().is_empty() {
                return Err(StoreError::Config(
                    "Missing SHEETS_ACCESS_TOKEN for the google backend".to_string(),
                ));
            }
        }
        if self.sheets.upstream_timeout_ms == 0 || self.server.request_timeout_ms == 0 {
            return Err(StoreError::Config("Timeouts must be positive".to_string()));
        }
        Ok(())
    }
}
