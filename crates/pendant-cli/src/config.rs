//! Settings file loading.
//!
//! Reads `config/pendant.toml` (or the file given with `--config`):
//!
//! ```toml
//! [server]
//! bind_addr = "0.0.0.0"
//! port = 8080
//!
//! [[pendant.stepSizeList]]
//! value = "1"
//! label = "1 mm"
//! selected = true
//!
//! [[pendant.shortCutButtonList]]
//! label = "Home"
//! gCode = "$H"
//! ```
//!
//! Every section is optional; anything missing falls back to defaults.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use pendant_core::PendantConfig;
use pendant_web::ServerConfig;

use crate::cli::ListenArgs;

/// Settings file consulted when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "config/pendant.toml";

/// Everything the runner reads from its settings file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub pendant: PendantConfig,
}

impl AppConfig {
    /// Load settings from `path`, or from [`DEFAULT_CONFIG_PATH`] if it
    /// exists, or fall back to defaults.
    ///
    /// An explicitly named file must exist.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    tracing::debug!("no settings file, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("invalid settings in {}", path.display()))?;
        tracing::info!(path = %path.display(), "settings loaded");
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply command-line overrides on top of the file settings.
    pub fn with_listen_args(mut self, args: &ListenArgs) -> Self {
        if let Some(bind) = args.bind {
            self.server.bind_addr = bind;
        }
        if let Some(port) = args.port {
            self.server.port = port;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
