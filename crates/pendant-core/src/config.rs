//! Pendant UI configuration.
//!
//! [`PendantConfig`] describes what the pendant page offers: the jog step
//! sizes to choose from and a row of shortcut buttons that send fixed
//! commands.  Pendant clients parse the serialized document structurally, so
//! the JSON field names (`stepSizeList`, `shortCutButtonList`, ...) are a
//! fixed contract.
//!
//! [`PendantSettings`] is the live, shared copy.  The host mutates it at any
//! time and every HTTP read takes a fresh snapshot, so changes show up on the
//! next request without restarting anything.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::error::{PendantError, Result};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

/// One selectable jog increment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepSizeOption {
    /// Increment sent with jog requests, kept as text so clients echo it
    /// back verbatim.
    pub value: String,
    /// Human-readable label.
    pub label: String,
    /// Whether this option is pre-selected on the pendant page.
    #[serde(default)]
    pub selected: bool,
}

impl StepSizeOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

/// A button on the pendant page that sends one fixed command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortcutButton {
    pub label: String,
    /// Raw command text, dispatched exactly like `/sendGcode` input.
    #[serde(rename = "gCode")]
    pub command: String,
}

impl ShortcutButton {
    pub fn new(label: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            command: command.into(),
        }
    }
}

/// The complete pendant UI customization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PendantConfig {
    /// Ordered jog increments; duplicates are allowed.
    pub step_size_list: Vec<StepSizeOption>,
    /// Ordered shortcut buttons.
    pub short_cut_button_list: Vec<ShortcutButton>,
}

impl Default for PendantConfig {
    fn default() -> Self {
        Self {
            step_size_list: vec![
                StepSizeOption::new("0.1", "0.1", false),
                StepSizeOption::new("1", "1", true),
                StepSizeOption::new("10", "10", false),
                StepSizeOption::new("100", "100", false),
            ],
            short_cut_button_list: vec![
                ShortcutButton::new("Return to Zero", "G91 G0 X0 Y0 Z0"),
                ShortcutButton::new("Reset Zero", "G92 X0 Y0 Z0"),
                ShortcutButton::new("Home", "$H"),
                ShortcutButton::new("Unlock", "$X"),
                ShortcutButton::new("Check Mode", "$C"),
            ],
        }
    }
}

impl PendantConfig {
    /// A configuration with no step sizes and no buttons.
    pub fn empty() -> Self {
        Self {
            step_size_list: Vec::new(),
            short_cut_button_list: Vec::new(),
        }
    }

    /// Append a step size option.  No uniqueness check.
    pub fn add_step_size_option(
        &mut self,
        value: impl Into<String>,
        label: impl Into<String>,
        is_default: bool,
    ) {
        self.step_size_list
            .push(StepSizeOption::new(value, label, is_default));
    }

    /// Append a shortcut button.
    pub fn add_shortcut_button(&mut self, label: impl Into<String>, command: impl Into<String>) {
        self.short_cut_button_list
            .push(ShortcutButton::new(label, command));
    }

    /// Parse a `[pendant]`-style TOML table.  Missing lists fall back to
    /// the defaults.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| PendantError::ConfigParse {
            reason: e.to_string(),
        })
    }

    /// Load a configuration file written in TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| PendantError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            step_sizes = config.step_size_list.len(),
            buttons = config.short_cut_button_list.len(),
            "pendant config loaded"
        );
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Shared handle
// ---------------------------------------------------------------------------

/// Cheaply cloneable, thread-safe handle to the live [`PendantConfig`].
#[derive(Debug, Clone, Default)]
pub struct PendantSettings {
    inner: Arc<RwLock<PendantConfig>>,
}

impl PendantSettings {
    pub fn new(config: PendantConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    /// Copy of the configuration as it is right now.
    pub fn snapshot(&self) -> PendantConfig {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the whole configuration, e.g. after the host reloads settings.
    pub fn replace(&self, config: PendantConfig) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = config;
    }

    pub fn add_step_size_option(
        &self,
        value: impl Into<String>,
        label: impl Into<String>,
        is_default: bool,
    ) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_step_size_option(value, label, is_default);
    }

    pub fn add_shortcut_button(&self, label: impl Into<String>, command: impl Into<String>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .add_shortcut_button(label, command);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
