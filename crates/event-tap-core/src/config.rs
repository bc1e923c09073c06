//! Runtime configuration, loaded from YAML.

use crate::{CoreResult, InputMode, Point};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How the input mode is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputModeSetting {
    /// Probe the host.
    #[default]
    Auto,
    Touch,
    Mouse,
}

impl InputModeSetting {
    /// Resolve to a concrete mode, calling `detect` only for `Auto`.
    pub fn resolve(self, detect: impl FnOnce() -> InputMode) -> InputMode {
        match self {
            InputModeSetting::Auto => detect(),
            InputModeSetting::Touch => InputMode::Touch,
            InputModeSetting::Mouse => InputMode::Mouse,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TapConfig {
    pub input_mode: InputModeSetting,
    /// Capacity of the raw input channel.
    pub feed_capacity: usize,
    /// Page scroll offset; client coordinates are page minus this.
    pub scroll_offset: Point,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            input_mode: InputModeSetting::Auto,
            feed_capacity: 1024,
            scroll_offset: Point::default(),
        }
    }
}

/// Parse configuration from a YAML string.
pub fn parse_config(content: &str) -> CoreResult<TapConfig> {
    let config: TapConfig = serde_yaml::from_str(content)?;
    Ok(config)
}

/// Load configuration from a YAML file.
pub fn load_config(path: impl AsRef<Path>) -> CoreResult<TapConfig> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load configuration, falling back to defaults when the file is missing or invalid.
pub fn load_config_or_default(path: impl AsRef<Path>) -> TapConfig {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No config at {:?}, using defaults", path);
        return TapConfig::default();
    }

    match load_config(path) {
        Ok(config) => {
            tracing::info!("Loaded config from {:?}", path);
            config
        }
        Err(e) => {
            tracing::warn!("Failed to load config {:?}: {}, using defaults", path, e);
            TapConfig::default()
        }
    }
}
