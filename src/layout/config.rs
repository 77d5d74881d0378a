use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;

/// Spacing constants for [`auto_layout`](super::auto_layout).
///
/// Missing fields fall back to their defaults, so a config file may override
/// only the values it cares about:
///
/// ```rust
/// use splitflow::layout::LayoutConfig;
///
/// let config = LayoutConfig::from_json_str(r#"{ "stepGapX": 400 }"#).unwrap();
/// assert_eq!(config.step_gap_x, 400.0);
/// assert_eq!(config.variant_gap_y, 120.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    pub step_gap_x: f64,
    pub variant_gap_y: f64,
    pub start_x: f64,
    pub start_y: f64,
}

impl LayoutConfig {
    pub const STEP_GAP_X: f64 = 300.0;
    pub const VARIANT_GAP_Y: f64 = 120.0;
    pub const START_X: f64 = 40.0;
    pub const START_Y: f64 = 80.0;

    /// Load a layout config from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            step_gap_x: Self::STEP_GAP_X,
            variant_gap_y: Self::VARIANT_GAP_Y,
            start_x: Self::START_X,
            start_y: Self::START_Y,
        }
    }
}
