//! Operator settings for a comparison view.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::metric::MSE;
use crate::observable::{MEASURED_STRESS, PREDICTED_STRESS};

/// Fewest color levels a legend may use.
pub const MIN_COLOR_LEVELS: u32 = 3;
/// Most color levels a legend may use.
pub const MAX_COLOR_LEVELS: u32 = 256;

/// Settings that select what is compared and how it is displayed.
///
/// Missing keys take their default values, so `{}` is a valid configuration.
///
/// # Examples
/// ```
/// use fea_compare::ViewerConfig;
///
/// let config = ViewerConfig::from_json_str(r#"{ "right": "displacement", "n_colors": 16 }"#).unwrap();
/// assert_eq!(config.left, "measured_stress");
/// assert_eq!(config.right, "displacement");
/// assert_eq!(config.n_colors, 16);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Observable shown in the left pane.
    pub left: String,
    /// Observable shown in the right pane.
    pub right: String,
    /// Show both panes side by side.
    pub dual: bool,
    /// Use one color range for both panes.
    pub lock_color_range: bool,
    /// Add the boundary-condition pane.
    pub show_boundary: bool,
    /// Draw cell edges.
    pub show_edges: bool,
    /// Number of discrete color levels.
    pub n_colors: u32,
    /// Metric used to compare the two panes.
    pub metric: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            left: MEASURED_STRESS.to_string(),
            right: PREDICTED_STRESS.to_string(),
            dual: true,
            lock_color_range: true,
            show_boundary: true,
            show_edges: true,
            n_colors: 10,
            metric: MSE.to_string(),
        }
    }
}

impl ViewerConfig {
    /// Parse and validate a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed JSON and
    /// [`ConfigError::ColorLevels`] when `n_colors` is out of range.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] when the file cannot be read, otherwise as
    /// [`ViewerConfig::from_json_str`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path.as_ref())?;
        log::debug!("loaded configuration from {}", path.as_ref().display());
        Self::from_json_str(&text)
    }

    /// Check that the settings are usable.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ColorLevels`] when `n_colors` is out of range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_COLOR_LEVELS..=MAX_COLOR_LEVELS).contains(&self.n_colors) {
            return Err(ConfigError::ColorLevels {
                value: self.n_colors,
                min: MIN_COLOR_LEVELS,
                max: MAX_COLOR_LEVELS,
            });
        }
        Ok(())
    }
}
