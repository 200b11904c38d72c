//! Thresholds for drop-position detection

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading drop configuration or geometry fixtures
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Detection thresholds, in canvas pixels
///
/// The defaults were tuned by hand to stop adjacent detection zones from
/// flickering as the pointer moves; none of them carry further meaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DropConfig {
    /// Distance from a row's top or bottom edge that counts as a row break
    pub row_edge_band: f64,

    /// Distance from an element's left or right edge that counts as an edge insertion
    pub element_edge_band: f64,

    /// Rows closer than this are treated as tightly packed
    pub tight_row_gap: f64,

    /// Sibling gaps wider than this make element edges row boundaries
    pub wide_element_gap: f64,

    /// Vertical padding applied to a row's rendered span for hit testing
    pub row_margin: f64,

    /// Thickness of the insertion indicator bar
    pub indicator_thickness: f64,

    /// Length trimmed from the indicator bar (half at each end)
    pub indicator_margin: f64,
}

impl DropConfig {
    pub const ROW_EDGE_BAND: f64 = 15.0;
    pub const ELEMENT_EDGE_BAND: f64 = 20.0;
    pub const TIGHT_ROW_GAP: f64 = 30.0;
    pub const WIDE_ELEMENT_GAP: f64 = 40.0;
    pub const ROW_MARGIN: f64 = 10.0;
    pub const INDICATOR_THICKNESS: f64 = 3.0;
    pub const INDICATOR_MARGIN: f64 = 10.0;

    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load overrides from a TOML string; missing keys keep their defaults
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Set the row-edge band
    pub fn with_row_edge_band(mut self, band: f64) -> Self {
        self.row_edge_band = band;
        self
    }

    /// Set the element-edge band
    pub fn with_element_edge_band(mut self, band: f64) -> Self {
        self.element_edge_band = band;
        self
    }

    pub fn with_tight_row_gap(mut self, gap: f64) -> Self {
        self.tight_row_gap = gap;
        self
    }

    pub fn with_wide_element_gap(mut self, gap: f64) -> Self {
        self.wide_element_gap = gap;
        self
    }

    pub fn with_row_margin(mut self, margin: f64) -> Self {
        self.row_margin = margin;
        self
    }

    /// Set the indicator bar thickness and end margin
    pub fn with_indicator(mut self, thickness: f64, margin: f64) -> Self {
        self.indicator_thickness = thickness;
        self.indicator_margin = margin;
        self
    }
}

impl Default for DropConfig {
    fn default() -> Self {
        Self {
            row_edge_band: Self::ROW_EDGE_BAND,
            element_edge_band: Self::ELEMENT_EDGE_BAND,
            tight_row_gap: Self::TIGHT_ROW_GAP,
            wide_element_gap: Self::WIDE_ELEMENT_GAP,
            row_margin: Self::ROW_MARGIN,
            indicator_thickness: Self::INDICATOR_THICKNESS,
            indicator_margin: Self::INDICATOR_MARGIN,
        }
    }
}
