//! Layout constants.
//!
//! [`LayoutConfig`] carries the recognized layout options: cell and grid unit
//! sizes, the branch container header size, the minimum cell height and the
//! spatial calibration used to turn object sizes into cell heights.
//!
//! The struct deserializes from camelCase keys with every field optional, so a
//! JavaScript caller can override just the options it cares about:
//!
//! ```
//! # use lineage_layout_wasm::config::LayoutConfig;
//! let config = LayoutConfig::default();
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::LayoutError;

/// Configuration for the track scheme layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LayoutConfig {
    /// Width of a node cell.
    pub cell_width: f64,
    /// Horizontal distance between two adjacent columns.
    pub column_unit_width: f64,
    /// Vertical distance between two adjacent rows.
    pub row_unit_height: f64,
    /// Height of a branch container's label region.
    pub header_size: f64,
    /// Floor for cell heights, keeps tiny objects visible.
    pub min_cell_height: f64,
    /// Physical size of one unit, used to convert object sizes to cell heights.
    pub calibration_factor: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            cell_width: 128.0,
            column_unit_width: 160.0,
            row_unit_height: 120.0,
            header_size: 30.0,
            min_cell_height: 12.0,
            calibration_factor: 1.0,
        }
    }
}

impl LayoutConfig {
    /// Check that all sizes are usable.
    pub fn validate(&self) -> Result<(), LayoutError> {
        let sizes = [
            ("cellWidth", self.cell_width),
            ("columnUnitWidth", self.column_unit_width),
            ("rowUnitHeight", self.row_unit_height),
            ("calibrationFactor", self.calibration_factor),
        ];
        for (name, value) in sizes {
            if !value.is_finite() || value <= 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }

        for (name, value) in [
            ("headerSize", self.header_size),
            ("minCellHeight", self.min_cell_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(LayoutError::InvalidConfig(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }

        if self.min_cell_height > self.cell_width {
            return Err(LayoutError::InvalidConfig(format!(
                "minCellHeight ({}) exceeds cellWidth ({})",
                self.min_cell_height, self.cell_width
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(LayoutConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_zero_calibration() {
        let config = LayoutConfig {
            calibration_factor: 0.0,
            ..LayoutConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(LayoutError::InvalidConfig(msg)) if msg.contains("calibrationFactor")
        ));
    }

    #[test]
    fn test_rejects_nan_sizes() {
        let config = LayoutConfig {
            header_size: f64::NAN,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_min_height_above_width() {
        let config = LayoutConfig {
            min_cell_height: 200.0,
            ..LayoutConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
