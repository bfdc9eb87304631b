use crate::config::SheetConfig;
use crate::error::ConfigError;
use serde::Serialize;

/// Every sheet is a grid of this many columns.
pub const COLUMNS: usize = 3;

/// Cell pitch and origin of one run, derived once from the sheet settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SheetGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
    pub start_x: f32,
    pub start_y: f32,
    pub delta_x: f32,
    pub delta_y: f32,
    pub labels_per_sheet: usize,
    /// Width of a single label, `delta_x` minus the gutter between columns.
    pub label_width: f32,
    pub label_height: f32,
}

impl SheetGeometry {
    /// Validates the sheet settings and computes the grid pitch.
    ///
    /// `delta_x = (W - 2M) / 3 + K_x` and `delta_y = (H - 2M) / (N / 3) - K_y`, where the
    /// `K` terms are the stock calibration constants from [`SheetConfig`].
    pub fn from_config(config: &SheetConfig) -> Result<Self, ConfigError> {
        let n = config.labels_per_sheet;
        if n == 0 || n % COLUMNS != 0 {
            return Err(ConfigError::LabelsPerSheet {
                value: n,
                columns: COLUMNS,
            });
        }
        ensure_positive("sheet width", config.width)?;
        ensure_positive("sheet height", config.height)?;
        ensure_finite("offset_y", config.offset_y)?;
        ensure_finite("column correction", config.column_correction)?;
        ensure_finite("row correction", config.row_correction)?;
        ensure_finite("column gutter", config.column_gutter)?;
        ensure_finite("margin", config.margin)?;
        if config.margin < 0.0 {
            return Err(ConfigError::Negative {
                field: "margin",
                value: config.margin,
            });
        }

        let start_x = config.margin;
        let start_y = config.margin + config.offset_y;
        ensure_finite("start_x", start_x)?;
        ensure_finite("start_y", start_y)?;

        let rows = (n / COLUMNS) as f32;
        let printable_width = config.width - 2.0 * config.margin;
        let delta_x = printable_width / COLUMNS as f32 + config.column_correction;
        let delta_y = (config.height - 2.0 * config.margin) / rows - config.row_correction;
        ensure_positive("delta_x", delta_x)?;
        ensure_positive("delta_y", delta_y)?;

        let label_width = delta_x - config.column_gutter;
        ensure_positive("label width", label_width)?;

        Ok(Self {
            width: config.width,
            height: config.height,
            margin: config.margin,
            start_x,
            start_y,
            delta_x,
            delta_y,
            labels_per_sheet: n,
            label_width,
            label_height: delta_y,
        })
    }

    /// Labels stacked in one column of a sheet.
    pub fn rows(&self) -> usize {
        self.labels_per_sheet / COLUMNS
    }
}

fn ensure_finite(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

fn ensure_positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sheet(labels_per_sheet: usize) -> SheetConfig {
        SheetConfig {
            labels_per_sheet,
            ..SheetConfig::default()
        }
    }

    #[test]
    fn letter_stock_with_thirty_labels() {
        let geometry = SheetGeometry::from_config(&sheet(30)).unwrap();
        assert!((geometry.delta_x - 703.33).abs() < 0.01);
        assert!((geometry.delta_y - 253.0).abs() < 0.001);
        assert_eq!(geometry.start_x, 40.0);
        assert_eq!(geometry.start_y, 130.0);
        assert_eq!(geometry.rows(), 10);
    }

    #[test]
    fn letter_stock_with_twenty_four_labels() {
        let geometry = SheetGeometry::from_config(&sheet(24)).unwrap();
        assert!((geometry.delta_y - 320.75).abs() < 0.001);
        assert_eq!(geometry.rows(), 8);
    }

    #[test]
    fn offset_moves_only_the_vertical_origin() {
        let mut config = sheet(30);
        config.offset_y = 0.0;
        let geometry = SheetGeometry::from_config(&config).unwrap();
        assert_eq!(geometry.start_y, 40.0);
        assert_eq!(geometry.start_x, 40.0);
    }

    #[test]
    fn rejects_counts_not_divisible_by_columns() {
        let err = SheetGeometry::from_config(&sheet(25)).unwrap_err();
        assert_eq!(
            err,
            ConfigError::LabelsPerSheet {
                value: 25,
                columns: 3
            }
        );
        assert!(SheetGeometry::from_config(&sheet(0)).is_err());
    }

    #[test]
    fn rejects_non_positive_pitch() {
        let mut config = sheet(30);
        config.margin = 1100.0;
        let err = SheetGeometry::from_config(&config).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::NonPositive {
                field: "delta_x",
                ..
            }
        ));

        let mut config = sheet(30);
        config.row_correction = 300.0;
        assert!(matches!(
            SheetGeometry::from_config(&config),
            Err(ConfigError::NonPositive { field: "delta_y", .. })
        ));
    }

    #[test]
    fn rejects_non_finite_offset() {
        let mut config = sheet(30);
        config.offset_y = f32::NAN;
        assert!(matches!(
            SheetGeometry::from_config(&config),
            Err(ConfigError::NotFinite { field: "offset_y", .. })
        ));

        config.offset_y = f32::INFINITY;
        assert!(SheetGeometry::from_config(&config).is_err());
    }

    #[test]
    fn rejects_non_finite_margin() {
        let mut config = sheet(30);
        config.margin = f32::NAN;
        assert!(matches!(
            SheetGeometry::from_config(&config),
            Err(ConfigError::NotFinite { field: "margin", .. })
        ));
    }

    #[test]
    fn rejects_negative_margin() {
        let mut config = sheet(30);
        config.margin = -5.0;
        assert_eq!(
            SheetGeometry::from_config(&config).unwrap_err(),
            ConfigError::Negative {
                field: "margin",
                value: -5.0
            }
        );
    }

    #[test]
    fn negative_offset_is_allowed() {
        let mut config = sheet(30);
        config.offset_y = -20.0;
        let geometry = SheetGeometry::from_config(&config).unwrap();
        assert_eq!(geometry.start_y, 20.0);
    }
}
