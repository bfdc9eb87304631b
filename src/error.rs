use std::path::PathBuf;
use thiserror::Error;

/// Invalid sheet or layout settings. Always raised before any file is touched.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("labels per sheet must be a positive multiple of {columns}, got {value}")]
    LabelsPerSheet { value: usize, columns: usize },
    #[error("unsupported labels per sheet {value}, expected one of {supported:?}")]
    UnsupportedLabelsPerSheet {
        value: usize,
        supported: &'static [usize],
    },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f32 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f32 },
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f32 },
}

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {}", path.display())]
    Missing { path: PathBuf },
    #[error("failed to stage {}: {source}", path.display())]
    Stage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
