use thiserror::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Stage of the shape fit a numerical failure originated from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitStage {
    Smoothing,
    PeriodicInterpolation,
    Differentiation,
}

impl fmt::Display for FitStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FitStage::Smoothing => "smoothing",
            FitStage::PeriodicInterpolation => "periodic-interpolation",
            FitStage::Differentiation => "differentiation",
        };
        f.write_str(name)
    }
}

/// Custom error types for ContourShape
#[derive(Error, Debug)]
pub enum ContourShapeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration from {path}: {source}")]
    ConfigLoad {
        source: toml::de::Error,
        path: PathBuf,
    },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Fitting failed during {stage}: {reason}")]
    FittingFailure {
        stage: FitStage,
        reason: String,
    },

    #[error("CSV output error: {0}")]
    CsvOutput(#[from] csv::Error),

    #[error("JSON output error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid input path: {0}")]
    InvalidPath(PathBuf),
}

impl ContourShapeError {
    pub(crate) fn fitting(stage: FitStage, reason: impl Into<String>) -> Self {
        ContourShapeError::FittingFailure {
            stage,
            reason: reason.into(),
        }
    }
}

/// Type alias for Result with our custom error type
pub type Result<T> = std::result::Result<T, ContourShapeError>;
