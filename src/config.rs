// src/config.rs - Run configuration loaded from TOML

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};

use crate::boundary::TraceSelector;
use crate::errors::{ContourShapeError, Result};
use crate::shape_fit::{FitOptions, DEFAULT_SAMPLES, DEFAULT_SEAM_PADDING, DEFAULT_SMOOTHING_SCALE};

/// Configuration for ContourShape
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    pub input_path: String,
    pub output_base_dir: String,

    // Mask acquisition
    #[serde(default = "default_threshold")]
    pub threshold: u8,

    /// Treat dark pixels as foreground
    #[serde(default)]
    pub invert: bool,

    /// Radius of the closing applied to the thresholded mask (0 disables it)
    #[serde(default)]
    pub closing_radius: u8,

    // Boundary tracing
    #[serde(default = "default_min_chain_length")]
    pub min_chain_length: usize,

    /// Upper pixel-count bound; unbounded when absent
    #[serde(default)]
    pub max_chain_length: Option<usize>,

    #[serde(default = "default_trace_selector")]
    pub trace_selector: TraceSelector,

    // Shape fitting
    #[serde(default = "default_resample_points")]
    pub resample_points: usize,

    /// Constant in the smoothing heuristic; only retune for a different pixel pitch
    #[serde(default = "default_smoothing_scale")]
    pub smoothing_scale: f64,

    /// Wrapped points on each side of the contour for the smoothing fit
    #[serde(default = "default_seam_padding")]
    pub seam_padding: usize,

    #[serde(default = "default_parallel")]
    pub use_parallel: bool,
}

fn default_threshold() -> u8 {
    128
}

fn default_min_chain_length() -> usize {
    4
}

fn default_trace_selector() -> TraceSelector {
    TraceSelector::First
}

fn default_resample_points() -> usize {
    DEFAULT_SAMPLES
}

fn default_smoothing_scale() -> f64 {
    DEFAULT_SMOOTHING_SCALE
}

fn default_seam_padding() -> usize {
    DEFAULT_SEAM_PADDING
}

fn default_parallel() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            input_path: "./input".to_string(),
            output_base_dir: "./output".to_string(),
            threshold: default_threshold(),
            invert: false,
            closing_radius: 0,
            min_chain_length: default_min_chain_length(),
            max_chain_length: None,
            trace_selector: default_trace_selector(),
            resample_points: default_resample_points(),
            smoothing_scale: default_smoothing_scale(),
            seam_padding: default_seam_padding(),
            use_parallel: default_parallel(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ContourShapeError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        toml::from_str(&content).map_err(|source| ContourShapeError::ConfigLoad {
            source,
            path: path.to_path_buf(),
        })
    }

    /// Upper chain length bound for the tracer
    pub fn max_chain_length_or_unbounded(&self) -> usize {
        self.max_chain_length.unwrap_or(usize::MAX)
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            samples: self.resample_points,
            smoothing_scale: self.smoothing_scale,
            seam_padding: self.seam_padding,
        }
    }

    /// Check parameter ranges without touching the filesystem
    pub fn validate_parameters(&self) -> Result<()> {
        if self.min_chain_length >= self.max_chain_length_or_unbounded() {
            return Err(ContourShapeError::Config(
                "min_chain_length must be < max_chain_length".to_string(),
            ));
        }

        if self.resample_points < 4 {
            return Err(ContourShapeError::Config(
                "resample_points must be >= 4".to_string(),
            ));
        }

        if !(self.smoothing_scale > 0.0) || !self.smoothing_scale.is_finite() {
            return Err(ContourShapeError::Config(
                "smoothing_scale must be a finite value > 0.0".to_string(),
            ));
        }

        Ok(())
    }

    /// Validate configuration and prepare the output directories
    pub fn validate(&self) -> Result<()> {
        let input_path = PathBuf::from(&self.input_path);
        if !input_path.exists() {
            return Err(ContourShapeError::InvalidPath(input_path));
        }

        self.validate_parameters()?;

        let base_dir = PathBuf::from(&self.output_base_dir);
        for subdir in ["Contours", "Summary"] {
            fs::create_dir_all(base_dir.join(subdir)).map_err(|e| {
                ContourShapeError::Io(io::Error::new(
                    ErrorKind::Other,
                    format!("Failed to create {} output directory: {}", subdir, e),
                ))
            })?;
        }

        Ok(())
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            ContourShapeError::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(path, content)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            input_path = "masks"
            output_base_dir = "out"
            "#,
        )
        .unwrap();

        assert_eq!(config.threshold, 128);
        assert_eq!(config.min_chain_length, 4);
        assert_eq!(config.max_chain_length, None);
        assert_eq!(config.trace_selector, TraceSelector::First);
        assert_eq!(config.resample_points, 200);
        assert_eq!(config.smoothing_scale, 0.06);
        assert_eq!(config.seam_padding, 24);
        assert!(config.use_parallel);
    }

    #[test]
    fn test_selector_is_lowercase() {
        let config: Config = toml::from_str(
            r#"
            input_path = "masks"
            output_base_dir = "out"
            trace_selector = "second"
            max_chain_length = 5000
            "#,
        )
        .unwrap();
        assert_eq!(config.trace_selector, TraceSelector::Second);
        assert_eq!(config.max_chain_length_or_unbounded(), 5000);
    }

    #[test]
    fn test_save_and_reload() {
        let mut config = Config::default();
        config.invert = true;
        config.max_chain_length = Some(900);
        config.trace_selector = TraceSelector::Second;
        config.seam_padding = 8;

        let path = std::env::temp_dir().join(format!("contour_shape_config_{}.toml", std::process::id()));
        config.save_to_file(&path).unwrap();
        let reloaded = Config::from_file(&path).unwrap();
        let _ = fs::remove_file(&path);

        assert_eq!(reloaded, config);
        assert_eq!(reloaded.fit_options().seam_padding, 8);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let path = std::env::temp_dir().join("contour_shape_no_such_config.toml");
        assert!(matches!(Config::from_file(&path), Err(ContourShapeError::Config(_))));
    }

    #[test]
    fn test_rejects_inverted_length_range() {
        let config = Config {
            min_chain_length: 50,
            max_chain_length: Some(20),
            ..Config::default()
        };
        assert!(config.validate_parameters().is_err());
    }

    #[test]
    fn test_rejects_bad_fit_parameters() {
        let config = Config { resample_points: 3, ..Config::default() };
        assert!(config.validate_parameters().is_err());
        let config = Config { smoothing_scale: -1.0, ..Config::default() };
        assert!(config.validate_parameters().is_err());
        assert!(Config::default().validate_parameters().is_ok());
    }
}
