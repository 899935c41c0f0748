// src/lib.rs - Library interface for ContourShape

pub mod arclength;
pub mod boundary;
pub mod config;
pub mod errors;
pub mod image_io;
pub mod mask;
pub mod output;
pub mod pipeline;
pub mod segmentation;
pub mod shape_fit;
pub mod spline;

/// A point in the plane; traced pixels map to x = row, y = col
pub type Point = nalgebra::Point2<f64>;

// Re-export commonly used types and functions
pub use errors::{ContourShapeError, FitStage, Result};
pub use config::Config;
pub use pipeline::{fit_mask_contours, process_image, FittedContour};
pub use image_io::{InputImage, load_image, save_image};
pub use mask::BinaryMask;
pub use segmentation::segment_image;

// Re-export the tracing and fitting core
pub use arclength::{cumulative_length, total_length};
pub use boundary::{trace, trace_all, Direction, PixelChain, TraceSelector};
pub use shape_fit::{fit, fit_with_options, FitOptions, ShapeFit};
pub use spline::{Extension, PiecewiseCubic};
