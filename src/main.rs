use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, ValueEnum};
use log::{error, info, LevelFilter};
use rayon::prelude::*;

use contour_shape_rust_lib::config::Config;
use contour_shape_rust_lib::image_io::{get_png_files_in_dir, load_image};
use contour_shape_rust_lib::pipeline::process_image;
use contour_shape_rust_lib::TraceSelector;

/// Command-line arguments
#[derive(Parser, Debug)]
#[clap(author, version, about = "ContourShape - Closed-contour tracing and curvature analysis")]
struct Args {
    /// Path to input file or directory
    #[clap(short, long)]
    input: Option<String>,

    /// Path to output directory
    #[clap(short, long)]
    output: Option<String>,

    /// Path to configuration file
    #[clap(short, long, default_value = "config.toml")]
    config: String,

    /// Which of the two traces per boundary to keep (overwrites config)
    #[clap(short, long)]
    selector: Option<SelectorArg>,

    /// Enable debug mode (save masks and log more detail)
    #[clap(short, long)]
    debug: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SelectorArg {
    First,
    Second,
}

impl From<SelectorArg> for TraceSelector {
    fn from(arg: SelectorArg) -> Self {
        match arg {
            SelectorArg::First => TraceSelector::First,
            SelectorArg::Second => TraceSelector::Second,
        }
    }
}

fn process_file(path: &Path, config: &Config, debug: bool) -> contour_shape_rust_lib::Result<()> {
    info!("Processing: {}", path.display());
    let input_image = load_image(path)?;
    process_image(input_image, config, debug)?;
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.debug { LevelFilter::Debug } else { LevelFilter::Info };
    env_logger::Builder::new()
        .filter_level(default_level)
        .parse_default_env()
        .init();

    let mut config = Config::from_file(&args.config)
        .with_context(|| format!("loading configuration from {}", args.config))?;

    if let Some(input) = args.input.clone() {
        config.input_path = input;
    }

    if let Some(output) = args.output.clone() {
        config.output_base_dir = output;
    }

    if let Some(selector) = args.selector {
        config.trace_selector = selector.into();
    }

    config.validate().context("invalid configuration")?;

    let start_time = Instant::now();
    let input_path = PathBuf::from(&config.input_path);

    if input_path.is_file() {
        info!("Processing single file: {}", input_path.display());
        process_file(&input_path, &config, args.debug)
            .with_context(|| format!("processing {}", input_path.display()))?;
    } else if input_path.is_dir() {
        info!("Processing directory: {}", input_path.display());
        let png_files = get_png_files_in_dir(&input_path)?;
        info!("Found {} PNG files", png_files.len());

        let report = |path: &PathBuf| {
            if let Err(e) = process_file(path, &config, args.debug) {
                error!("Failed to process {}: {}", path.display(), e);
                false
            } else {
                true
            }
        };

        let succeeded = if config.use_parallel {
            png_files.par_iter().filter(|path| report(path)).count()
        } else {
            png_files.iter().filter(|path| report(path)).count()
        };

        info!("{} of {} images processed", succeeded, png_files.len());
    } else {
        bail!("input path {} is neither a file nor a directory", input_path.display());
    }

    let elapsed = start_time.elapsed();
    info!("Processing completed in {:.2} seconds", elapsed.as_secs_f64());

    Ok(())
}
