use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use bulb_core::pipeline::config::ExposureConfig;
use bulb_core::pipeline::{run_exposure_partitioned_reported, run_exposure_reported};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use crate::progress::BarReporter;
use crate::summary;

#[derive(Args)]
pub struct RunArgs {
    /// Input SER file or directory of frames
    pub input: PathBuf,

    /// Run config file (TOML); exposure flags are ignored when set
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Keep every Nth frame
    #[arg(short, long, default_value = "1")]
    pub step: usize,

    /// Output image path (.png or .tiff)
    #[arg(short, long, default_value = "exposure.png")]
    pub output: PathBuf,

    /// Stack the two capture halves on separate worker threads (SER input)
    #[arg(long)]
    pub parallel: bool,
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        toml::from_str(&contents).context("Invalid run config")?
    } else {
        ExposureConfig {
            input: args.input.clone(),
            output: args.output.clone(),
            step: args.step,
        }
    };

    summary::print_run_header(&config);

    let bar = ProgressBar::no_length();
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:12} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    bar.set_message("Averaging");

    let reporter = Arc::new(BarReporter::new(bar.clone()));
    let result = if args.parallel {
        run_exposure_partitioned_reported(&config, reporter)?
    } else {
        run_exposure_reported(&config, reporter)?
    };
    bar.finish();

    summary::print_exposure_summary(&result);
    Ok(())
}
