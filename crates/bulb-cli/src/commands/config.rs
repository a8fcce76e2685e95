use std::path::PathBuf;

use anyhow::{Context, Result};
use bulb_core::pipeline::config::ExposureConfig;
use clap::Args;

#[derive(Args)]
pub struct ConfigArgs {
    /// Write the config to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: &ConfigArgs) -> Result<()> {
    let config = ExposureConfig {
        input: PathBuf::from("capture.ser"),
        output: PathBuf::from("exposure.png"),
        step: 1,
    };
    let contents = toml::to_string_pretty(&config).context("Failed to serialize config")?;

    if let Some(ref path) = args.output {
        std::fs::write(path, &contents)
            .with_context(|| format!("Failed to write config to {}", path.display()))?;
        println!("Default config saved to {}", path.display());
    } else {
        print!("{}", contents);
    }
    Ok(())
}
