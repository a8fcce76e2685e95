use std::path::PathBuf;

use anyhow::Result;
use bulb_core::consts::COLOR_CHANNEL_COUNT;
use bulb_core::frame::ColorMode;
use bulb_core::source::{open_source, FrameSource};
use clap::Args;

#[derive(Args)]
pub struct InfoArgs {
    /// Input SER file or directory of frames
    pub input: PathBuf,
}

pub fn run(args: &InfoArgs) -> Result<()> {
    let source = open_source(&args.input)?;
    let info = source.source_info();

    println!("Source:      {}", info.path.display());
    println!("Frames:      {}", info.total_frames);
    println!("Dimensions:  {}x{}", info.width, info.height);
    println!("Bit depth:   {}", info.bit_depth);
    println!("Color mode:  {:?}", info.color_mode);

    if let Some(ref obs) = info.observer {
        println!("Observer:    {}", obs);
    }
    if let Some(ref tel) = info.telescope {
        println!("Telescope:   {}", tel);
    }
    if let Some(ref inst) = info.instrument {
        println!("Instrument:  {}", inst);
    }
    if let Some(us) = info.capture_duration_us {
        println!("Duration:    {:.1} s", us as f64 / 1e6);
    }

    let samples_per_pixel = match info.color_mode {
        ColorMode::RGB | ColorMode::BGR => COLOR_CHANNEL_COUNT,
        _ => 1,
    };
    let bytes_per_sample = if info.bit_depth <= 8 { 1 } else { 2 };
    let frame_bytes =
        info.width as usize * info.height as usize * samples_per_pixel * bytes_per_sample;
    println!(
        "Data size:   {}",
        data_size_label(frame_bytes, info.total_frames)
    );

    Ok(())
}

/// Estimated capture size on disk. The frame count is the header's advisory
/// figure and may be absurd for damaged captures, so the product is checked
/// rather than trusted.
fn data_size_label(frame_bytes: usize, total_frames: usize) -> String {
    frame_bytes
        .checked_mul(total_frames)
        .map_or("unknown".into(), |bytes| {
            format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
        })
}
