use std::ops::Range;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::info;

use crate::error::{BulbError, Result};
use crate::io::image_io::save_average;
use crate::progress::{NoOpReporter, ProgressReporter};
use crate::sample::FrameSampler;
use crate::source::{open_source, FramePull, FrameSource, SerSource};
use crate::stack::ExposureStacker;

use super::config::ExposureConfig;

/// Shared flag for aborting a run between frames.
///
/// Clones share the flag. Once set, the driver stops at the next frame
/// boundary with `BulbError::Cancelled` and writes nothing.
#[derive(Clone, Debug, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// What a finished run did, for callers that print closing lines.
#[derive(Clone, Debug)]
pub struct ExposureSummary {
    /// Frames pulled from the source, decoded or not.
    pub frames_seen: usize,
    /// Pulls whose frame could not be produced.
    pub frames_absent: usize,
    /// Frames folded into the average.
    pub frames_merged: u64,
    pub output: PathBuf,
}

/// Run a long-exposure computation without progress output.
pub fn run_exposure(config: &ExposureConfig) -> Result<ExposureSummary> {
    run_exposure_reported(config, Arc::new(NoOpReporter))
}

/// Run a long-exposure computation with a thread-safe progress reporter.
pub fn run_exposure_reported(
    config: &ExposureConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<ExposureSummary> {
    run_exposure_cancellable(config, reporter, &CancelFlag::new())
}

/// Full driver: open the source, stream every frame through the stacker,
/// combine the channel means and write the result.
///
/// The cancel flag is checked once per frame. The source handle lives in
/// this scope, so every exit path (done, failed, cancelled) releases it.
pub fn run_exposure_cancellable(
    config: &ExposureConfig,
    reporter: Arc<dyn ProgressReporter>,
    cancel: &CancelFlag,
) -> Result<ExposureSummary> {
    let sampler = FrameSampler::new(config.step)?;
    let mut source = open_source(&config.input)?;
    let total = source.frame_count();
    info!(
        input = %config.input.display(),
        total_frames = total,
        step = sampler.step(),
        "Opened frame source"
    );

    let mut stacker = ExposureStacker::new(sampler);
    let mut frames_seen = 0usize;
    let mut frames_absent = 0usize;

    loop {
        if cancel.is_cancelled() {
            info!(frames_seen, "Run cancelled");
            return Err(BulbError::Cancelled);
        }
        match source.next_frame()? {
            FramePull::Frame(frame) => {
                stacker.consume(frames_seen, Some(&frame))?;
            }
            FramePull::Absent => {
                frames_absent += 1;
                stacker.consume(frames_seen, None)?;
            }
            FramePull::EndOfStream => break,
        }
        frames_seen += 1;
        reporter.report(frames_seen, total);
    }

    let frames_merged = stacker.frames_merged();
    info!(
        frames_seen,
        frames_absent, frames_merged, "Stream exhausted, combining channels"
    );

    let average = stacker.finalize()?;
    reporter.report(total, total);

    save_average(&average, &config.output)?;
    info!(output = %config.output.display(), "Average image written");

    Ok(ExposureSummary {
        frames_seen,
        frames_absent,
        frames_merged,
        output: config.output.clone(),
    })
}

/// Run a partitioned long-exposure computation without progress output.
pub fn run_exposure_partitioned(config: &ExposureConfig) -> Result<ExposureSummary> {
    run_exposure_partitioned_reported(config, Arc::new(NoOpReporter))
}

/// Partitioned run with a thread-safe progress reporter.
pub fn run_exposure_partitioned_reported(
    config: &ExposureConfig,
    reporter: Arc<dyn ProgressReporter>,
) -> Result<ExposureSummary> {
    run_exposure_partitioned_cancellable(config, reporter, &CancelFlag::new())
}

/// Split the capture timeline in half and stack the halves on separate
/// workers; the partial means combine count-weighted.
///
/// Needs indexed frame access, so this path is specific to SER captures;
/// a directory input falls back to the streaming walk. Each worker holds
/// one decoded frame plus its own channel planes, keeping memory
/// proportional to frame size times worker count. Every timeline index
/// still reports exactly once, through a shared counter, in whichever
/// order the workers reach it, followed by the completion re-report.
pub fn run_exposure_partitioned_cancellable(
    config: &ExposureConfig,
    reporter: Arc<dyn ProgressReporter>,
    cancel: &CancelFlag,
) -> Result<ExposureSummary> {
    let sampler = FrameSampler::new(config.step)?;
    if config.input.is_dir() {
        return run_exposure_cancellable(config, reporter, cancel);
    }
    let source = SerSource::open(&config.input)?;
    let total = source.frame_count();
    let available = source.available_frames();
    info!(
        input = %config.input.display(),
        total_frames = total,
        step = sampler.step(),
        "Opened capture for partitioned stacking"
    );

    if cancel.is_cancelled() {
        info!("Run cancelled");
        return Err(BulbError::Cancelled);
    }

    let frames_done = AtomicUsize::new(0);
    let stack_range = |range: Range<usize>| -> Result<(ExposureStacker, usize)> {
        let mut stacker = ExposureStacker::new(sampler);
        let mut frames_absent = 0usize;
        for index in range {
            if cancel.is_cancelled() {
                return Err(BulbError::Cancelled);
            }
            if index < available {
                let frame = source.read_frame(index)?;
                stacker.consume(index, Some(&frame))?;
            } else {
                frames_absent += 1;
                stacker.consume(index, None)?;
            }
            let done = frames_done.fetch_add(1, Ordering::Relaxed) + 1;
            reporter.report(done, total);
        }
        Ok((stacker, frames_absent))
    };

    // Stack the two halves in parallel
    let mid = total / 2;
    let (front, back) = rayon::join(|| stack_range(0..mid), || stack_range(mid..total));
    let (mut stacker, absent_front) = front?;
    let (back_stacker, absent_back) = back?;
    stacker.merge(back_stacker)?;
    let frames_absent = absent_front + absent_back;

    let frames_merged = stacker.frames_merged();
    info!(
        frames_seen = total,
        frames_absent, frames_merged, "Partitions combined"
    );

    let average = stacker.finalize()?;
    reporter.report(total, total);

    save_average(&average, &config.output)?;
    info!(output = %config.output.display(), "Average image written");

    Ok(ExposureSummary {
        frames_seen: total,
        frames_absent,
        frames_merged,
        output: config.output.clone(),
    })
}
