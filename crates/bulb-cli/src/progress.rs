use std::sync::atomic::{AtomicBool, Ordering};

use bulb_core::progress::ProgressReporter;
use indicatif::ProgressBar;

/// Terminal progress bar fed by the driver's per-frame reports.
///
/// The source's advisory frame count arrives with the first report and
/// sets the bar length; a source advertising zero frames leaves the bar
/// length unset and only the position ticks. Repeated completion reports
/// are harmless, the position just lands on the same value again.
pub struct BarReporter {
    bar: ProgressBar,
    sized: AtomicBool,
}

impl BarReporter {
    pub fn new(bar: ProgressBar) -> Self {
        Self {
            bar,
            sized: AtomicBool::new(false),
        }
    }
}

impl ProgressReporter for BarReporter {
    fn report(&self, frames_processed: usize, total_frames: usize) {
        if total_frames > 0 && !self.sized.swap(true, Ordering::Relaxed) {
            self.bar.set_length(total_frames as u64);
        }
        self.bar.set_position(frames_processed as u64);
    }
}
