/// Thread-safe progress reporting for the exposure driver.
///
/// `report` is called once per frame pulled from the source (merged,
/// skipped, or absent) and once more after finalization, so implementors
/// must tolerate a repeated `(total, total)` call. `total` is the source's
/// advisory count and may be zero or overstated for damaged captures;
/// treat it as display material. Reporting is observability only: it has
/// no return channel and cannot fail the run.
pub trait ProgressReporter: Send + Sync {
    fn report(&self, _frames_processed: usize, _total_frames: usize) {}
}

/// No-op progress reporter, used when `run_exposure` delegates.
pub struct NoOpReporter;

impl ProgressReporter for NoOpReporter {}
