use ndarray::{Array2, Zip};

use crate::consts::PARALLEL_PIXEL_THRESHOLD;
use crate::error::{BulbError, Result};

/// Running per-pixel mean over one channel plane.
///
/// Holds a (count, mean) pair and folds each submitted grid in as
/// `mean = (count * mean + grid) / (count + 1)`, so memory stays at one
/// plane no matter how many frames pass through. The plane shape is fixed
/// by the first submission.
#[derive(Clone, Debug, Default)]
pub struct RunningMean {
    count: u64,
    mean: Option<Array2<f64>>,
}

impl RunningMean {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of grids folded in so far.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Plane shape established by the first submission, if any.
    pub fn shape(&self) -> Option<(usize, usize)> {
        self.mean.as_ref().map(|m| m.dim())
    }

    /// Current mean, if at least one grid has been folded in.
    pub fn mean(&self) -> Option<&Array2<f64>> {
        self.mean.as_ref()
    }

    /// Fold one grid into the mean and return the updated mean.
    ///
    /// The first call fixes the expected shape; a grid of any other shape
    /// fails with `ShapeMismatch` and leaves count and mean untouched.
    pub fn update(&mut self, grid: &Array2<f64>) -> Result<&Array2<f64>> {
        match self.mean {
            Some(ref mut mean) => {
                if mean.dim() != grid.dim() {
                    return Err(BulbError::ShapeMismatch {
                        expected: mean.dim(),
                        actual: grid.dim(),
                    });
                }
                let n = self.count as f64;
                let fold = move |m: &mut f64, &v: &f64| *m = (n * *m + v) / (n + 1.0);
                if mean.len() >= PARALLEL_PIXEL_THRESHOLD {
                    Zip::from(&mut *mean).and(grid).par_for_each(fold);
                } else {
                    Zip::from(&mut *mean).and(grid).for_each(fold);
                }
                self.count += 1;
                Ok(mean)
            }
            None => {
                self.count = 1;
                Ok(self.mean.insert(grid.clone()))
            }
        }
    }

    /// Absorb another accumulator, weighting each side by its count:
    /// `mean = (n_a * mean_a + n_b * mean_b) / (n_a + n_b)`.
    ///
    /// This is what lets callers split a stream into per-worker partitions
    /// and reduce the results afterwards. Merging an empty accumulator is a
    /// no-op; merging into an empty one adopts the other side wholesale.
    pub fn merge(&mut self, other: RunningMean) -> Result<()> {
        let Some(other_mean) = other.mean else {
            return Ok(());
        };
        match self.mean {
            Some(ref mut mean) => {
                if mean.dim() != other_mean.dim() {
                    return Err(BulbError::ShapeMismatch {
                        expected: mean.dim(),
                        actual: other_mean.dim(),
                    });
                }
                let n_self = self.count as f64;
                let n_other = other.count as f64;
                let total = n_self + n_other;
                let fold =
                    move |m: &mut f64, &o: &f64| *m = (n_self * *m + n_other * o) / total;
                if mean.len() >= PARALLEL_PIXEL_THRESHOLD {
                    Zip::from(&mut *mean).and(&other_mean).par_for_each(fold);
                } else {
                    Zip::from(&mut *mean).and(&other_mean).for_each(fold);
                }
                self.count += other.count;
            }
            None => {
                self.mean = Some(other_mean);
                self.count = other.count;
            }
        }
        Ok(())
    }

    /// The final mean, or `None` if no grid was ever submitted.
    pub fn finalize(self) -> Option<Array2<f64>> {
        self.mean
    }
}
