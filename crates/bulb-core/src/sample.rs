use crate::error::{BulbError, Result};

/// Decides which frame indices participate in the exposure.
///
/// A sampler with step `k` keeps indices 0, k, 2k, ... The index advances
/// once per frame pulled from the source, decoded or not, so the selection
/// pattern stays aligned with the capture timeline.
#[derive(Clone, Copy, Debug)]
pub struct FrameSampler {
    step: usize,
}

impl FrameSampler {
    /// Sampler keeping every `step`-th frame. A step of zero is rejected.
    pub fn new(step: usize) -> Result<Self> {
        if step == 0 {
            return Err(BulbError::InvalidStep);
        }
        Ok(Self { step })
    }

    /// Whether the frame at `frame_index` participates.
    pub fn accepts(&self, frame_index: usize) -> bool {
        frame_index % self.step == 0
    }

    pub fn step(&self) -> usize {
        self.step
    }
}

impl Default for FrameSampler {
    /// Every frame participates.
    fn default() -> Self {
        Self { step: 1 }
    }
}
