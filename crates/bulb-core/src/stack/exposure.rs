use crate::error::{BulbError, Result};
use crate::frame::{AverageImage, RgbFrame};
use crate::sample::FrameSampler;

use super::running_mean::RunningMean;

/// Streaming mean over an RGB frame sequence.
///
/// Owns one `RunningMean` per channel plus the sampler that decides which
/// frame indices participate. A frame is folded in whole or not at all:
/// the red update performs the shape check, and because the planes of one
/// frame share a shape by construction, the green and blue updates cannot
/// fail after red succeeded. The three counts therefore always agree.
pub struct ExposureStacker {
    sampler: FrameSampler,
    red: RunningMean,
    green: RunningMean,
    blue: RunningMean,
    bit_depth: u8,
}

impl ExposureStacker {
    pub fn new(sampler: FrameSampler) -> Self {
        Self {
            sampler,
            red: RunningMean::new(),
            green: RunningMean::new(),
            blue: RunningMean::new(),
            bit_depth: 8,
        }
    }

    /// Number of frames folded into the running means so far.
    pub fn frames_merged(&self) -> u64 {
        self.red.count()
    }

    /// Handle the frame pulled at `frame_index`.
    ///
    /// `None` records a frame that could not be decoded: the index is
    /// consumed, keeping the sampling pattern aligned with the capture
    /// timeline, but nothing is folded in. A present frame participates
    /// only when the sampler accepts its index.
    pub fn consume(&mut self, frame_index: usize, frame: Option<&RgbFrame>) -> Result<()> {
        let Some(frame) = frame else {
            return Ok(());
        };
        if !self.sampler.accepts(frame_index) {
            return Ok(());
        }
        if self.red.count() == 0 {
            self.bit_depth = frame.original_bit_depth;
        }
        self.red.update(&frame.red)?;
        self.green.update(&frame.green)?;
        self.blue.update(&frame.blue)?;
        Ok(())
    }

    /// Count-weighted combination with a stacker that consumed a disjoint
    /// partition of the same stream.
    pub fn merge(&mut self, other: ExposureStacker) -> Result<()> {
        if self.red.count() == 0 {
            self.bit_depth = other.bit_depth;
        }
        self.red.merge(other.red)?;
        self.green.merge(other.green)?;
        self.blue.merge(other.blue)?;
        Ok(())
    }

    /// Combine the three channel means into the final image.
    ///
    /// Fails with `NoFramesSelected` when nothing was ever folded in; the
    /// caller must surface that instead of writing a black image.
    pub fn finalize(self) -> Result<AverageImage> {
        let frames_merged = self.red.count();
        let (Some(red), Some(green), Some(blue)) = (
            self.red.finalize(),
            self.green.finalize(),
            self.blue.finalize(),
        ) else {
            return Err(BulbError::NoFramesSelected);
        };
        Ok(AverageImage {
            red,
            green,
            blue,
            frames_merged,
            original_bit_depth: self.bit_depth,
        })
    }
}
