use ndarray::Array2;
use std::path::PathBuf;

use crate::error::{BulbError, Result};

/// A single decoded video frame, split into red/green/blue channel planes.
/// Pixel values are f64 in [0.0, 1.0], shape = (height, width).
///
/// The named fields carry the channel mapping: sources fill `red` with red
/// data regardless of the container's storage order, and the sink reads the
/// same named planes, so the mapping holds end to end.
#[derive(Clone, Debug)]
pub struct RgbFrame {
    pub red: Array2<f64>,
    pub green: Array2<f64>,
    pub blue: Array2<f64>,
    /// Original bit depth before conversion (8 or 16)
    pub original_bit_depth: u8,
    /// Optional per-frame metadata
    pub metadata: FrameMetadata,
}

impl RgbFrame {
    /// Build a frame from three channel planes. The planes must share one
    /// shape; a mismatch is rejected here rather than surfacing later as a
    /// torn accumulator.
    pub fn new(
        red: Array2<f64>,
        green: Array2<f64>,
        blue: Array2<f64>,
        bit_depth: u8,
    ) -> Result<Self> {
        if red.dim() != green.dim() {
            return Err(BulbError::ShapeMismatch {
                expected: red.dim(),
                actual: green.dim(),
            });
        }
        if red.dim() != blue.dim() {
            return Err(BulbError::ShapeMismatch {
                expected: red.dim(),
                actual: blue.dim(),
            });
        }
        Ok(Self {
            red,
            green,
            blue,
            original_bit_depth: bit_depth,
            metadata: FrameMetadata::default(),
        })
    }

    /// Build a gray frame by replicating one plane across all channels.
    pub fn from_gray(plane: Array2<f64>, bit_depth: u8) -> Self {
        Self {
            red: plane.clone(),
            green: plane.clone(),
            blue: plane,
            original_bit_depth: bit_depth,
            metadata: FrameMetadata::default(),
        }
    }

    pub fn width(&self) -> usize {
        self.red.ncols()
    }

    pub fn height(&self) -> usize {
        self.red.nrows()
    }

    /// Plane shape as (height, width).
    pub fn dimensions(&self) -> (usize, usize) {
        self.red.dim()
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
    pub timestamp_us: Option<u64>,
}

/// Per-pixel mean of every merged frame, one plane per channel.
#[derive(Clone, Debug)]
pub struct AverageImage {
    pub red: Array2<f64>,
    pub green: Array2<f64>,
    pub blue: Array2<f64>,
    /// Number of frames folded into the mean.
    pub frames_merged: u64,
    pub original_bit_depth: u8,
}

impl AverageImage {
    pub fn width(&self) -> usize {
        self.red.ncols()
    }

    pub fn height(&self) -> usize {
        self.red.nrows()
    }
}

/// Color/Bayer mode of the source data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorMode {
    Mono,
    BayerRGGB,
    BayerGRBG,
    BayerGBRG,
    BayerBGGR,
    RGB,
    BGR,
}

/// Metadata about the source file.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub path: PathBuf,
    /// Advisory frame count; may overstate what a damaged capture holds.
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_mode: ColorMode,
    pub observer: Option<String>,
    pub telescope: Option<String>,
    pub instrument: Option<String>,
    /// Wall-clock span between first and last frame timestamps, when the
    /// container records them.
    pub capture_duration_us: Option<u64>,
}
