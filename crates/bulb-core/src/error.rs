use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum BulbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid SER file: {0}")]
    InvalidSer(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Frame index {index} out of range (total: {total})")]
    FrameIndexOutOfRange { index: usize, total: usize },

    #[error("No frames found in {}", .0.display())]
    EmptyDirectory(PathBuf),

    #[error("Sampling step must be at least 1")]
    InvalidStep,

    #[error("Frame shape {actual:?} does not match established shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("No frames were selected from the input")]
    NoFramesSelected,

    #[error("Run cancelled")]
    Cancelled,

    #[error("Image format error: {0}")]
    Image(#[from] image::ImageError),
}

pub type Result<T> = std::result::Result<T, BulbError>;
