pub mod image_seq;
pub mod ser;

use std::path::Path;

use crate::error::Result;
use crate::frame::{RgbFrame, SourceInfo};

pub use image_seq::ImageSequenceSource;
pub use ser::SerSource;

/// Outcome of pulling the next frame from a source.
#[derive(Debug)]
pub enum FramePull {
    /// A decoded frame.
    Frame(RgbFrame),
    /// The frame at this index belongs to the timeline but could not be
    /// produced; the index is consumed.
    Absent,
    /// The source has no more frames.
    EndOfStream,
}

/// An ordered, stateful stream of decoded video frames.
///
/// Implementations release their underlying handle on drop, so the driver
/// gets scoped acquisition on every exit path for free.
pub trait FrameSource {
    /// Metadata captured when the source was opened.
    fn source_info(&self) -> &SourceInfo;

    /// Advisory frame count for progress display. May be zero or overstated
    /// for damaged containers; `next_frame` is the only authority on what
    /// the stream actually yields.
    fn frame_count(&self) -> usize;

    /// Pull the frame at the current cursor and advance it.
    fn next_frame(&mut self) -> Result<FramePull>;
}

/// Open the frame source matching `path`: a directory is read as an image
/// sequence, anything else as a SER capture file.
pub fn open_source(path: &Path) -> Result<Box<dyn FrameSource>> {
    if path.is_dir() {
        Ok(Box::new(ImageSequenceSource::open(path)?))
    } else {
        Ok(Box::new(SerSource::open(path)?))
    }
}
