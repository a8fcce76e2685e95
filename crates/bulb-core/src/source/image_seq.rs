use std::fs;
use std::path::{Path, PathBuf};

use ndarray::Array2;
use tracing::warn;

use crate::consts::RASTER_EXTENSIONS;
use crate::error::{BulbError, Result};
use crate::frame::{ColorMode, FrameMetadata, RgbFrame, SourceInfo};

use super::{FramePull, FrameSource};

/// Frame source over a directory of still images, the usual
/// extract-then-average workflow (`ffmpeg -i clip.mp4 frames/%05d.png`).
///
/// Files are ordered lexicographically, so zero-padded names preserve the
/// capture order. A file that fails to decode becomes an absent frame, not
/// a stream error; its timeline slot is still consumed.
pub struct ImageSequenceSource {
    paths: Vec<PathBuf>,
    info: SourceInfo,
    cursor: usize,
}

impl ImageSequenceSource {
    /// Scan `dir` for raster files. A directory without any is rejected.
    pub fn open(dir: &Path) -> Result<Self> {
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_raster_extension(p))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(BulbError::EmptyDirectory(dir.to_path_buf()));
        }

        // Dimensions are display metadata; take them from the first
        // readable file without decoding pixel data.
        let mut width = 0;
        let mut height = 0;
        for path in &paths {
            if let Ok((w, h)) = image::image_dimensions(path) {
                width = w;
                height = h;
                break;
            }
        }

        let info = SourceInfo {
            path: dir.to_path_buf(),
            total_frames: paths.len(),
            width,
            height,
            bit_depth: 8,
            color_mode: ColorMode::RGB,
            observer: None,
            telescope: None,
            instrument: None,
            capture_duration_us: None,
        };

        Ok(Self {
            paths,
            info,
            cursor: 0,
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn source_info(&self) -> &SourceInfo {
        &self.info
    }

    fn frame_count(&self) -> usize {
        self.paths.len()
    }

    fn next_frame(&mut self) -> Result<FramePull> {
        let Some(path) = self.paths.get(self.cursor) else {
            return Ok(FramePull::EndOfStream);
        };
        let index = self.cursor;
        self.cursor += 1;

        let img = match image::open(path) {
            Ok(img) => img,
            Err(err) => {
                warn!(
                    file = %path.display(),
                    error = %err,
                    "Skipping frame that failed to decode"
                );
                return Ok(FramePull::Absent);
            }
        };

        let rgb = img.to_rgb8();
        let (w, h) = rgb.dimensions();
        let mut red = Array2::<f64>::zeros((h as usize, w as usize));
        let mut green = Array2::<f64>::zeros((h as usize, w as usize));
        let mut blue = Array2::<f64>::zeros((h as usize, w as usize));

        for (x, y, pixel) in rgb.enumerate_pixels() {
            let [r, g, b] = pixel.0;
            red[[y as usize, x as usize]] = r as f64 / 255.0;
            green[[y as usize, x as usize]] = g as f64 / 255.0;
            blue[[y as usize, x as usize]] = b as f64 / 255.0;
        }

        let mut frame = RgbFrame::new(red, green, blue, 8)?;
        frame.metadata = FrameMetadata {
            frame_index: index,
            timestamp_us: None,
        };
        Ok(FramePull::Frame(frame))
    }
}

fn has_raster_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let lower = e.to_ascii_lowercase();
            RASTER_EXTENSIONS.iter().any(|known| *known == lower)
        })
        .unwrap_or(false)
}
