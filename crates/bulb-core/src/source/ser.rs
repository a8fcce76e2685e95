use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array2;
use tracing::warn;

use crate::error::{BulbError, Result};
use crate::frame::{ColorMode, FrameMetadata, RgbFrame, SourceInfo};

use super::{FramePull, FrameSource};

const SER_HEADER_SIZE: usize = 178;
const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    /// Bytes per pixel sample (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_sample(&self) -> usize {
        if self.pixel_depth <= 8 {
            1
        } else {
            2
        }
    }

    /// Number of samples per pixel (1 for mono/bayer, 3 for RGB/BGR).
    pub fn samples_per_pixel(&self) -> usize {
        match self.color_id {
            100 | 101 => 3,
            _ => 1,
        }
    }

    /// Total bytes per frame. Header dimensions are validated at parse, so
    /// overflow here means a deliberately hostile file.
    pub fn frame_byte_size(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|px| px.checked_mul(self.bytes_per_sample() * self.samples_per_pixel()))
            .ok_or_else(|| BulbError::InvalidSer("Frame size calculation overflow".into()))
    }

    pub fn color_mode(&self) -> ColorMode {
        match self.color_id {
            0 => ColorMode::Mono,
            8 => ColorMode::BayerRGGB,
            9 => ColorMode::BayerGRBG,
            10 => ColorMode::BayerGBRG,
            11 => ColorMode::BayerBGGR,
            100 => ColorMode::RGB,
            101 => ColorMode::BGR,
            _ => ColorMode::Mono,
        }
    }
}

/// Memory-mapped SER capture used as a sequential frame source.
///
/// The header's frame count is advisory: a recorder crash leaves a file
/// with fewer frames than the header promises. Opening such a file works;
/// pulls inside the advisory count but beyond the mapped bytes yield
/// `FramePull::Absent`, keeping downstream sampling aligned with the
/// intended capture timeline.
pub struct SerSource {
    mmap: Mmap,
    pub header: SerHeader,
    info: SourceInfo,
    frame_size: usize,
    /// Frames actually backed by bytes in the file.
    available: usize,
    cursor: usize,
}

impl SerSource {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(BulbError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }

        if &mmap[0..14] != SER_MAGIC {
            return Err(BulbError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;
        let frame_size = header.frame_byte_size()?;

        let data_len = mmap.len() - SER_HEADER_SIZE;
        let available = (data_len / frame_size).min(header.frame_count as usize);
        if available < header.frame_count as usize {
            warn!(
                declared = header.frame_count,
                available, "SER header declares more frames than the file holds"
            );
        }

        let capture_duration_us = capture_duration(&mmap, &header, frame_size, available);
        let info = SourceInfo {
            path: path.to_path_buf(),
            total_frames: header.frame_count as usize,
            width: header.width,
            height: header.height,
            bit_depth: header.pixel_depth as u8,
            color_mode: header.color_mode(),
            observer: non_empty(&header.observer),
            telescope: non_empty(&header.telescope),
            instrument: non_empty(&header.instrument),
            capture_duration_us,
        };

        Ok(Self {
            mmap,
            header,
            info,
            frame_size,
            available,
            cursor: 0,
        })
    }

    /// Frames actually backed by file bytes; at most the header count.
    pub fn available_frames(&self) -> usize {
        self.available
    }

    /// Decode the frame at `index`, converting samples to f64 in [0.0, 1.0].
    pub fn read_frame(&self, index: usize) -> Result<RgbFrame> {
        if index >= self.available {
            return Err(BulbError::FrameIndexOutOfRange {
                index,
                total: self.available,
            });
        }
        let offset = SER_HEADER_SIZE + index * self.frame_size;
        let raw = &self.mmap[offset..offset + self.frame_size];

        let mut frame = decode_frame(raw, &self.header)?;
        frame.metadata = FrameMetadata {
            frame_index: index,
            timestamp_us: self.read_timestamp(index),
        };
        Ok(frame)
    }

    /// Read a per-frame timestamp from the optional trailer.
    fn read_timestamp(&self, index: usize) -> Option<u64> {
        read_trailer_timestamp(&self.mmap, &self.header, self.frame_size, index)
    }
}

impl FrameSource for SerSource {
    fn source_info(&self) -> &SourceInfo {
        &self.info
    }

    fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    fn next_frame(&mut self) -> Result<FramePull> {
        if self.cursor >= self.header.frame_count as usize {
            return Ok(FramePull::EndOfStream);
        }
        let index = self.cursor;
        self.cursor += 1;

        if index >= self.available {
            // Truncated capture: the timeline slot exists, the bytes do not.
            return Ok(FramePull::Absent);
        }
        Ok(FramePull::Frame(self.read_frame(index)?))
    }
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()? as u32;
    let height = cursor.read_i32::<LittleEndian>()? as u32;
    let pixel_depth = cursor.read_i32::<LittleEndian>()? as u32;
    let frame_count = cursor.read_i32::<LittleEndian>()?;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    let mut cursor = std::io::Cursor::new(&buf[162..]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if width == 0 || height == 0 {
        return Err(BulbError::InvalidDimensions { width, height });
    }
    if pixel_depth == 0 || pixel_depth > 16 {
        return Err(BulbError::InvalidSer(format!(
            "Unsupported pixel depth: {pixel_depth}"
        )));
    }
    if frame_count < 0 {
        return Err(BulbError::InvalidSer(format!(
            "Negative frame count: {frame_count}"
        )));
    }

    // SER spec: LittleEndian field = 0 means big-endian pixel data,
    // but many writers (including FireCapture) use 0 for little-endian.
    // Follow Siril's convention: treat 0 as little-endian.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width,
        height,
        pixel_depth,
        frame_count: frame_count as u32,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

/// Timestamp for `index` from the trailer after the frame data, 8 bytes LE
/// per frame. The trailer sits past the full declared frame block, so a
/// truncated capture has none.
fn read_trailer_timestamp(
    mmap: &Mmap,
    header: &SerHeader,
    frame_size: usize,
    index: usize,
) -> Option<u64> {
    let trailer_offset =
        SER_HEADER_SIZE.checked_add(frame_size.checked_mul(header.frame_count as usize)?)?;
    let ts_offset = trailer_offset.checked_add(index.checked_mul(8)?)?;
    if ts_offset + 8 <= mmap.len() {
        let mut bytes = &mmap[ts_offset..ts_offset + 8];
        bytes.read_u64::<LittleEndian>().ok()
    } else {
        None
    }
}

/// Span between the first and last available frame timestamps.
fn capture_duration(
    mmap: &Mmap,
    header: &SerHeader,
    frame_size: usize,
    available: usize,
) -> Option<u64> {
    if available < 2 {
        return None;
    }
    let first = read_trailer_timestamp(mmap, header, frame_size, 0)?;
    let last = read_trailer_timestamp(mmap, header, frame_size, available - 1)?;
    last.checked_sub(first)
}

/// Decode one raw frame into channel planes.
///
/// Interleaved RGB (color ID 100) and BGR (101) fill all three planes in a
/// single pass; BGR is swizzled here so `red` always holds red. Mono and
/// raw Bayer mosaics decode the single plane and replicate it, with no
/// debayering: the average of a gray capture stays gray.
fn decode_frame(raw: &[u8], header: &SerHeader) -> Result<RgbFrame> {
    let h = header.height as usize;
    let w = header.width as usize;
    let bps = header.bytes_per_sample();
    let max_val = ((1u32 << header.pixel_depth) - 1) as f64;
    let depth = header.pixel_depth as u8;

    if header.samples_per_pixel() == 3 {
        let mut red = Array2::<f64>::zeros((h, w));
        let mut green = Array2::<f64>::zeros((h, w));
        let mut blue = Array2::<f64>::zeros((h, w));
        let stride = 3 * bps;

        for row in 0..h {
            for col in 0..w {
                let base = (row * w + col) * stride;
                let s0 = read_sample(raw, base, bps, header.little_endian) / max_val;
                let s1 = read_sample(raw, base + bps, bps, header.little_endian) / max_val;
                let s2 = read_sample(raw, base + 2 * bps, bps, header.little_endian) / max_val;
                let (r, g, b) = if header.color_id == 101 {
                    (s2, s1, s0)
                } else {
                    (s0, s1, s2)
                };
                red[[row, col]] = r;
                green[[row, col]] = g;
                blue[[row, col]] = b;
            }
        }
        RgbFrame::new(red, green, blue, depth)
    } else {
        let mut plane = Array2::<f64>::zeros((h, w));
        for row in 0..h {
            for col in 0..w {
                let idx = (row * w + col) * bps;
                plane[[row, col]] = read_sample(raw, idx, bps, header.little_endian) / max_val;
            }
        }
        Ok(RgbFrame::from_gray(plane, depth))
    }
}

fn read_sample(raw: &[u8], idx: usize, bytes_per_sample: usize, little_endian: bool) -> f64 {
    if bytes_per_sample == 1 {
        raw[idx] as f64
    } else {
        let pair = [raw[idx], raw[idx + 1]];
        if little_endian {
            u16::from_le_bytes(pair) as f64
        } else {
            u16::from_be_bytes(pair) as f64
        }
    }
}
