use std::io::Write;

use tempfile::NamedTempFile;

use bulb_core::error::BulbError;
use bulb_core::frame::ColorMode;
use bulb_core::source::{FramePull, FrameSource, SerSource};

const SER_HEADER_SIZE: usize = 178;

fn ser_header(color_id: i32, width: u32, height: u32, depth: i32, frame_count: i32) -> Vec<u8> {
    let mut buf = Vec::new();
    buf.extend_from_slice(b"LUCAM-RECORDER");
    buf.extend_from_slice(&0i32.to_le_bytes()); // LuID
    buf.extend_from_slice(&color_id.to_le_bytes()); // ColorID
    buf.extend_from_slice(&0i32.to_le_bytes()); // LittleEndian
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&depth.to_le_bytes());
    buf.extend_from_slice(&frame_count.to_le_bytes());
    buf.extend_from_slice(&[0u8; 40]); // Observer
    buf.extend_from_slice(&[0u8; 40]); // Instrument
    buf.extend_from_slice(&[0u8; 40]); // Telescope
    buf.extend_from_slice(&0u64.to_le_bytes()); // DateTime
    buf.extend_from_slice(&0u64.to_le_bytes()); // DateTimeUTC
    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Mono 8-bit capture where every pixel of frame k has value `values[k]`.
fn build_mono_ser(width: u32, height: u32, values: &[u8]) -> Vec<u8> {
    let mut buf = ser_header(0, width, height, 8, values.len() as i32);
    for &v in values {
        buf.extend_from_slice(&vec![v; (width * height) as usize]);
    }
    buf
}

/// Interleaved color capture where every pixel of every frame is `triplet`
/// in storage order.
fn build_color_ser(color_id: i32, width: u32, height: u32, triplet: [u8; 3]) -> Vec<u8> {
    let mut buf = ser_header(color_id, width, height, 8, 1);
    for _ in 0..(width * height) {
        buf.extend_from_slice(&triplet);
    }
    buf
}

fn write_temp(bytes: &[u8]) -> NamedTempFile {
    let mut tmp = NamedTempFile::new().unwrap();
    tmp.write_all(bytes).unwrap();
    tmp
}

// ---------------------------------------------------------------------------
// Header parsing
// ---------------------------------------------------------------------------

#[test]
fn test_open_reads_header_fields() {
    let file = write_temp(&build_mono_ser(6, 4, &[10, 20]));
    let source = SerSource::open(file.path()).unwrap();

    assert_eq!(source.header.width, 6);
    assert_eq!(source.header.height, 4);
    assert_eq!(source.frame_count(), 2);
    assert_eq!(source.source_info().color_mode, ColorMode::Mono);
    assert_eq!(source.source_info().bit_depth, 8);
}

#[test]
fn test_open_rejects_bad_magic() {
    let mut bytes = build_mono_ser(4, 4, &[1]);
    bytes[0] = b'X';
    let file = write_temp(&bytes);
    match SerSource::open(file.path()) {
        Err(BulbError::InvalidSer(_)) => {}
        Err(other) => panic!("expected InvalidSer, got {other:?}"),
        Ok(_) => panic!("open should have failed"),
    }
}

#[test]
fn test_open_rejects_zero_dimensions() {
    let file = write_temp(&ser_header(0, 0, 4, 8, 1));
    match SerSource::open(file.path()) {
        Err(BulbError::InvalidDimensions { width, height }) => {
            assert_eq!((width, height), (0, 4));
        }
        Err(other) => panic!("expected InvalidDimensions, got {other:?}"),
        Ok(_) => panic!("open should have failed"),
    }
}

#[test]
fn test_open_rejects_undersized_file() {
    let file = write_temp(&[0u8; 60]);
    assert!(SerSource::open(file.path()).is_err());
}

#[test]
fn test_open_rejects_unsupported_pixel_depth() {
    let file = write_temp(&ser_header(0, 4, 4, 32, 1));
    assert!(SerSource::open(file.path()).is_err());
}

// ---------------------------------------------------------------------------
// Sequential pulling
// ---------------------------------------------------------------------------

#[test]
fn test_pull_sequence_then_end_of_stream() {
    let file = write_temp(&build_mono_ser(4, 2, &[0, 128, 255]));
    let mut source = SerSource::open(file.path()).unwrap();

    let expected = [0.0, 128.0 / 255.0, 1.0];
    for (i, want) in expected.iter().enumerate() {
        match source.next_frame().unwrap() {
            FramePull::Frame(frame) => {
                assert_eq!(frame.metadata.frame_index, i);
                assert!(
                    (frame.red[[0, 0]] - want).abs() < 1e-12,
                    "frame {i}: got {}, want {want}",
                    frame.red[[0, 0]]
                );
            }
            other => panic!("expected a frame at index {i}, got {other:?}"),
        }
    }
    assert!(matches!(
        source.next_frame().unwrap(),
        FramePull::EndOfStream
    ));
    // The cursor stays parked at the end.
    assert!(matches!(
        source.next_frame().unwrap(),
        FramePull::EndOfStream
    ));
}

#[test]
fn test_mono_replicates_across_channels() {
    let file = write_temp(&build_mono_ser(3, 3, &[100]));
    let mut source = SerSource::open(file.path()).unwrap();

    let FramePull::Frame(frame) = source.next_frame().unwrap() else {
        panic!("expected a frame");
    };
    let v = 100.0 / 255.0;
    assert!((frame.red[[1, 2]] - v).abs() < 1e-12);
    assert!((frame.green[[1, 2]] - v).abs() < 1e-12);
    assert!((frame.blue[[1, 2]] - v).abs() < 1e-12);
}

#[test]
fn test_zero_frame_capture_opens_and_ends_immediately() {
    let file = write_temp(&ser_header(0, 4, 4, 8, 0));
    let mut source = SerSource::open(file.path()).unwrap();
    assert!(matches!(
        source.next_frame().unwrap(),
        FramePull::EndOfStream
    ));
}

// ---------------------------------------------------------------------------
// Color decoding
// ---------------------------------------------------------------------------

#[test]
fn test_rgb_samples_land_in_named_planes() {
    let file = write_temp(&build_color_ser(100, 4, 4, [255, 128, 0]));
    let mut source = SerSource::open(file.path()).unwrap();

    let FramePull::Frame(frame) = source.next_frame().unwrap() else {
        panic!("expected a frame");
    };
    assert!((frame.red[[0, 0]] - 1.0).abs() < 1e-12);
    assert!((frame.green[[0, 0]] - 128.0 / 255.0).abs() < 1e-12);
    assert!((frame.blue[[0, 0]] - 0.0).abs() < 1e-12);
}

#[test]
fn test_bgr_samples_are_swizzled() {
    // Stored order is B, G, R; the named planes must still mean what they say.
    let file = write_temp(&build_color_ser(101, 4, 4, [255, 128, 0]));
    let mut source = SerSource::open(file.path()).unwrap();

    let FramePull::Frame(frame) = source.next_frame().unwrap() else {
        panic!("expected a frame");
    };
    assert!((frame.blue[[0, 0]] - 1.0).abs() < 1e-12);
    assert!((frame.green[[0, 0]] - 128.0 / 255.0).abs() < 1e-12);
    assert!((frame.red[[0, 0]] - 0.0).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// 16-bit samples
// ---------------------------------------------------------------------------

#[test]
fn test_sixteen_bit_samples_normalize_by_full_range() {
    let mut bytes = ser_header(0, 2, 2, 16, 1);
    for _ in 0..4 {
        bytes.extend_from_slice(&32768u16.to_le_bytes());
    }
    let file = write_temp(&bytes);
    let mut source = SerSource::open(file.path()).unwrap();

    let FramePull::Frame(frame) = source.next_frame().unwrap() else {
        panic!("expected a frame");
    };
    assert_eq!(frame.original_bit_depth, 16);
    assert!((frame.red[[0, 0]] - 32768.0 / 65535.0).abs() < 1e-12);
}

// ---------------------------------------------------------------------------
// Truncated captures
// ---------------------------------------------------------------------------

#[test]
fn test_truncated_capture_yields_absent_tail() {
    // Header declares 5 frames; only 3 are backed by bytes.
    let mut bytes = build_mono_ser(4, 4, &[10, 20, 30, 40, 50]);
    bytes.truncate(SER_HEADER_SIZE + 3 * 16);
    let file = write_temp(&bytes);
    let mut source = SerSource::open(file.path()).unwrap();

    assert_eq!(source.frame_count(), 5, "advisory count is the header's");
    assert_eq!(source.available_frames(), 3);

    let mut pulls = Vec::new();
    loop {
        match source.next_frame().unwrap() {
            FramePull::Frame(_) => pulls.push('F'),
            FramePull::Absent => pulls.push('A'),
            FramePull::EndOfStream => break,
        }
    }
    assert_eq!(pulls, vec!['F', 'F', 'F', 'A', 'A']);
}

#[test]
fn test_partial_last_frame_is_absent() {
    // The third frame is cut mid-way; it must not decode from garbage.
    let mut bytes = build_mono_ser(4, 4, &[10, 20, 30]);
    bytes.truncate(SER_HEADER_SIZE + 2 * 16 + 7);
    let file = write_temp(&bytes);
    let source = SerSource::open(file.path()).unwrap();
    assert_eq!(source.available_frames(), 2);
}

// ---------------------------------------------------------------------------
// Indexed reads
// ---------------------------------------------------------------------------

#[test]
fn test_read_frame_out_of_range() {
    let file = write_temp(&build_mono_ser(4, 4, &[1, 2]));
    let source = SerSource::open(file.path()).unwrap();
    match source.read_frame(2) {
        Err(BulbError::FrameIndexOutOfRange { index, total }) => {
            assert_eq!((index, total), (2, 2));
        }
        Err(other) => panic!("expected FrameIndexOutOfRange, got {other:?}"),
        Ok(_) => panic!("read should have failed"),
    }
}

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

#[test]
fn test_trailer_timestamps_supply_duration() {
    let mut bytes = build_mono_ser(2, 2, &[5, 6, 7]);
    for ts in [1_000_000u64, 1_500_000, 2_000_000] {
        bytes.extend_from_slice(&ts.to_le_bytes());
    }
    let file = write_temp(&bytes);
    let source = SerSource::open(file.path()).unwrap();

    assert_eq!(source.source_info().capture_duration_us, Some(1_000_000));
    let frame = source.read_frame(1).unwrap();
    assert_eq!(frame.metadata.timestamp_us, Some(1_500_000));
}

#[test]
fn test_missing_trailer_means_no_timestamps() {
    let file = write_temp(&build_mono_ser(2, 2, &[5, 6]));
    let source = SerSource::open(file.path()).unwrap();

    assert_eq!(source.source_info().capture_duration_us, None);
    assert_eq!(source.read_frame(0).unwrap().metadata.timestamp_us, None);
}
