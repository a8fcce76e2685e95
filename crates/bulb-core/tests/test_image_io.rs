use std::fs;

use ndarray::Array2;
use tempfile::tempdir;

use bulb_core::frame::AverageImage;
use bulb_core::io::image_io::save_average;

const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

fn flat_average(red: f64, green: f64, blue: f64) -> AverageImage {
    AverageImage {
        red: Array2::from_elem((3, 5), red),
        green: Array2::from_elem((3, 5), green),
        blue: Array2::from_elem((3, 5), blue),
        frames_merged: 4,
        original_bit_depth: 8,
    }
}

fn is_tiff(bytes: &[u8]) -> bool {
    bytes.starts_with(b"II") || bytes.starts_with(b"MM")
}

#[test]
fn test_png_stores_eight_bit_pixels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("average.png");
    // 0.5 * 255 = 127.5, truncation keeps it off the rounding cliff.
    save_average(&flat_average(0.0, 0.5, 1.0), &path).unwrap();

    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (5, 3));
    assert_eq!(img.get_pixel(0, 0).0, [0, 127, 255]);
}

#[test]
fn test_tiff_stores_sixteen_bit_pixels() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("average.tif");
    save_average(&flat_average(0.25, 0.5, 0.75), &path).unwrap();

    let img = image::open(&path).unwrap().to_rgb16();
    assert_eq!(img.dimensions(), (5, 3));
    assert_eq!(img.get_pixel(0, 0).0, [16383, 32767, 49151]);
}

#[test]
fn test_extension_picks_the_container() {
    let dir = tempdir().unwrap();
    let average = flat_average(0.5, 0.5, 0.5);

    let png_path = dir.path().join("out.png");
    save_average(&average, &png_path).unwrap();
    assert!(fs::read(&png_path).unwrap().starts_with(&PNG_MAGIC));

    let tif_path = dir.path().join("out.tif");
    save_average(&average, &tif_path).unwrap();
    assert!(is_tiff(&fs::read(&tif_path).unwrap()));

    let tiff_path = dir.path().join("out.tiff");
    save_average(&average, &tiff_path).unwrap();
    assert!(is_tiff(&fs::read(&tiff_path).unwrap()));
}

#[test]
fn test_unknown_extension_falls_back_to_tiff() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("out.raw");
    save_average(&flat_average(0.5, 0.5, 0.5), &path).unwrap();
    assert!(is_tiff(&fs::read(&path).unwrap()));
}

#[test]
fn test_out_of_range_values_are_clamped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("average.png");
    save_average(&flat_average(-0.5, 0.5, 1.5), &path).unwrap();

    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.get_pixel(2, 1).0, [0, 127, 255]);
}
