use std::path::Path;

use image::{ImageFormat, Rgb};

use crate::error::Result;
use crate::frame::AverageImage;

/// Save an average image as 8-bit RGB PNG.
pub fn save_png(image: &AverageImage, path: &Path) -> Result<()> {
    let h = image.height();
    let w = image.width();

    let mut img = image::RgbImage::new(w as u32, h as u32);
    for row in 0..h {
        for col in 0..w {
            let r = quantize_u8(image.red[[row, col]]);
            let g = quantize_u8(image.green[[row, col]]);
            let b = quantize_u8(image.blue[[row, col]]);
            img.put_pixel(col as u32, row as u32, Rgb([r, g, b]));
        }
    }

    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Save an average image as 16-bit RGB TIFF.
pub fn save_tiff(image: &AverageImage, path: &Path) -> Result<()> {
    let h = image.height();
    let w = image.width();

    let mut pixels: Vec<u16> = Vec::with_capacity(h * w * 3);
    for row in 0..h {
        for col in 0..w {
            pixels.push(quantize_u16(image.red[[row, col]]));
            pixels.push(quantize_u16(image.green[[row, col]]));
            pixels.push(quantize_u16(image.blue[[row, col]]));
        }
    }

    let img = image::ImageBuffer::<Rgb<u16>, Vec<u16>>::from_raw(w as u32, h as u32, pixels)
        .expect("buffer size matches dimensions");
    img.save_with_format(path, ImageFormat::Tiff)?;
    Ok(())
}

/// Save an average image, choosing format from the file extension. Unknown
/// extensions get TIFF bytes, keeping the 16-bit depth.
pub fn save_average(image: &AverageImage, path: &Path) -> Result<()> {
    match path.extension().and_then(|e| e.to_str()) {
        Some("png") => save_png(image, path),
        Some("tiff" | "tif") => save_tiff(image, path),
        _ => save_tiff(image, path),
    }
}

// Means of in-range samples stay in [0, 1]; the clamp only guards float
// drift before the cast truncates.
fn quantize_u8(value: f64) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0) as u8
}

fn quantize_u16(value: f64) -> u16 {
    (value.clamp(0.0, 1.0) * 65535.0) as u16
}
