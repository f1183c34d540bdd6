use image::imageops::FilterType;
use image::{DynamicImage, GrayImage};
use std::io::Cursor;
use thiserror::Error;

/// Longest side handed to the OCR engine. Tesseract reads best around
/// 300 DPI, which puts a phone photo of an A4 sheet near this size.
pub const DEFAULT_MAX_SIDE: u32 = 2800;

#[derive(Debug, Error)]
pub enum PreprocessError {
    #[error("Failed to load image: {0}")]
    Load(#[from] image::ImageError),
    #[error("Failed to encode processed image: {0}")]
    Encode(String),
}

/// Decodes an uploaded photo (JPEG / PNG / WEBP / …), normalizes it for text
/// recognition and returns PNG bytes.
pub fn prepare_for_ocr(data: &[u8], max_side: u32) -> Result<Vec<u8>, PreprocessError> {
    let img = image::load_from_memory(data)?;
    let gray = stretch_contrast(to_gray_within(img, max_side));
    encode_png(DynamicImage::ImageLuma8(gray))
}

fn to_gray_within(img: DynamicImage, max_side: u32) -> GrayImage {
    let img = if img.width().max(img.height()) > max_side {
        img.resize(max_side, max_side, FilterType::Lanczos3)
    } else {
        img
    };
    img.to_luma8()
}

/// Linear stretch of the luminance range to 0..=255. Flat images are left
/// as they are.
fn stretch_contrast(mut gray: GrayImage) -> GrayImage {
    let Some(lo) = gray.pixels().map(|p| p[0]).min() else {
        return gray;
    };
    let hi = gray.pixels().map(|p| p[0]).max().unwrap_or(lo);
    if hi == lo {
        return gray;
    }

    let span = u32::from(hi - lo);
    for px in gray.pixels_mut() {
        px[0] = (u32::from(px[0] - lo) * 255 / span) as u8;
    }
    gray
}

fn encode_png(img: DynamicImage) -> Result<Vec<u8>, PreprocessError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .map_err(|e| PreprocessError::Encode(e.to_string()))?;
    Ok(buf)
}
