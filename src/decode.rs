//! Bitmap decoding and upload normalisation

use image::imageops::FilterType;
use image::RgbaImage;
use std::path::Path;
use thiserror::Error;

/// Uploads wider than this are downscaled before any processing
pub const MAX_UPLOAD_WIDTH: u32 = 1024;

/// Error type for bitmaps that fail to load
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    /// The file could not be read
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// The bytes are not a supported image
    #[error("failed to decode image: {0}")]
    Image(#[from] image::ImageError),
}

/// Decode PNG/JPEG/GIF bytes into an RGBA bitmap.
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    log::debug!("decoded {}x{} bitmap ({} bytes)", image.width(), image.height(), bytes.len());
    Ok(image)
}

/// Read and decode an image file.
pub fn decode_file(path: &Path) -> Result<RgbaImage, DecodeError> {
    let bytes = std::fs::read(path)
        .map_err(|source| DecodeError::Io { path: path.display().to_string(), source })?;
    decode_bytes(&bytes)
}

/// Scale an image down proportionally so it is at most `max_width` wide.
///
/// Narrower images are returned untouched. The new height is rounded and
/// never drops below one pixel.
pub fn limit_width(image: RgbaImage, max_width: u32) -> RgbaImage {
    let (width, height) = image.dimensions();
    if max_width == 0 || width <= max_width {
        return image;
    }

    let scaled_height = ((height as f64 * max_width as f64 / width as f64).round() as u32).max(1);
    log::info!("downscaling {}x{} upload to {}x{}", width, height, max_width, scaled_height);
    image::imageops::resize(&image, max_width, scaled_height, FilterType::Nearest)
}

/// Decode an uploaded file and apply the 1024px width limit.
pub fn prepare_upload(bytes: &[u8]) -> Result<RgbaImage, DecodeError> {
    Ok(limit_width(decode_bytes(bytes)?, MAX_UPLOAD_WIDTH))
}
