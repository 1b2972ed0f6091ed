//! Tile extraction pipeline
//!
//! Turns an arbitrary bitmap into fixed-size square tiles:
//! crop → rotate/flip → resize → optional grid split.
//!
//! The geometry follows a 2D canvas: the output raster's coordinate space is
//! transformed (translate center to origin, rotate clockwise, mirror, translate
//! back) and the crop square is then drawn scaled to fill the raster. Each
//! output pixel is produced by mapping its center back through that transform
//! and sampling the source nearest-neighbor.

use image::{Rgba, RgbaImage};
use std::sync::Arc;
use thiserror::Error;

use crate::decode::{decode_bytes, DecodeError};
use crate::models::{ImageProcessingOptions, ProcessedImage};

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Error type for extraction failures
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// The source bitmap could not be decoded
    #[error(transparent)]
    Decode(#[from] DecodeError),
    /// Output or tile size is zero
    #[error("invalid {field}: must be a positive integer")]
    InvalidSize { field: &'static str },
    /// Rotation is NaN or infinite
    #[error("invalid rotation {0}: must be a finite number of degrees")]
    InvalidRotation(f32),
}

/// The inverse of the output-space transform.
#[derive(Debug, Clone, Copy)]
struct InverseTransform {
    cos: f64,
    sin: f64,
    mirror_x: f64,
    mirror_y: f64,
    center: f64,
}

impl InverseTransform {
    fn new(options: &ImageProcessingOptions) -> Self {
        let (cos, sin) = rotation_cos_sin(options.rotation);
        Self {
            cos,
            sin,
            mirror_x: if options.flip_x { -1.0 } else { 1.0 },
            mirror_y: if options.flip_y { -1.0 } else { 1.0 },
            center: options.output_size as f64 / 2.0,
        }
    }

    /// Map an output-raster point back to the drawing space of the crop.
    fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        let dx = x - self.center;
        let dy = y - self.center;
        // undo the rotation, then the mirror (forward order is mirror then rotate)
        let rx = dx * self.cos + dy * self.sin;
        let ry = -dx * self.sin + dy * self.cos;
        (rx * self.mirror_x + self.center, ry * self.mirror_y + self.center)
    }
}

/// Cosine and sine of a clockwise rotation in degrees.
///
/// Right angles return exact values so quarter turns stay pixel-exact.
fn rotation_cos_sin(degrees: f32) -> (f64, f64) {
    let degrees = (degrees as f64).rem_euclid(360.0);
    let quarter = degrees / 90.0;
    if (quarter - quarter.round()).abs() < 1e-9 {
        return match quarter.round() as u32 % 4 {
            0 => (1.0, 0.0),
            1 => (0.0, 1.0),
            2 => (-1.0, 0.0),
            _ => (0.0, -1.0),
        };
    }
    let radians = degrees.to_radians();
    (radians.cos(), radians.sin())
}

fn validate(options: &ImageProcessingOptions) -> Result<(), PipelineError> {
    if options.output_size == 0 {
        return Err(PipelineError::InvalidSize { field: "output_size" });
    }
    if options.split_into_tiles && options.tile_size == 0 {
        return Err(PipelineError::InvalidSize { field: "tile_size" });
    }
    if !options.rotation.is_finite() {
        return Err(PipelineError::InvalidRotation(options.rotation));
    }
    Ok(())
}

/// Render the transformed `output_size × output_size` raster.
///
/// Pixels that map outside the crop square, or outside the source bitmap,
/// are left transparent.
pub fn render(source: &RgbaImage, options: &ImageProcessingOptions) -> Result<RgbaImage, PipelineError> {
    validate(options)?;

    let size = options.output_size;
    let mut raster = RgbaImage::from_pixel(size, size, TRANSPARENT);
    if options.crop_size == 0 {
        log::warn!("crop size is zero, producing an empty raster");
        return Ok(raster);
    }

    let inverse = InverseTransform::new(options);
    let scale = options.crop_size as f64 / size as f64;
    let extent = size as f64;
    let (source_w, source_h) = (source.width() as i64, source.height() as i64);

    log::debug!(
        "render crop ({}, {}) size {} -> {}px, rotation {}, flip ({}, {})",
        options.crop_start.x,
        options.crop_start.y,
        options.crop_size,
        size,
        options.rotation,
        options.flip_x,
        options.flip_y
    );

    for (x, y, pixel) in raster.enumerate_pixels_mut() {
        let (px, py) = inverse.apply(x as f64 + 0.5, y as f64 + 0.5);
        if px < 0.0 || py < 0.0 || px >= extent || py >= extent {
            continue;
        }

        let sx = options.crop_start.x + (px * scale).floor() as i64;
        let sy = options.crop_start.y + (py * scale).floor() as i64;
        if sx < 0 || sy < 0 || sx >= source_w || sy >= source_h {
            continue;
        }

        *pixel = *source.get_pixel(sx as u32, sy as u32);
    }

    Ok(raster)
}

/// Run the pipeline over a shared source bitmap.
///
/// Without splitting, the single result keeps the source as its original.
/// When splitting, every tile keeps the full transformed raster instead and
/// tiles come out row by row.
pub fn extract_shared(
    source: Arc<RgbaImage>,
    options: &ImageProcessingOptions,
) -> Result<Vec<ProcessedImage>, PipelineError> {
    let raster = render(&source, options)?;

    if !options.split_into_tiles {
        let size = options.output_size;
        return Ok(vec![ProcessedImage::new(source, raster, size)]);
    }

    let tile_size = options.tile_size;
    let count = options.tiles_per_axis();
    let raster = Arc::new(raster);
    let mut tiles = Vec::with_capacity(count as usize * count as usize);

    for y in 0..count {
        for x in 0..count {
            let cell =
                image::imageops::crop_imm(&*raster, x * tile_size, y * tile_size, tile_size, tile_size)
                    .to_image();
            tiles.push(ProcessedImage::new(Arc::clone(&raster), cell, tile_size));
        }
    }

    log::info!("split {}px output into {} tiles of {}px", options.output_size, tiles.len(), tile_size);
    Ok(tiles)
}

/// Run the pipeline over a borrowed source bitmap.
pub fn extract(source: &RgbaImage, options: &ImageProcessingOptions) -> Result<Vec<ProcessedImage>, PipelineError> {
    extract_shared(Arc::new(source.clone()), options)
}

/// Decode an encoded bitmap and run the pipeline over it.
pub fn extract_bytes(bytes: &[u8], options: &ImageProcessingOptions) -> Result<Vec<ProcessedImage>, PipelineError> {
    let source = decode_bytes(bytes)?;
    extract_shared(Arc::new(source), options)
}
