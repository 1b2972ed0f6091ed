//! Data models shared by the pipeline, importer, palette and tilemap

use image::RgbaImage;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::output::{png_data_url, OutputError};

/// Length of generated ids
const ID_LEN: usize = 13;

const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Generate a fresh opaque id (13 base-36 characters).
pub fn generate_id() -> String {
    let mut rng = rand::thread_rng();
    (0..ID_LEN).map(|_| ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())] as char).collect()
}

/// A single square bitmap placeable on the grid.
///
/// Cloning a tile shares its bitmap; identity is the `id`.
#[derive(Debug, Clone)]
pub struct Tile {
    pub id: String,
    pub image: Arc<RgbaImage>,
    pub width: u32,
    pub height: u32,
}

impl Tile {
    /// Wrap a bitmap as a new tile with a fresh id.
    pub fn new(image: RgbaImage) -> Self {
        Self::with_id(generate_id(), Arc::new(image))
    }

    pub fn with_id(id: String, image: Arc<RgbaImage>) -> Self {
        let (width, height) = image.dimensions();
        Self { id, image, width, height }
    }

    /// The tile bitmap as a `data:image/png;base64,...` URL.
    pub fn image_url(&self) -> Result<String, OutputError> {
        png_data_url(&self.image)
    }
}

impl PartialEq for Tile {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Output unit of the extraction pipeline and the palette importer.
///
/// Keeps the bitmap it was cut from as provenance.
#[derive(Debug, Clone)]
pub struct ProcessedImage {
    pub id: String,
    pub original: Arc<RgbaImage>,
    pub processed: Arc<RgbaImage>,
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
}

impl ProcessedImage {
    pub fn new(original: Arc<RgbaImage>, processed: RgbaImage, tile_size: u32) -> Self {
        let (width, height) = processed.dimensions();
        Self {
            id: generate_id(),
            original,
            processed: Arc::new(processed),
            width,
            height,
            tile_size,
        }
    }

    pub fn original_url(&self) -> Result<String, OutputError> {
        png_data_url(&self.original)
    }

    pub fn processed_url(&self) -> Result<String, OutputError> {
        png_data_url(&self.processed)
    }

    /// The tile a palette selection places on the grid (same id, shared bitmap).
    pub fn to_tile(&self) -> Tile {
        Tile::with_id(self.id.clone(), Arc::clone(&self.processed))
    }
}

/// Top-left corner of the crop square, in source pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropStart {
    pub x: i64,
    pub y: i64,
}

/// Geometry for one run of the extraction pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageProcessingOptions {
    pub crop_start: CropStart,
    /// Side of the crop square in source space
    pub crop_size: u32,
    /// Clockwise degrees; right angles are pixel-exact, anything else is resampled
    pub rotation: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Side of the output raster
    pub output_size: u32,
    pub split_into_tiles: bool,
    /// Side of each sub-tile when splitting
    pub tile_size: u32,
}

impl Default for ImageProcessingOptions {
    fn default() -> Self {
        Self {
            crop_start: CropStart::default(),
            crop_size: 0,
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
            output_size: 32,
            split_into_tiles: false,
            tile_size: 32,
        }
    }
}

impl ImageProcessingOptions {
    /// Options for a freshly loaded image: the largest centered square,
    /// output at the same size.
    pub fn centered(width: u32, height: u32) -> Self {
        let size = width.min(height);
        Self {
            crop_start: CropStart {
                x: ((width - size) / 2) as i64,
                y: ((height - size) / 2) as i64,
            },
            crop_size: size,
            output_size: size,
            ..Self::default()
        }
    }

    /// Snap the crop back to the image origin, keeping the other settings.
    pub fn fit_to_image(&mut self, width: u32, height: u32) {
        let size = width.min(height);
        self.crop_start = CropStart::default();
        self.crop_size = size;
        self.output_size = size;
    }

    /// Number of sub-tiles per axis when splitting (remainder discarded).
    pub fn tiles_per_axis(&self) -> u32 {
        if self.tile_size == 0 {
            0
        } else {
            self.output_size / self.tile_size
        }
    }
}
