//! Configuration schema types for `tilekit.toml`
//!
//! Every section is optional; a missing file or section falls back to the
//! editor defaults.

use serde::{Deserialize, Serialize};

use crate::decode::MAX_UPLOAD_WIDTH;
use crate::models::ImageProcessingOptions;
use crate::spritesheet::DEFAULT_SPACING;
use crate::tilemap::{DEFAULT_MAP_HEIGHT, DEFAULT_MAP_NAME, DEFAULT_MAP_WIDTH, DEFAULT_TILE_SIZE};

/// Extraction pipeline defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessConfig {
    /// Output raster side; when unset, matches the crop size
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_size: Option<u32>,
    /// Sub-tile side when splitting
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Clockwise rotation in degrees
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub flip_x: bool,
    #[serde(default)]
    pub flip_y: bool,
    /// Split the output into `tile_size` tiles
    #[serde(default)]
    pub split: bool,
}

impl Default for ProcessConfig {
    fn default() -> Self {
        Self {
            output_size: None,
            tile_size: default_tile_size(),
            rotation: 0.0,
            flip_x: false,
            flip_y: false,
            split: false,
        }
    }
}

impl ProcessConfig {
    /// Copy these defaults onto options whose crop is already resolved.
    pub fn apply_to(&self, options: &mut ImageProcessingOptions) {
        if let Some(size) = self.output_size {
            options.output_size = size;
        }
        options.tile_size = self.tile_size;
        options.rotation = self.rotation;
        options.flip_x = self.flip_x;
        options.flip_y = self.flip_y;
        options.split_into_tiles = self.split;
    }
}

/// Spritesheet importer defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Gap between cells in pixels
    #[serde(default = "default_spacing")]
    pub spacing: u32,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self { tile_size: default_tile_size(), spacing: default_spacing() }
    }
}

/// New tilemap defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilemapConfig {
    #[serde(default = "default_map_name")]
    pub name: String,
    #[serde(default = "default_map_width")]
    pub width: u32,
    #[serde(default = "default_map_height")]
    pub height: u32,
    #[serde(default = "default_tile_size")]
    pub tile_size: u32,
    /// Gap between cells on export
    #[serde(default)]
    pub spacing: u32,
}

impl Default for TilemapConfig {
    fn default() -> Self {
        Self {
            name: default_map_name(),
            width: default_map_width(),
            height: default_map_height(),
            tile_size: default_tile_size(),
            spacing: 0,
        }
    }
}

/// Upload normalisation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Wider uploads are downscaled to this width
    #[serde(default = "default_max_width")]
    pub max_width: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self { max_width: default_max_width() }
    }
}

fn default_tile_size() -> u32 {
    DEFAULT_TILE_SIZE
}

fn default_spacing() -> u32 {
    DEFAULT_SPACING
}

fn default_map_name() -> String {
    DEFAULT_MAP_NAME.to_string()
}

fn default_map_width() -> u32 {
    DEFAULT_MAP_WIDTH
}

fn default_map_height() -> u32 {
    DEFAULT_MAP_HEIGHT
}

fn default_max_width() -> u32 {
    MAX_UPLOAD_WIDTH
}

/// Complete tilekit.toml configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TilekitConfig {
    #[serde(default)]
    pub process: ProcessConfig,
    #[serde(default)]
    pub import: ImportConfig,
    #[serde(default)]
    pub tilemap: TilemapConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "import.tile_size")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "tilekit.toml: '{}' {}", self.field, self.message)
    }
}

impl TilekitConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();
        let mut positive = |field: &str, value: u32| {
            if value == 0 {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: "must be a positive integer".to_string(),
                });
            }
        };

        positive("process.tile_size", self.process.tile_size);
        if let Some(size) = self.process.output_size {
            positive("process.output_size", size);
        }
        positive("import.tile_size", self.import.tile_size);
        positive("tilemap.tile_size", self.tilemap.tile_size);
        positive("upload.max_width", self.upload.max_width);

        if !self.process.rotation.is_finite() {
            errors.push(ConfigValidationError {
                field: "process.rotation".to_string(),
                message: "must be a finite number of degrees".to_string(),
            });
        }

        if self.tilemap.name.trim().is_empty() {
            errors.push(ConfigValidationError {
                field: "tilemap.name".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        if let (Some(output), true) = (self.process.output_size, self.process.split) {
            if self.process.tile_size > output {
                errors.push(ConfigValidationError {
                    field: "process.tile_size".to_string(),
                    message: format!("{} is larger than output_size {}", self.process.tile_size, output),
                });
            }
        }

        errors
    }
}
