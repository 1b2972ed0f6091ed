//! Editing session: the one owner of source image, palette, selection and map
//!
//! Callers resolve geometry and gestures themselves and drive the session
//! one action at a time. Every failed action leaves the palette and map as
//! they were.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::config::TilekitConfig;
use crate::decode::{decode_bytes, limit_width, DecodeError};
use crate::models::{ImageProcessingOptions, Tile};
use crate::output::{map_output_path, save_png, OutputError};
use crate::palette::Palette;
use crate::pipeline::{extract_shared, PipelineError};
use crate::spritesheet::{extract_palette, import_grid};
use crate::tilemap::{filled_rows, GridError, TileMap};

/// Error type for session actions
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Output(#[from] OutputError),
    /// Processing was requested before any image was loaded
    #[error("no source image loaded")]
    NoSource,
}

#[derive(Debug)]
pub struct Session {
    config: TilekitConfig,
    source: Option<Arc<RgbaImage>>,
    /// Staged pipeline settings for the current source
    pub options: ImageProcessingOptions,
    palette: Palette,
    selected: Option<Tile>,
    map: TileMap,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(TilekitConfig::default())
    }
}

impl Session {
    pub fn new(config: TilekitConfig) -> Self {
        let map = new_map_from(&config);
        Self {
            config,
            source: None,
            options: ImageProcessingOptions::default(),
            palette: Palette::new(),
            selected: None,
            map,
        }
    }

    pub fn config(&self) -> &TilekitConfig {
        &self.config
    }

    pub fn source(&self) -> Option<&RgbaImage> {
        self.source.as_deref()
    }

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn map(&self) -> &TileMap {
        &self.map
    }

    pub fn map_mut(&mut self) -> &mut TileMap {
        &mut self.map
    }

    pub fn selected(&self) -> Option<&Tile> {
        self.selected.as_ref()
    }

    /// Decode an uploaded image and make it the current source.
    pub fn load_source_bytes(&mut self, bytes: &[u8]) -> Result<(u32, u32), SessionError> {
        let image = decode_bytes(bytes)?;
        Ok(self.load_source(image))
    }

    /// Make an already decoded image the current source.
    ///
    /// Wide images are downscaled first. The staged options are reset to the
    /// largest centered square with the configured process defaults applied.
    pub fn load_source(&mut self, image: RgbaImage) -> (u32, u32) {
        let image = limit_width(image, self.config.upload.max_width);
        let (width, height) = image.dimensions();

        let mut options = ImageProcessingOptions::centered(width, height);
        self.config.process.apply_to(&mut options);
        self.options = options;
        self.source = Some(Arc::new(image));

        log::info!("loaded {}x{} source", width, height);
        (width, height)
    }

    /// Run the pipeline with the staged options.
    pub fn process(&mut self) -> Result<usize, SessionError> {
        let options = self.options.clone();
        self.process_with(&options)
    }

    /// Run the pipeline on the current source and append the results.
    ///
    /// The first new entry becomes the selected tile. Returns how many
    /// entries were added.
    pub fn process_with(&mut self, options: &ImageProcessingOptions) -> Result<usize, SessionError> {
        let source = self.source.clone().ok_or(SessionError::NoSource)?;
        let results = extract_shared(source, options)?;

        if let Some(first) = results.first() {
            self.selected = Some(first.to_tile());
        }
        Ok(self.palette.extend(results))
    }

    /// Select the palette entry with this id. Unknown ids keep the current selection.
    pub fn select(&mut self, id: &str) -> bool {
        match self.palette.tile(id) {
            Some(tile) => {
                self.selected = Some(tile);
                true
            }
            None => {
                log::warn!("no palette entry with id '{}'", id);
                false
            }
        }
    }

    pub fn select_tile(&mut self, tile: Tile) {
        self.selected = Some(tile);
    }

    /// Place the selected tile at a cell. Without a selection this does nothing.
    pub fn paint(&mut self, row: usize, col: usize) -> Result<bool, SessionError> {
        let Some(tile) = self.selected.clone() else {
            return Ok(false);
        };
        self.map.set_cell(row, col, tile)?;
        Ok(true)
    }

    pub fn erase(&mut self, row: usize, col: usize) -> Result<(), SessionError> {
        self.map.clear_cell(row, col)?;
        Ok(())
    }

    /// Empty the palette. The selection and painted cells keep their tiles.
    pub fn clear_palette(&mut self) {
        self.palette.clear();
    }

    /// Start over with an empty map, keeping its name.
    pub fn new_map(&mut self, width: u32, height: u32, tile_size: u32) {
        let name = std::mem::take(&mut self.map.name);
        self.map = TileMap::new(width, height, tile_size);
        self.map.name = name;
    }

    /// Replace the map with a sliced spritesheet and add its cells to the palette.
    ///
    /// The map keeps the import spacing so exporting reproduces the sheet.
    /// A sheet too small for a single cell is rejected with
    /// `GridError::EmptyInput` and nothing changes.
    pub fn import_tilemap(&mut self, bytes: &[u8], tile_size: u32, spacing: u32) -> Result<(u32, u32), SessionError> {
        let sheet = Arc::new(decode_bytes(bytes)?);
        self.import_sheet(sheet, tile_size, spacing)
    }

    pub fn import_sheet(
        &mut self,
        sheet: Arc<RgbaImage>,
        tile_size: u32,
        spacing: u32,
    ) -> Result<(u32, u32), SessionError> {
        let grid = import_grid(&sheet, tile_size, spacing);
        if grid.first().map_or(true, Vec::is_empty) {
            log::warn!(
                "{}x{} sheet holds no {}px cells, nothing imported",
                sheet.width(),
                sheet.height(),
                tile_size
            );
            return Err(GridError::EmptyInput.into());
        }

        self.map.replace(filled_rows(grid))?;
        self.map.tile_size = tile_size;
        self.map.spacing = spacing;
        self.palette.extend(extract_palette(sheet, tile_size, spacing));

        Ok((self.map.width(), self.map.height()))
    }

    /// Flatten the map into PNG bytes.
    pub fn export_png(&self) -> Result<Vec<u8>, SessionError> {
        Ok(self.map.export_png()?)
    }

    /// Write the map as `{name}.png` (or to an explicit file path).
    pub fn export_to(&self, output: Option<&Path>) -> Result<PathBuf, SessionError> {
        let path = map_output_path(&self.map.name, output);
        save_png(&self.map.export()?, &path)?;
        log::info!("exported '{}' to {}", self.map.name, path.display());
        Ok(path)
    }
}

fn new_map_from(config: &TilekitConfig) -> TileMap {
    let mut map = TileMap::new(config.tilemap.width, config.tilemap.height, config.tilemap.tile_size);
    map.name = config.tilemap.name.clone();
    map.spacing = config.tilemap.spacing;
    map
}
