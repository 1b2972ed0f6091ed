//! Tilemap grid: a rectangular arrangement of optional tile references

use image::imageops::FilterType;
use image::RgbaImage;
use thiserror::Error;

use crate::models::{generate_id, Tile};
use crate::output::{blank_canvas, encode_png, grid_extent, OutputError};

pub const DEFAULT_MAP_NAME: &str = "New Tilemap";
pub const DEFAULT_MAP_WIDTH: u32 = 32;
pub const DEFAULT_MAP_HEIGHT: u32 = 32;
pub const DEFAULT_TILE_SIZE: u32 = 32;

/// Error type for grid operations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum GridError {
    /// Cell coordinate outside the grid
    #[error("cell ({row}, {col}) is outside the {width}x{height} grid")]
    OutOfBounds { row: usize, col: usize, width: u32, height: u32 },
    /// Replacement grid has no rows or no columns
    #[error("replacement grid is empty")]
    EmptyInput,
    /// Replacement grid rows differ in length
    #[error("row {row} has {len} cells, expected {expected}")]
    Ragged { row: usize, len: usize, expected: usize },
}

/// A grid of `height` rows by `width` cells, each empty or holding a tile.
#[derive(Debug, Clone)]
pub struct TileMap {
    pub id: String,
    pub name: String,
    width: u32,
    height: u32,
    pub tile_size: u32,
    /// Pixels between cells on export
    pub spacing: u32,
    tiles: Vec<Vec<Option<Tile>>>,
}

impl Default for TileMap {
    fn default() -> Self {
        Self::new(DEFAULT_MAP_WIDTH, DEFAULT_MAP_HEIGHT, DEFAULT_TILE_SIZE)
    }
}

impl TileMap {
    /// An all-empty map with no spacing between cells.
    pub fn new(width: u32, height: u32, tile_size: u32) -> Self {
        Self {
            id: generate_id(),
            name: DEFAULT_MAP_NAME.to_string(),
            width,
            height,
            tile_size,
            spacing: 0,
            tiles: vec![vec![None; width as usize]; height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rows(&self) -> &[Vec<Option<Tile>>] {
        &self.tiles
    }

    fn check_bounds(&self, row: usize, col: usize) -> Result<(), GridError> {
        if row >= self.height as usize || col >= self.width as usize {
            return Err(GridError::OutOfBounds { row, col, width: self.width, height: self.height });
        }
        Ok(())
    }

    pub fn get(&self, row: usize, col: usize) -> Result<Option<&Tile>, GridError> {
        self.check_bounds(row, col)?;
        Ok(self.tiles[row][col].as_ref())
    }

    /// Place a tile, replacing whatever the cell held.
    pub fn set_cell(&mut self, row: usize, col: usize, tile: Tile) -> Result<(), GridError> {
        self.check_bounds(row, col)?;
        self.tiles[row][col] = Some(tile);
        Ok(())
    }

    /// Empty a cell. Clearing an empty cell is a no-op.
    pub fn clear_cell(&mut self, row: usize, col: usize) -> Result<(), GridError> {
        self.check_bounds(row, col)?;
        self.tiles[row][col] = None;
        Ok(())
    }

    /// Swap in a whole new grid, taking its dimensions.
    ///
    /// Empty or ragged input is rejected and the map is left as it was.
    pub fn replace(&mut self, tiles: Vec<Vec<Option<Tile>>>) -> Result<(), GridError> {
        let expected = tiles.first().map_or(0, Vec::len);
        if expected == 0 {
            return Err(GridError::EmptyInput);
        }
        if let Some((row, cells)) = tiles.iter().enumerate().find(|(_, r)| r.len() != expected) {
            return Err(GridError::Ragged { row, len: cells.len(), expected });
        }

        self.width = expected as u32;
        self.height = tiles.len() as u32;
        self.tiles = tiles;
        log::info!("tilemap '{}' replaced with {}x{} grid", self.name, self.width, self.height);
        Ok(())
    }

    /// Number of cells holding a tile.
    pub fn filled_count(&self) -> usize {
        self.tiles.iter().flatten().filter(|cell| cell.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.filled_count() == 0
    }

    /// Export file name: `{name}.png`.
    pub fn file_name(&self) -> String {
        format!("{}.png", self.name)
    }

    /// Flatten the grid into one bitmap.
    ///
    /// Empty cells and the spacing between cells stay transparent. A tile
    /// whose bitmap is not `tile_size` square is scaled to fit its cell.
    /// Fails with `OutputError::TooLarge` when the flattened size does not
    /// fit in one image.
    pub fn export(&self) -> Result<RgbaImage, OutputError> {
        let mut canvas = blank_canvas(
            grid_extent(self.width, self.tile_size, self.spacing),
            grid_extent(self.height, self.tile_size, self.spacing),
        )?;
        // every cell origin lies inside the canvas, so i64 cannot overflow
        let pitch = self.tile_size as i64 + self.spacing as i64;

        for (row, cells) in self.tiles.iter().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                let Some(tile) = cell else { continue };
                let (x, y) = (col as i64 * pitch, row as i64 * pitch);
                if tile.image.dimensions() == (self.tile_size, self.tile_size) {
                    image::imageops::replace(&mut canvas, tile.image.as_ref(), x, y);
                } else {
                    let fitted = image::imageops::resize(
                        tile.image.as_ref(),
                        self.tile_size,
                        self.tile_size,
                        FilterType::Nearest,
                    );
                    image::imageops::replace(&mut canvas, &fitted, x, y);
                }
            }
        }

        log::debug!(
            "exported '{}' ({} of {} cells filled) to {}x{}",
            self.name,
            self.filled_count(),
            self.width as u64 * self.height as u64,
            canvas.width(),
            canvas.height()
        );
        Ok(canvas)
    }

    /// Export and encode as PNG bytes.
    pub fn export_png(&self) -> Result<Vec<u8>, OutputError> {
        encode_png(&self.export()?)
    }
}

/// Wrap an imported tile grid as fully populated map rows.
pub fn filled_rows(grid: Vec<Vec<Tile>>) -> Vec<Vec<Option<Tile>>> {
    grid.into_iter().map(|row| row.into_iter().map(Some).collect()).collect()
}
