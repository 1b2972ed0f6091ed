//! Spritesheet slicing and layout
//!
//! A spritesheet is a grid of `tile_size` square cells with `spacing` pixels
//! between neighbouring cells and no trailing spacing after the last row or
//! column. Slicing is the inverse of the pipeline's grid split.

use image::{Rgba, RgbaImage};
use std::sync::Arc;

use crate::decode::{decode_bytes, DecodeError};
use crate::models::{ProcessedImage, Tile};
use crate::output::{blank_canvas, grid_extent, OutputError};

/// Transparent color used for spacing and empty cells
const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Default gap between cells of an imported sheet
pub const DEFAULT_SPACING: u32 = 2;

/// Number of `(columns, rows)` a sheet of the given size holds.
///
/// Each cell takes `tile_size + spacing` except the last one on each axis,
/// hence `floor((extent + spacing) / (tile_size + spacing))`.
///
/// # Examples
///
/// ```
/// use tilekit::spritesheet::grid_dimensions;
///
/// // 3 columns of 32px with 2px gaps: 3 * 34 - 2 = 100
/// assert_eq!(grid_dimensions(100, 32, 32, 2), (3, 1));
/// // Zero tile size never yields cells
/// assert_eq!(grid_dimensions(100, 100, 0, 0), (0, 0));
/// ```
pub fn grid_dimensions(width: u32, height: u32, tile_size: u32, spacing: u32) -> (u32, u32) {
    if tile_size == 0 {
        return (0, 0);
    }
    let pitch = tile_size as u64 + spacing as u64;
    let count = |extent: u32| ((extent as u64 + spacing as u64) / pitch) as u32;
    (count(width), count(height))
}

/// Offset of the `index`th cell along one axis.
///
/// Only called for cells that `grid_dimensions` counted, whose offsets lie
/// inside the sheet.
fn cell_offset(index: u32, tile_size: u32, spacing: u32) -> u32 {
    (index as u64 * (tile_size as u64 + spacing as u64)) as u32
}

/// Copy cell `(col, row)` out of the sheet.
fn cell_at(sheet: &RgbaImage, col: u32, row: u32, tile_size: u32, spacing: u32) -> RgbaImage {
    let x = cell_offset(col, tile_size, spacing);
    let y = cell_offset(row, tile_size, spacing);
    image::imageops::crop_imm(sheet, x, y, tile_size, tile_size).to_image()
}

/// Slice a sheet into rows of tiles, each with a fresh id.
///
/// A zero tile size or a sheet smaller than one cell gives an empty grid;
/// callers treat that as nothing to import.
pub fn import_grid(sheet: &RgbaImage, tile_size: u32, spacing: u32) -> Vec<Vec<Tile>> {
    let (cols, rows) = grid_dimensions(sheet.width(), sheet.height(), tile_size, spacing);
    log::debug!(
        "slicing {}x{} sheet into {}x{} cells (tile {}, spacing {})",
        sheet.width(),
        sheet.height(),
        cols,
        rows,
        tile_size,
        spacing
    );

    (0..rows)
        .map(|row| {
            (0..cols).map(|col| Tile::new(cell_at(sheet, col, row, tile_size, spacing))).collect()
        })
        .collect()
}

/// Slice a sheet into a flat, row-major list of palette entries.
///
/// Every entry keeps the whole sheet as its original.
pub fn extract_palette(sheet: Arc<RgbaImage>, tile_size: u32, spacing: u32) -> Vec<ProcessedImage> {
    let (cols, rows) = grid_dimensions(sheet.width(), sheet.height(), tile_size, spacing);
    let mut entries = Vec::with_capacity(cols as usize * rows as usize);

    for row in 0..rows {
        for col in 0..cols {
            let cell = cell_at(&sheet, col, row, tile_size, spacing);
            entries.push(ProcessedImage::new(Arc::clone(&sheet), cell, tile_size));
        }
    }

    entries
}

/// Decode a sheet and slice it into a tile grid.
pub fn import_grid_bytes(bytes: &[u8], tile_size: u32, spacing: u32) -> Result<Vec<Vec<Tile>>, DecodeError> {
    let sheet = decode_bytes(bytes)?;
    Ok(import_grid(&sheet, tile_size, spacing))
}

/// Decode a sheet and slice it into palette entries.
pub fn extract_palette_bytes(
    bytes: &[u8],
    tile_size: u32,
    spacing: u32,
) -> Result<Vec<ProcessedImage>, DecodeError> {
    let sheet = decode_bytes(bytes)?;
    Ok(extract_palette(Arc::new(sheet), tile_size, spacing))
}

/// Lay square tiles out into a sheet the importer can read back.
///
/// # Arguments
///
/// * `tiles` - Tile bitmaps in row-major order; all should share one size
/// * `cols` - Optional number of columns. If None, uses a single row
/// * `spacing` - Gap in pixels between neighbouring cells
///
/// Cells are sized by the largest tile; smaller tiles sit in the top-left
/// corner of their cell and the rest stays transparent. An empty input
/// gives a 1x1 transparent image. A layout wider or taller than one image
/// can hold is `OutputError::TooLarge`.
pub fn render_spritesheet(tiles: &[&RgbaImage], cols: Option<u32>, spacing: u32) -> Result<RgbaImage, OutputError> {
    if tiles.is_empty() {
        return Ok(RgbaImage::from_pixel(1, 1, TRANSPARENT));
    }

    let cell_width = tiles.iter().map(|t| t.width()).max().unwrap_or(1);
    let cell_height = tiles.iter().map(|t| t.height()).max().unwrap_or(1);

    let count = tiles.len() as u32;
    let columns = cols.unwrap_or(count).max(1);
    let rows = count.div_ceil(columns);

    let mut sheet = blank_canvas(
        grid_extent(columns, cell_width, spacing),
        grid_extent(rows, cell_height, spacing),
    )?;

    for (i, tile) in tiles.iter().enumerate() {
        let col = (i as u32) % columns;
        let row = (i as u32) / columns;
        let dest_x = col as i64 * (cell_width as i64 + spacing as i64);
        let dest_y = row as i64 * (cell_height as i64 + spacing as i64);
        image::imageops::replace(&mut sheet, *tile, dest_x, dest_y);
    }

    Ok(sheet)
}
