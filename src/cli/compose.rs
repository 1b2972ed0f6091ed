//! Compose command implementation
//!
//! A layout file names the tile images and which cell each one goes to:
//!
//! ```json
//! {
//!   "name": "meadow",
//!   "width": 4,
//!   "height": 3,
//!   "tileSize": 16,
//!   "tiles": ["grass.png", "path.png"],
//!   "fill": 0,
//!   "cells": [{ "row": 1, "col": 2, "tile": 1 }]
//! }
//! ```
//!
//! Tile paths are relative to the layout file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::TilekitConfig;
use crate::decode::decode_file;
use crate::models::Tile;
use crate::session::Session;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Layout {
    name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    tile_size: Option<u32>,
    spacing: Option<u32>,
    tiles: Vec<PathBuf>,
    /// Tile index painted into every cell before `cells` are applied
    #[serde(default)]
    fill: Option<usize>,
    #[serde(default)]
    cells: Vec<Placement>,
}

#[derive(Debug, Deserialize)]
struct Placement {
    row: usize,
    col: usize,
    /// Index into `tiles`; `null` erases the cell
    tile: Option<usize>,
}

fn read_layout(path: &Path) -> Result<Layout, String> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Invalid layout '{}': {}", path.display(), e))
}

fn tile_at(tiles: &[Tile], index: usize) -> Result<Tile, String> {
    tiles
        .get(index)
        .cloned()
        .ok_or_else(|| format!("tile index {} out of range (layout has {} tiles)", index, tiles.len()))
}

/// Execute the compose command
pub fn run_compose(layout_path: &PathBuf, output: Option<&Path>, config: TilekitConfig) -> ExitCode {
    let layout = match read_layout(layout_path) {
        Ok(layout) => layout,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let base_dir = layout_path.parent().unwrap_or(Path::new(""));
    let mut tiles = Vec::with_capacity(layout.tiles.len());
    for tile_path in &layout.tiles {
        let full_path = base_dir.join(tile_path);
        match decode_file(&full_path) {
            Ok(image) => tiles.push(Tile::new(image)),
            Err(e) => {
                eprintln!("Error: {}", e);
                return ExitCode::from(EXIT_ERROR);
            }
        }
    }

    let width = layout.width.unwrap_or(config.tilemap.width);
    let height = layout.height.unwrap_or(config.tilemap.height);
    let tile_size = layout.tile_size.unwrap_or(config.tilemap.tile_size);
    if width == 0 || height == 0 || tile_size == 0 {
        eprintln!("Error: layout width, height and tileSize must be positive");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let mut session = Session::new(config);
    session.new_map(width, height, tile_size);
    if let Some(name) = layout.name {
        session.map_mut().name = name;
    }
    if let Some(spacing) = layout.spacing {
        session.map_mut().spacing = spacing;
    }

    if let Some(index) = layout.fill {
        let tile = match tile_at(&tiles, index) {
            Ok(tile) => tile,
            Err(e) => {
                eprintln!("Error: fill: {}", e);
                return ExitCode::from(EXIT_INVALID_ARGS);
            }
        };
        session.select_tile(tile);
        for row in 0..height as usize {
            for col in 0..width as usize {
                if let Err(e) = session.paint(row, col) {
                    eprintln!("Error: {}", e);
                    return ExitCode::from(EXIT_ERROR);
                }
            }
        }
    }

    for placement in &layout.cells {
        let result = match placement.tile {
            Some(index) => match tile_at(&tiles, index) {
                Ok(tile) => {
                    session.select_tile(tile);
                    session.paint(placement.row, placement.col).map(|_| ())
                }
                Err(e) => {
                    eprintln!("Error: cell ({}, {}): {}", placement.row, placement.col, e);
                    return ExitCode::from(EXIT_INVALID_ARGS);
                }
            },
            None => session.erase(placement.row, placement.col),
        };
        if let Err(e) = result {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    }

    let output = output.map(Path::to_path_buf).or_else(|| {
        (!base_dir.as_os_str().is_empty()).then(|| base_dir.join(session.map().file_name()))
    });
    match session.export_to(output.as_deref()) {
        Ok(path) => {
            println!(
                "Composed: {} ({}x{} cells, {} filled) -> {}",
                session.map().name,
                width,
                height,
                session.map().filled_count(),
                path.display()
            );
            ExitCode::from(EXIT_SUCCESS)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_ERROR)
        }
    }
}
