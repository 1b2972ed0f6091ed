//! Info command implementation

use std::path::PathBuf;
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::TilekitConfig;
use crate::decode::{decode_file, limit_width};
use crate::models::ImageProcessingOptions;
use crate::spritesheet::grid_dimensions;

/// Execute the info command
pub fn run_info(input: &PathBuf, config: &TilekitConfig) -> ExitCode {
    let image = match decode_file(input) {
        Ok(image) => image,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_ERROR);
        }
    };
    let (width, height) = image.dimensions();
    println!("{}: {}x{}", input.display(), width, height);

    // sheets are imported at full size
    let tile_size = config.import.tile_size;
    let spacing = config.import.spacing;
    let (cols, rows) = grid_dimensions(width, height, tile_size, spacing);
    if cols == 0 || rows == 0 {
        println!("  import:   no {}px cells (spacing {})", tile_size, spacing);
    } else {
        println!(
            "  import:   {}x{} cells of {}px (spacing {}), {} tiles",
            cols,
            rows,
            tile_size,
            spacing,
            cols as u64 * rows as u64
        );
    }

    // uploads for processing are downscaled first
    let max_width = config.upload.max_width;
    let image = if width > max_width {
        let limited = limit_width(image, max_width);
        println!("  upload:   downscaled to {}x{} (max width {})", limited.width(), limited.height(), max_width);
        limited
    } else {
        image
    };

    let mut options = ImageProcessingOptions::centered(image.width(), image.height());
    config.process.apply_to(&mut options);
    println!(
        "  process:  {}px crop at ({}, {}) -> {}px output",
        options.crop_size, options.crop_start.x, options.crop_start.y, options.output_size
    );
    let per_axis = options.tiles_per_axis();
    if per_axis > 0 {
        println!("  split:    {} tiles of {}px", per_axis as u64 * per_axis as u64, options.tile_size);
    } else {
        println!("  split:    output smaller than one {}px tile", options.tile_size);
    }

    ExitCode::from(EXIT_SUCCESS)
}
