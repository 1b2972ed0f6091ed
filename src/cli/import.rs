//! Import command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::TilekitConfig;
use crate::output::{save_png, tile_output_path};
use crate::session::{Session, SessionError};
use crate::tilemap::GridError;

/// Execute the import command
pub fn run_import(
    input: &PathBuf,
    output: Option<&Path>,
    map: Option<&Path>,
    name_given: bool,
    config: TilekitConfig,
) -> ExitCode {
    let bytes = match std::fs::read(input) {
        Ok(bytes) => bytes,
        Err(e) => {
            eprintln!("Error: Failed to read '{}': {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let tile_size = config.import.tile_size;
    let spacing = config.import.spacing;
    let mut session = Session::new(config);

    let (cols, rows) = match session.import_tilemap(&bytes, tile_size, spacing) {
        Ok(dims) => dims,
        Err(SessionError::Grid(GridError::EmptyInput)) => {
            eprintln!(
                "Warning: '{}' is smaller than one {}px cell, nothing imported",
                input.display(),
                tile_size
            );
            return ExitCode::from(EXIT_SUCCESS);
        }
        Err(e) => {
            eprintln!("Error: {}: {}", input.display(), e);
            return ExitCode::from(EXIT_ERROR);
        }
    };

    let total = session.palette().len();
    let mut failed = false;
    for (index, entry) in session.palette().iter().enumerate() {
        let path = tile_output_path(input, index, total, output);
        if let Err(e) = save_png(&entry.processed, &path) {
            eprintln!("Error: Failed to write '{}': {}", path.display(), e);
            failed = true;
        }
    }
    println!("Imported: {} -> {}x{} cells of {}px ({} tiles)", input.display(), cols, rows, tile_size, total);

    if let Some(map_path) = map {
        if !name_given {
            session.map_mut().name = input.file_stem().unwrap_or_default().to_string_lossy().to_string();
        }
        match session.export_to(Some(map_path)) {
            Ok(path) => println!("Tilemap: {}", path.display()),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}
