//! Process command implementation

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_INVALID_ARGS, EXIT_SUCCESS};
use crate::config::TilekitConfig;
use crate::decode::decode_file;
use crate::models::ImageProcessingOptions;
use crate::output::{save_png, tile_output_path};
use crate::session::Session;
use crate::spritesheet::render_spritesheet;

/// Crop geometry given on the command line
#[derive(Debug, Default, Clone, Copy)]
pub struct CropArgs {
    pub x: Option<i64>,
    pub y: Option<i64>,
    pub size: Option<u32>,
}

impl CropArgs {
    /// Apply the crop flags. A new crop size also becomes the output size
    /// unless one was fixed explicitly.
    fn apply_to(&self, options: &mut ImageProcessingOptions, fixed_output: Option<u32>) {
        if let Some(x) = self.x {
            options.crop_start.x = x;
        }
        if let Some(y) = self.y {
            options.crop_start.y = y;
        }
        if let Some(size) = self.size {
            options.crop_size = size;
            options.output_size = fixed_output.unwrap_or(size);
        }
    }
}

fn read_options_file(path: &Path) -> Result<ImageProcessingOptions, String> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read '{}': {}", path.display(), e))?;
    serde_json::from_str(&contents).map_err(|e| format!("Invalid options in '{}': {}", path.display(), e))
}

/// Execute the process command
///
/// Every input goes through one session, so the palette accumulates across
/// inputs and `--sheet` collects all of them.
pub fn run_process(
    inputs: &[PathBuf],
    output: Option<&Path>,
    options_file: Option<&Path>,
    crop: CropArgs,
    sheet: Option<&Path>,
    config: TilekitConfig,
) -> ExitCode {
    if inputs.is_empty() {
        eprintln!("Error: no input images matched");
        return ExitCode::from(EXIT_INVALID_ARGS);
    }

    let base_options = match options_file.map(read_options_file).transpose() {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::from(EXIT_INVALID_ARGS);
        }
    };

    let fixed_output = base_options.as_ref().map(|o| o.output_size).or(config.process.output_size);
    let mut session = Session::new(config);
    let mut failed = false;

    for input in inputs {
        let image = match decode_file(input) {
            Ok(image) => image,
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
                continue;
            }
        };
        let (width, height) = session.load_source(image);

        // an options file replaces the staged defaults wholesale
        if let Some(ref base) = base_options {
            session.options = base.clone();
        }
        crop.apply_to(&mut session.options, fixed_output);

        let start = session.palette().len();
        let added = match session.process() {
            Ok(added) => added,
            Err(e) => {
                eprintln!("Error: {}: {}", input.display(), e);
                failed = true;
                continue;
            }
        };

        for (index, entry) in session.palette().iter().skip(start).enumerate() {
            let path = tile_output_path(input, index, added, output);
            if let Err(e) = save_png(&entry.processed, &path) {
                eprintln!("Error: Failed to write '{}': {}", path.display(), e);
                failed = true;
            }
        }

        println!(
            "Processed: {} ({}x{}) -> {} tile{} of {}px",
            input.display(),
            width,
            height,
            added,
            if added == 1 { "" } else { "s" },
            session.palette().get(start).map_or(0, |e| e.width)
        );
    }

    if let Some(sheet_path) = sheet {
        if session.palette().is_empty() {
            eprintln!("Warning: no tiles produced, spritesheet not written");
        } else {
            let tiles: Vec<_> = session.palette().iter().map(|e| e.processed.as_ref()).collect();
            let cols = session.options.tiles_per_axis().max(1);
            let cols = if session.options.split_into_tiles { Some(cols) } else { None };
            let written = render_spritesheet(&tiles, cols, session.config().import.spacing)
                .and_then(|image| save_png(&image, sheet_path));
            match written {
                Ok(()) => println!("Spritesheet: {} ({} tiles)", sheet_path.display(), tiles.len()),
                Err(e) => {
                    eprintln!("Error: Failed to write '{}': {}", sheet_path.display(), e);
                    failed = true;
                }
            }
        }
    }

    if failed {
        ExitCode::from(EXIT_ERROR)
    } else {
        ExitCode::from(EXIT_SUCCESS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crop_size_drives_output_size() {
        let mut options = ImageProcessingOptions::centered(64, 64);
        CropArgs { size: Some(16), ..Default::default() }.apply_to(&mut options, None);
        assert_eq!((options.crop_size, options.output_size), (16, 16));
    }

    #[test]
    fn test_crop_size_keeps_fixed_output() {
        let mut options = ImageProcessingOptions::centered(64, 64);
        CropArgs { x: Some(-4), size: Some(16), ..Default::default() }.apply_to(&mut options, Some(32));
        assert_eq!((options.crop_size, options.output_size), (16, 32));
        assert_eq!(options.crop_start.x, -4);
    }

    #[test]
    fn test_no_crop_flags_leave_options() {
        let mut options = ImageProcessingOptions::centered(80, 40);
        let before = options.clone();
        CropArgs::default().apply_to(&mut options, None);
        assert_eq!(options, before);
    }
}
