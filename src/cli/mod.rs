//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod compose;
mod import;
mod info;
mod process;

use clap::{Parser, Subcommand};
use glob::glob;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::config::{load_config, merge_cli_overrides, CliOverrides, TilekitConfig};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Expand input arguments, treating anything with glob metacharacters as a pattern.
///
/// Plain paths are passed through even if they don't exist so the caller
/// reports the read error. Patterns that match nothing contribute nothing.
pub fn expand_inputs(inputs: &[String]) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.contains(['*', '?', '[']) {
            files.push(PathBuf::from(input));
            continue;
        }
        match glob(input) {
            Ok(paths) => {
                let mut matched: Vec<PathBuf> = paths.filter_map(Result::ok).collect();
                matched.sort();
                if matched.is_empty() {
                    log::warn!("pattern '{}' matched no files", input);
                }
                files.extend(matched);
            }
            Err(e) => log::warn!("invalid pattern '{}': {}", input, e),
        }
    }
    files
}

/// Tilekit - cut images into tiles, slice spritesheets, compose tilemaps
#[derive(Parser)]
#[command(name = "tkit")]
#[command(about = "Tilekit - cut images into tiles, slice spritesheets and compose tilemaps to PNG")]
#[command(version)]
pub struct Cli {
    /// More log output (-v info, -vv debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Config file (default: tilekit.toml found from the current directory up)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Crop, rotate, flip and resize images into tiles
    Process {
        /// Input images or glob patterns (PNG, JPEG, GIF)
        #[arg(required = true)]
        inputs: Vec<String>,

        /// Output directory (default: next to each input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pipeline options as JSON (cropStart, cropSize, rotation, ...);
        /// replaces the [process] defaults, only crop flags may refine it
        #[arg(long, conflicts_with_all = ["rotate", "flip_x", "flip_y", "output_size", "split", "tile_size"])]
        options: Option<PathBuf>,

        /// Crop origin x (default: centers the largest square)
        #[arg(long, allow_negative_numbers = true)]
        crop_x: Option<i64>,

        /// Crop origin y
        #[arg(long, allow_negative_numbers = true)]
        crop_y: Option<i64>,

        /// Side of the square crop in source pixels
        #[arg(long)]
        crop_size: Option<u32>,

        /// Clockwise rotation in degrees (0, 90, 180, 270 or any angle)
        #[arg(long, allow_negative_numbers = true)]
        rotate: Option<f32>,

        /// Mirror horizontally
        #[arg(long)]
        flip_x: bool,

        /// Mirror vertically
        #[arg(long)]
        flip_y: bool,

        /// Output side in pixels (default: crop size)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        output_size: Option<u32>,

        /// Split the output into tile-size squares
        #[arg(long)]
        split: bool,

        /// Tile side when splitting (default: 32)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        tile_size: Option<u32>,

        /// Also write every produced tile into one spritesheet
        #[arg(long)]
        sheet: Option<PathBuf>,
    },

    /// Slice a spritesheet into tiles
    Import {
        /// Spritesheet image
        input: PathBuf,

        /// Directory for the sliced tiles
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cell side in pixels (default: 32)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        tile_size: Option<u32>,

        /// Gap between cells in pixels (default: 2)
        #[arg(long)]
        spacing: Option<u32>,

        /// Re-export the imported grid as a tilemap PNG
        #[arg(long)]
        map: Option<PathBuf>,

        /// Tilemap name (default: derived from the input filename)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Build a tilemap from a JSON layout and export it as PNG
    Compose {
        /// Layout file
        layout: PathBuf,

        /// Output file or directory (default: {name}.png next to the layout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show image dimensions and how it would be tiled
    Info {
        /// Image to inspect
        input: PathBuf,

        /// Tile/cell side in pixels (default: 32)
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        tile_size: Option<u32>,

        /// Spritesheet spacing in pixels (default: 2)
        #[arg(long)]
        spacing: Option<u32>,
    },
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .try_init();
}

fn load_with_overrides(path: Option<&Path>, overrides: &CliOverrides) -> Result<TilekitConfig, ExitCode> {
    match load_config(path) {
        Ok(mut config) => {
            merge_cli_overrides(&mut config, overrides);
            Ok(config)
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            Err(ExitCode::from(EXIT_ERROR))
        }
    }
}

/// Entry point for the CLI
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Process {
            inputs,
            output,
            options,
            crop_x,
            crop_y,
            crop_size,
            rotate,
            flip_x,
            flip_y,
            output_size,
            split,
            tile_size,
            sheet,
        } => {
            let overrides = CliOverrides {
                output_size,
                tile_size,
                rotation: rotate,
                flip_x: flip_x.then_some(true),
                flip_y: flip_y.then_some(true),
                split: split.then_some(true),
                ..Default::default()
            };
            let config = match load_with_overrides(config_path, &overrides) {
                Ok(config) => config,
                Err(code) => return code,
            };
            process::run_process(
                &expand_inputs(&inputs),
                output.as_deref(),
                options.as_deref(),
                process::CropArgs { x: crop_x, y: crop_y, size: crop_size },
                sheet.as_deref(),
                config,
            )
        }
        Commands::Import { input, output, tile_size, spacing, map, name } => {
            let overrides = CliOverrides { tile_size, spacing, map_name: name, ..Default::default() };
            let config = match load_with_overrides(config_path, &overrides) {
                Ok(config) => config,
                Err(code) => return code,
            };
            import::run_import(&input, output.as_deref(), map.as_deref(), overrides.map_name.is_some(), config)
        }
        Commands::Compose { layout, output } => {
            let config = match load_with_overrides(config_path, &CliOverrides::default()) {
                Ok(config) => config,
                Err(code) => return code,
            };
            compose::run_compose(&layout, output.as_deref(), config)
        }
        Commands::Info { input, tile_size, spacing } => {
            let overrides = CliOverrides { tile_size, spacing, ..Default::default() };
            let config = match load_with_overrides(config_path, &overrides) {
                Ok(config) => config,
                Err(code) => return code,
            };
            info::run_info(&input, &config)
        }
    }
}
