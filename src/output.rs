//! PNG encoding, data URLs and output path generation

use base64::Engine;
use image::codecs::png::PngEncoder;
use image::{ColorType, ImageEncoder, RgbaImage};
use std::io;
use std::path::{Path, PathBuf};

/// Error type for output operations
#[derive(Debug)]
pub enum OutputError {
    /// IO error during file operations
    Io(io::Error),
    /// Image encoding error
    Image(image::ImageError),
    /// Requested canvas does not fit in a single image
    TooLarge { width: u64, height: u64 },
}

impl std::fmt::Display for OutputError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputError::Io(e) => write!(f, "IO error: {}", e),
            OutputError::Image(e) => write!(f, "Image error: {}", e),
            OutputError::TooLarge { width, height } => {
                write!(f, "{}x{} image exceeds the maximum image size", width, height)
            }
        }
    }
}

impl std::error::Error for OutputError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OutputError::Io(e) => Some(e),
            OutputError::Image(e) => Some(e),
            OutputError::TooLarge { .. } => None,
        }
    }
}

impl From<io::Error> for OutputError {
    fn from(e: io::Error) -> Self {
        OutputError::Io(e)
    }
}

impl From<image::ImageError> for OutputError {
    fn from(e: image::ImageError) -> Self {
        OutputError::Image(e)
    }
}

/// Pixel extent of `cells` cells of `cell` pixels with `spacing` between them.
///
/// Computed in `u64` so any `u32` inputs are representable.
pub fn grid_extent(cells: u32, cell: u32, spacing: u32) -> u64 {
    if cells == 0 {
        0
    } else {
        cells as u64 * cell as u64 + (cells as u64 - 1) * spacing as u64
    }
}

/// Allocate a transparent canvas, failing when either side exceeds `u32`.
pub fn blank_canvas(width: u64, height: u64) -> Result<RgbaImage, OutputError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok(RgbaImage::from_pixel(w, h, image::Rgba([0, 0, 0, 0]))),
        _ => Err(OutputError::TooLarge { width, height }),
    }
}

/// Encode an RGBA image as PNG bytes.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, OutputError> {
    let mut bytes = Vec::new();
    PngEncoder::new(&mut bytes).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ColorType::Rgba8,
    )?;
    Ok(bytes)
}

/// Encode an RGBA image as a `data:image/png;base64,...` URL.
pub fn png_data_url(image: &RgbaImage) -> Result<String, OutputError> {
    let bytes = encode_png(image)?;
    Ok(format!("data:image/png;base64,{}", base64::engine::general_purpose::STANDARD.encode(bytes)))
}

/// Save an RGBA image to a PNG file.
///
/// Parent directories are created as needed.
pub fn save_png(image: &RgbaImage, path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    image.save(path)?;
    log::debug!("wrote {}x{} PNG to {}", image.width(), image.height(), path.display());
    Ok(())
}

/// Generate the output path for one extracted tile.
///
/// | Scenario | Output |
/// |----------|--------|
/// | Single output from `cat.png` | `dir/cat.png` |
/// | Split output from `cat.png` | `dir/cat_0.png`, `dir/cat_1.png`, ... |
///
/// Without an output directory the tiles land next to the input, suffixed
/// `_tile` when unsplit so the source is never overwritten.
pub fn tile_output_path(input: &Path, index: usize, total: usize, out_dir: Option<&Path>) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("output");
    let dir = match out_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().unwrap_or(Path::new("")).to_path_buf(),
    };

    let file_name = if total > 1 {
        format!("{}_{}.png", stem, index)
    } else if out_dir.is_some() {
        format!("{}.png", stem)
    } else {
        format!("{}_tile.png", stem)
    };

    if dir.as_os_str().is_empty() {
        PathBuf::from(file_name)
    } else {
        dir.join(file_name)
    }
}

/// Generate the path for a composited tilemap export: `{map_name}.png`.
///
/// An explicit file path wins; a directory (existing, or ending with `/`)
/// receives `{map_name}.png`.
pub fn map_output_path(map_name: &str, output_arg: Option<&Path>) -> PathBuf {
    let file_name = format!("{}.png", map_name);
    match output_arg {
        Some(output) => {
            let is_dir = output.as_os_str().to_string_lossy().ends_with('/') || output.is_dir();
            if is_dir {
                output.join(file_name)
            } else {
                output.to_path_buf()
            }
        }
        None => PathBuf::from(file_name),
    }
}
