//! Tilekit - Library for cutting images into tiles and composing tilemaps
//!
//! This library provides functionality to:
//! - Crop, rotate, flip, resize and split an image into square tiles
//! - Slice a spacing-separated spritesheet into a grid of tiles
//! - Paint tiles onto a fixed-size grid and flatten it to a single PNG

pub mod cli;
pub mod config;
pub mod decode;
pub mod models;
pub mod output;
pub mod palette;
pub mod pipeline;
pub mod session;
pub mod spritesheet;
pub mod tilemap;
