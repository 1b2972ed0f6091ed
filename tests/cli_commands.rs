//! CLI integration tests
//!
//! These tests run the tkit binary against images written to a temp dir and
//! check the files it produces.

use image::{Rgba, RgbaImage};
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
const GREEN: Rgba<u8> = Rgba([0, 255, 0, 255]);
const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);
const YELLOW: Rgba<u8> = Rgba([255, 255, 0, 255]);
const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Run tkit inside `dir`, isolated from any user or project config
fn tkit(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_tkit"))
        .args(args)
        .current_dir(dir)
        .env("XDG_CONFIG_HOME", dir)
        .env("HOME", dir)
        .output()
        .expect("Failed to execute tkit")
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write_quadrants(path: &Path) {
    RgbaImage::from_fn(64, 64, |x, y| match (x < 32, y < 32) {
        (true, true) => RED,
        (false, true) => GREEN,
        (true, false) => BLUE,
        (false, false) => YELLOW,
    })
    .save(path)
    .expect("should write quadrant image");
}

fn open(path: &Path) -> RgbaImage {
    image::open(path).expect("Failed to open output image").to_rgba8()
}

#[test]
fn test_process_split_writes_numbered_tiles() {
    let temp = TempDir::new().unwrap();
    write_quadrants(&temp.path().join("quads.png"));

    let output = tkit(temp.path(), &["process", "quads.png", "--split", "--tile-size", "32", "-o", "tiles"]);
    assert!(output.status.success(), "process failed: {}", stderr(&output));

    for (i, color) in [RED, GREEN, BLUE, YELLOW].into_iter().enumerate() {
        let tile = open(&temp.path().join("tiles").join(format!("quads_{}.png", i)));
        assert_eq!(tile.dimensions(), (32, 32));
        assert!(tile.pixels().all(|p| *p == color), "tile {} should be solid", i);
    }
}

#[test]
fn test_process_single_output_with_rotation() {
    let temp = TempDir::new().unwrap();
    write_quadrants(&temp.path().join("quads.png"));

    let output = tkit(temp.path(), &["process", "quads.png", "--rotate", "180", "--output-size", "16"]);
    assert!(output.status.success(), "process failed: {}", stderr(&output));

    let tile = open(&temp.path().join("quads_tile.png"));
    assert_eq!(tile.dimensions(), (16, 16));
    assert_eq!(*tile.get_pixel(0, 0), YELLOW);
    assert_eq!(*tile.get_pixel(15, 15), RED);
}

#[test]
fn test_process_crop_size_sets_output_size() {
    let temp = TempDir::new().unwrap();
    write_quadrants(&temp.path().join("quads.png"));

    let output = tkit(temp.path(), &["process", "quads.png", "--crop-size", "16", "-o", "out"]);
    assert!(output.status.success(), "process failed: {}", stderr(&output));

    let tile = open(&temp.path().join("out/quads.png"));
    assert_eq!(tile.dimensions(), (16, 16));
    // centered 64px square starts at the origin, so the crop is all red
    assert!(tile.pixels().all(|p| *p == RED));
}

#[test]
fn test_process_crop_size_with_explicit_output_size() {
    let temp = TempDir::new().unwrap();
    write_quadrants(&temp.path().join("quads.png"));

    let output = tkit(
        temp.path(),
        &["process", "quads.png", "--crop-size", "16", "--output-size", "32", "-o", "out"],
    );
    assert!(output.status.success(), "process failed: {}", stderr(&output));
    assert_eq!(open(&temp.path().join("out/quads.png")).dimensions(), (32, 32));
}

#[test]
fn test_process_options_file_with_pipeline_flag_rejected() {
    let temp = TempDir::new().unwrap();
    write_quadrants(&temp.path().join("quads.png"));
    std::fs::write(temp.path().join("opts.json"), r#"{ "cropSize": 64, "outputSize": 8 }"#).unwrap();

    let output = tkit(temp.path(), &["process", "quads.png", "--options", "opts.json", "--rotate", "90"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(!temp.path().join("quads_tile.png").exists());

    let output = tkit(temp.path(), &["process", "quads.png", "--options", "opts.json"]);
    assert!(output.status.success(), "process failed: {}", stderr(&output));
    assert_eq!(open(&temp.path().join("quads_tile.png")).dimensions(), (8, 8));
}

#[test]
fn test_process_non_finite_rotation_fails() {
    let temp = TempDir::new().unwrap();
    write_quadrants(&temp.path().join("quads.png"));

    let output = tkit(temp.path(), &["process", "quads.png", "--rotate", "nan"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("rotation"));
    assert!(!temp.path().join("quads_tile.png").exists());
}

#[test]
fn test_process_writes_spritesheet() {
    let temp = TempDir::new().unwrap();
    write_quadrants(&temp.path().join("quads.png"));

    let output = tkit(
        temp.path(),
        &["process", "quads.png", "--split", "-o", "tiles", "--sheet", "sheet.png"],
    );
    assert!(output.status.success(), "process failed: {}", stderr(&output));

    let sheet = open(&temp.path().join("sheet.png"));
    assert_eq!(sheet.dimensions(), (66, 66));
    assert_eq!(*sheet.get_pixel(33, 10), CLEAR);
    assert_eq!(*sheet.get_pixel(40, 40), YELLOW);
}

#[test]
fn test_process_missing_input_fails() {
    let temp = TempDir::new().unwrap();
    let output = tkit(temp.path(), &["process", "nope.png"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("nope.png"));
}

#[test]
fn test_import_slices_and_reexports() {
    let temp = TempDir::new().unwrap();
    let sheet = RgbaImage::from_fn(52, 34, |x, y| {
        if x % 18 >= 16 || y % 18 >= 16 {
            CLEAR
        } else {
            Rgba([(x / 18 * 80) as u8, (y / 18 * 200) as u8, 0, 255])
        }
    });
    sheet.save(temp.path().join("sheet.png")).unwrap();

    let output = tkit(
        temp.path(),
        &["import", "sheet.png", "--tile-size", "16", "-o", "cells", "--map", "map.png"],
    );
    assert!(output.status.success(), "import failed: {}", stderr(&output));
    assert!(String::from_utf8_lossy(&output.stdout).contains("3x2 cells"));

    for i in 0..6 {
        assert!(temp.path().join("cells").join(format!("sheet_{}.png", i)).exists());
    }
    assert_eq!(open(&temp.path().join("cells/sheet_4.png")).get_pixel(0, 0), &Rgba([80, 200, 0, 255]));
    assert_eq!(open(&temp.path().join("map.png")), sheet);
}

#[test]
fn test_import_too_small_warns() {
    let temp = TempDir::new().unwrap();
    RgbaImage::new(10, 10).save(temp.path().join("tiny.png")).unwrap();

    let output = tkit(temp.path(), &["import", "tiny.png"]);
    assert!(output.status.success());
    assert!(stderr(&output).contains("nothing imported"));
    assert!(!temp.path().join("tiny_tile.png").exists());
}

#[test]
fn test_compose_layout() {
    let temp = TempDir::new().unwrap();
    RgbaImage::from_pixel(8, 8, RED).save(temp.path().join("red.png")).unwrap();
    RgbaImage::from_pixel(4, 4, BLUE).save(temp.path().join("blue.png")).unwrap();
    std::fs::write(
        temp.path().join("layout.json"),
        r#"{
            "name": "meadow",
            "width": 3,
            "height": 2,
            "tileSize": 8,
            "tiles": ["red.png", "blue.png"],
            "fill": 0,
            "cells": [
                { "row": 1, "col": 1, "tile": 1 },
                { "row": 0, "col": 2, "tile": null }
            ]
        }"#,
    )
    .unwrap();

    let output = tkit(temp.path(), &["compose", "layout.json"]);
    assert!(output.status.success(), "compose failed: {}", stderr(&output));

    let map = open(&temp.path().join("meadow.png"));
    assert_eq!(map.dimensions(), (24, 16));
    assert_eq!(*map.get_pixel(0, 0), RED);
    assert_eq!(*map.get_pixel(12, 12), BLUE);
    assert_eq!(*map.get_pixel(20, 4), CLEAR);
}

#[test]
fn test_compose_bad_tile_index() {
    let temp = TempDir::new().unwrap();
    RgbaImage::from_pixel(8, 8, RED).save(temp.path().join("red.png")).unwrap();
    std::fs::write(
        temp.path().join("layout.json"),
        r#"{ "width": 2, "height": 2, "tiles": ["red.png"], "cells": [{ "row": 0, "col": 0, "tile": 3 }] }"#,
    )
    .unwrap();

    let output = tkit(temp.path(), &["compose", "layout.json"]);
    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("out of range"));
}

#[test]
fn test_info_reports_grid() {
    let temp = TempDir::new().unwrap();
    RgbaImage::new(100, 66).save(temp.path().join("sheet.png")).unwrap();

    let output = tkit(temp.path(), &["info", "sheet.png"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("100x66"));
    assert!(stdout.contains("3x2 cells of 32px"));
}

#[test]
fn test_info_grid_matches_import_for_wide_sheets() {
    let temp = TempDir::new().unwrap();
    // 60 cells of 32px with 2px gaps: 60 * 34 - 2
    RgbaImage::new(2038, 32).save(temp.path().join("wide.png")).unwrap();

    let info = tkit(temp.path(), &["info", "wide.png"]);
    assert!(info.status.success());
    let stdout = String::from_utf8_lossy(&info.stdout);
    assert!(stdout.contains("60x1 cells of 32px"), "info output: {}", stdout);
    assert!(stdout.contains("downscaled to 1024x16"), "info output: {}", stdout);

    let import = tkit(temp.path(), &["import", "wide.png", "-o", "cells"]);
    assert!(import.status.success(), "import failed: {}", stderr(&import));
    assert!(String::from_utf8_lossy(&import.stdout).contains("60x1 cells"));
}

#[test]
fn test_config_file_sets_defaults() {
    let temp = TempDir::new().unwrap();
    write_quadrants(&temp.path().join("quads.png"));
    std::fs::write(temp.path().join("tilekit.toml"), "[process]\nsplit = true\ntile_size = 16\n").unwrap();

    let output = tkit(temp.path(), &["process", "quads.png", "-o", "tiles"]);
    assert!(output.status.success(), "process failed: {}", stderr(&output));
    assert!(temp.path().join("tiles/quads_15.png").exists());
    assert!(!temp.path().join("tiles/quads_16.png").exists());
}
