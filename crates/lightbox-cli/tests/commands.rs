//! End-to-end tests for the CLI commands against real files.

use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use lightbox_cli::commands::{filter_image, print_session, render_session};
use lightbox_core::FilterMode;
use tempfile::TempDir;

fn write_image(dir: &Path, name: &str, pixels: &[[u8; 4]]) -> PathBuf {
    let mut image = RgbaImage::new(pixels.len() as u32, 1);
    for (x, pixel) in pixels.iter().enumerate() {
        image.put_pixel(x as u32, 0, Rgba(*pixel));
    }
    let path = dir.join(name);
    image.save(&path).unwrap();
    path
}

fn read_pixels(path: &Path) -> Vec<u8> {
    image::open(path).unwrap().to_rgba8().into_raw()
}

fn layer_json(path: &Path, mode: &str) -> String {
    format!(
        r#"{{"path": {:?}, "mode": {{"type": "{}", "blinking": false, "blinkInterval": 10, "thresholdValue": 50, "grayscale": false}}}}"#,
        path.to_str().unwrap(),
        mode
    )
}

/// Two layers: a light gray one (active) and a dark one, both thresholded.
fn write_session(dir: &Path) -> PathBuf {
    let light = write_image(dir, "light.png", &[[200, 200, 200, 255]]);
    let dark = write_image(dir, "dark.png", &[[40, 40, 40, 255]]);
    let json = format!(
        r#"{{
            "isDarkTheme": false, "blinking": false, "grayscale": false,
            "threshold": 50, "blinkInterval": 10, "rotate": 0, "perspective": 200,
            "anglePerspective": -1, "top": 390, "left": 200, "activeLayer": 0,
            "layers": [{}, {}],
            "modeType": "threshold", "width": 500
        }}"#,
        layer_json(&light, "threshold"),
        layer_json(&dark, "threshold_inverted")
    );
    let path = dir.join("session.json");
    std::fs::write(&path, json).unwrap();
    path
}

#[test]
fn test_filter_threshold() {
    let dir = TempDir::new().unwrap();
    let input = write_image(
        dir.path(),
        "in.png",
        &[[200, 100, 50, 255], [10, 240, 10, 128]],
    );
    let output = dir.path().join("out.png");

    filter_image(&input, FilterMode::Threshold, 50.0, false, &output).unwrap();
    assert_eq!(
        read_pixels(&output),
        vec![0, 0, 0, 255, 255, 255, 255, 128]
    );
}

#[test]
fn test_filter_grayscale_only() {
    let dir = TempDir::new().unwrap();
    let input = write_image(dir.path(), "in.png", &[[200, 100, 50, 255]]);
    let output = dir.path().join("out.png");

    filter_image(&input, FilterMode::Normal, 50.0, true, &output).unwrap();
    assert_eq!(read_pixels(&output), vec![118, 118, 118, 255]);
}

#[test]
fn test_filter_rejects_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("notes.txt");
    std::fs::write(&input, "hello").unwrap();

    let result = filter_image(
        &input,
        FilterMode::Normal,
        50.0,
        false,
        &dir.path().join("out.png"),
    );
    assert!(result.is_err());
}

#[test]
fn test_filter_missing_file() {
    let dir = TempDir::new().unwrap();
    let output = dir.path().join("out.png");
    let result = filter_image(
        &dir.path().join("missing.png"),
        FilterMode::Normal,
        50.0,
        false,
        &output,
    );
    assert!(result.is_err());
    assert!(!output.exists());
}

#[test]
fn test_render_session_active_layer() {
    let dir = TempDir::new().unwrap();
    let session = write_session(dir.path());
    let output = dir.path().join("active.png");

    render_session(&session, None, &output).unwrap();
    assert_eq!(read_pixels(&output), vec![255, 255, 255, 255]);
}

#[test]
fn test_render_session_selected_layer() {
    let dir = TempDir::new().unwrap();
    let session = write_session(dir.path());
    let output = dir.path().join("layer1.png");

    // Dark layer, inverted threshold: below the cutoff becomes white
    render_session(&session, Some(1), &output).unwrap();
    assert_eq!(read_pixels(&output), vec![255, 255, 255, 255]);

    assert!(render_session(&session, Some(5), &output).is_err());
}

#[test]
fn test_print_session() {
    let dir = TempDir::new().unwrap();
    let session = write_session(dir.path());

    let mut out = Vec::new();
    print_session(&session, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    assert!(text.contains("Layers: 2"));
    assert!(text.contains("* 0:"));
    assert!(text.contains("threshold_inverted"));
    assert!(text.contains("perspective(200px)"));
}

#[test]
fn test_print_session_invalid_json() {
    let dir = TempDir::new().unwrap();
    let session = dir.path().join("broken.json");
    std::fs::write(&session, "{ not json").unwrap();

    assert!(print_session(&session, &mut Vec::new()).is_err());
}
