//! Integration tests for writing and reading raster files
//!
//! These tests verify that:
//! - PNG round trips are pixel-identical for premultiplied data
//! - BMP keeps opaque pixels and GIF keeps dimensions
//! - Masks survive a grayscale round trip with every value intact
//! - Unreadable paths surface as I/O errors naming the path

use pigment_core::{BlendMode, Color, ErrorKind, Mat3, PremulRgba8, WindingRule};
use pigment_image::{read_image, read_mask, Image, Mask, Paint};
use pigment_paint::parse_path;

fn sample_image() -> Image {
    let mut image = Image::new(16, 12);
    image.fill(Color::new(0.1, 0.3, 0.9, 0.25));
    let path = parse_path("M 2 2 L 14 3 L 8 10 Z").unwrap();
    image
        .fill_path(&path, &Paint::solid(Color::RED.with_alpha(0.7)), &Mat3::IDENTITY, WindingRule::NonZero)
        .unwrap();
    image
}

/// PNG keeps every premultiplied pixel exactly
#[test]
fn test_png_file_round_trip_is_pixel_identical() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.png");
    let image = sample_image();

    image.write_file(&path).unwrap();
    let back = read_image(&path).unwrap();

    assert_eq!(back.wh(), image.wh());
    assert_eq!(back, image, "PNG must round trip exactly");
}

#[test]
fn test_bmp_and_gif_keep_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let mut image = Image::new(9, 7);
    image.fill(Color::GREEN);

    let bmp = dir.path().join("opaque.bmp");
    image.write_file(&bmp).unwrap();
    let back = read_image(&bmp).unwrap();
    assert_eq!(back.wh(), (9, 7));
    assert_eq!(back.get_pixel(4, 3), PremulRgba8::new(0, 255, 0, 255));

    // GIF palettes are quantized, so only the shape is stable
    let gif = dir.path().join("opaque.gif");
    image.write_file(&gif).unwrap();
    assert_eq!(read_image(&gif).unwrap().wh(), (9, 7));
}

#[test]
fn test_mask_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("mask.png");
    let mut mask = Mask::new(8, 8);
    let circle = parse_path("M 4 0 A 4 4 0 1 1 4 8 A 4 4 0 1 1 4 0 Z").unwrap();
    mask.fill_path(&circle, &Mat3::IDENTITY, WindingRule::NonZero, BlendMode::Normal);

    mask.write_file(&path).unwrap();
    // Grayscale reads back as an opaque image carrying the values in luma
    let image = read_image(&path).unwrap();
    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(image.get_pixel(x, y).r, mask.get_value(x, y));
        }
    }
    assert_eq!(read_mask(&path).unwrap(), mask);
}

#[test]
fn test_partial_mask_values_survive_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.png");
    let mut mask = Mask::new(4, 4);
    mask.data_mut()[5] = 200;

    mask.write_file(&path).unwrap();
    let back = read_mask(&path).unwrap();

    assert_eq!(back.get_value(1, 1), 200);
    assert_eq!(back, mask);
}

#[test]
fn test_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.png");
    let err = read_image(&missing).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    assert!(err.to_string().contains("nope.png"));
}
