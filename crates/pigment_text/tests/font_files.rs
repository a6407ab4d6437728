//! Loading typefaces from disk and drawing with them

use std::sync::Arc;

use pigment_core::{Color, ErrorKind, Mat3, Vec2};
use pigment_image::{Image, Paint};
use pigment_text::{read_font, read_typeface, typeset, Span, TextTarget, Typeface, TypesetOptions};

const FONT: &str = r#"<svg xmlns="http://www.w3.org/2000/svg"><defs>
  <font horiz-adv-x="500">
    <font-face units-per-em="1000" ascent="750" descent="-250"/>
    <glyph unicode="I" horiz-adv-x="400" d="M 100 0 L 300 0 L 300 750 L 100 750 Z"/>
    <glyph unicode="-" horiz-adv-x="400" d="M 0 300 L 400 300 L 400 400 L 0 400 Z"/>
  </font>
</defs></svg>"#;

fn write_font(dir: &tempfile::TempDir) -> std::path::PathBuf {
    let path = dir.path().join("bars.svg");
    std::fs::write(&path, FONT).unwrap();
    path
}

#[test]
fn test_read_svg_typeface_records_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_font(&dir);
    let typeface = read_typeface(&path).unwrap();
    assert_eq!(typeface.file_path(), Some(path.as_path()));
    assert_eq!(typeface.ascent(), 750.0);

    let font = read_font(&path).unwrap();
    assert_eq!(font.size, 12.0);
    assert!(Arc::ptr_eq(font.typeface(), font.clone().typeface()));
}

#[test]
fn test_missing_font_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = read_typeface(dir.path().join("absent.ttf")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
}

#[test]
fn test_spans_draw_with_their_own_paints() {
    let typeface = Arc::new(Typeface::parse_svg_font(FONT).unwrap());
    let mut red = pigment_text::Font::new(typeface.clone());
    red.size = 20.0;
    red.set_paint(Paint::solid(Color::RED));
    let mut blue = red.clone();
    blue.set_paint(Paint::solid(Color::BLUE));

    let arrangement = typeset(
        &[Span::new("I", red), Span::new("I", blue)],
        &TypesetOptions::default(),
    );
    // Each bar is 4px wide starting 2px into an 8px advance
    assert_eq!(arrangement.positions[1], Vec2::new(8.0, 15.0));

    let mut image = Image::new(20, 20);
    image.fill_arrangement(&arrangement, &Mat3::IDENTITY).unwrap();
    assert_eq!(image.get_color(3, 10), Color::RED);
    assert_eq!(image.get_color(11, 10), Color::BLUE);
    assert!(image.get_pixel(7, 10).a == 0);
}
