//! Drawing arranged text into images and masks

use pigment_core::{BlendMode, Mat3, Result, WindingRule};
use pigment_image::{Image, Mask};
use pigment_paint::StrokeOptions;

use crate::font::Font;
use crate::typeset::{Arrangement, TypesetOptions};

/// A raster surface text can be drawn into
///
/// Glyphs and decorations of one span are filled as a single path, so
/// overlapping outlines never double-cover. Images use every paint of the span's font in order;
/// masks record coverage only.
pub trait TextTarget {
    fn fill_arrangement(&mut self, arrangement: &Arrangement, transform: &Mat3) -> Result<()>;

    fn stroke_arrangement(
        &mut self,
        arrangement: &Arrangement,
        transform: &Mat3,
        stroke: &StrokeOptions,
    ) -> Result<()>;

    /// Typeset `text` in `font` and fill it
    fn fill_text(
        &mut self,
        font: &Font,
        text: &str,
        transform: &Mat3,
        options: &TypesetOptions,
    ) -> Result<()> {
        self.fill_arrangement(&font.typeset(text, options), transform)
    }

    /// Typeset `text` in `font` and stroke the glyph outlines
    fn stroke_text(
        &mut self,
        font: &Font,
        text: &str,
        transform: &Mat3,
        stroke: &StrokeOptions,
        options: &TypesetOptions,
    ) -> Result<()> {
        self.stroke_arrangement(&font.typeset(text, options), transform, stroke)
    }
}

impl TextTarget for Image {
    fn fill_arrangement(&mut self, arrangement: &Arrangement, transform: &Mat3) -> Result<()> {
        let paths = arrangement.combined_paths();
        for (font, path) in arrangement.fonts.iter().zip(&paths) {
            if path.is_empty() {
                continue;
            }
            for paint in &font.paints {
                self.fill_path(path, paint, transform, WindingRule::NonZero)?;
            }
        }
        Ok(())
    }

    fn stroke_arrangement(
        &mut self,
        arrangement: &Arrangement,
        transform: &Mat3,
        stroke: &StrokeOptions,
    ) -> Result<()> {
        let paths = arrangement.combined_paths();
        for (font, path) in arrangement.fonts.iter().zip(&paths) {
            if path.is_empty() {
                continue;
            }
            for paint in &font.paints {
                self.stroke_path(path, paint, transform, stroke)?;
            }
        }
        Ok(())
    }
}

impl TextTarget for Mask {
    fn fill_arrangement(&mut self, arrangement: &Arrangement, transform: &Mat3) -> Result<()> {
        for path in arrangement.combined_paths().iter().filter(|p| !p.is_empty()) {
            self.fill_path(path, transform, WindingRule::NonZero, BlendMode::Normal);
        }
        Ok(())
    }

    fn stroke_arrangement(
        &mut self,
        arrangement: &Arrangement,
        transform: &Mat3,
        stroke: &StrokeOptions,
    ) -> Result<()> {
        for path in arrangement.combined_paths().iter().filter(|p| !p.is_empty()) {
            self.stroke_path(path, transform, stroke, BlendMode::Normal);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeface::tests::SQUARE_FONT;
    use crate::typeface::Typeface;
    use pigment_core::{Color, PremulRgba8};
    use pigment_image::Paint;
    use std::sync::Arc;

    fn font() -> Font {
        let mut font = Font::new(Arc::new(Typeface::parse_svg_font(SQUARE_FONT).unwrap()));
        font.size = 10.0;
        font
    }

    #[test]
    fn test_fill_text_into_image() {
        let mut font = font();
        font.set_paint(Paint::solid(Color::RED));
        let mut image = Image::new(20, 12);
        image
            .fill_text(&font, "A", &Mat3::translate(2.0, 0.0), &TypesetOptions::default())
            .unwrap();
        // The square glyph covers x 2..8, y 1..8
        assert_eq!(image.get_pixel(4, 4), PremulRgba8::new(255, 0, 0, 255));
        assert_eq!(image.get_pixel(10, 4), PremulRgba8::TRANSPARENT);
        assert_eq!(image.get_pixel(4, 10), PremulRgba8::TRANSPARENT);
    }

    #[test]
    fn test_every_paint_is_applied() {
        let mut font = font();
        font.paints = vec![Paint::solid(Color::RED), Paint::solid(Color::BLUE.with_alpha(0.5))];
        let mut image = Image::new(10, 10);
        image
            .fill_text(&font, "A", &Mat3::IDENTITY, &TypesetOptions::default())
            .unwrap();
        let pixel = image.get_pixel(3, 4);
        assert_eq!(pixel.a, 255);
        assert!(pixel.r > 100 && pixel.b > 100, "{:?}", pixel);
    }

    #[test]
    fn test_translucent_decoration_blends_once() {
        let mut font = font();
        font.strikethrough = true;
        font.set_paint(Paint::solid(Color::BLUE.with_alpha(0.5)));
        let mut image = Image::new(10, 12);
        image
            .fill_text(&font, "A", &Mat3::IDENTITY, &TypesetOptions::default())
            .unwrap();
        // Baseline 8, strikeout band at y 5.35..5.85 across the glyph
        assert_eq!(image.get_pixel(3, 4).a, 128);
        assert_eq!(image.get_pixel(3, 5), image.get_pixel(3, 4));
    }

    #[test]
    fn test_mask_text_and_stroke() {
        let font = font();
        let mut filled = Mask::new(10, 10);
        filled
            .fill_text(&font, "A", &Mat3::IDENTITY, &TypesetOptions::default())
            .unwrap();
        assert_eq!(filled.get_value(3, 4), 255);

        let mut stroked = Mask::new(10, 10);
        stroked
            .stroke_text(
                &font,
                "A",
                &Mat3::IDENTITY,
                &StrokeOptions::default(),
                &TypesetOptions::default(),
            )
            .unwrap();
        assert_eq!(stroked.get_value(3, 4), 0, "stroke leaves the interior empty");
        assert!(stroked.get_value(0, 4) > 0);
    }
}
