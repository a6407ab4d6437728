//! Sized, styled use of a typeface

use std::path::Path as FsPath;
use std::sync::Arc;

use pigment_core::{Result, TextCase, Vec2, AUTO_LINE_HEIGHT};
use pigment_image::Paint;

use crate::typeface::{read_typeface, Typeface};
use crate::typeset::{typeset, Arrangement, Span, TypesetOptions};

/// A typeface at a size, with paints and decorations
#[derive(Clone, Debug)]
pub struct Font {
    typeface: Arc<Typeface>,
    /// Pixels per em
    pub size: f32,
    /// Pixels, or [`AUTO_LINE_HEIGHT`] to use the typeface metrics
    pub line_height: f32,
    /// Every paint is applied in order when the text is drawn
    pub paints: Vec<Paint>,
    pub text_case: TextCase,
    pub underline: bool,
    pub strikethrough: bool,
    pub no_kerning_adjustments: bool,
}

impl Font {
    pub fn new(typeface: Arc<Typeface>) -> Self {
        Self {
            typeface,
            size: 12.0,
            line_height: AUTO_LINE_HEIGHT,
            paints: vec![Paint::default()],
            text_case: TextCase::Normal,
            underline: false,
            strikethrough: false,
            no_kerning_adjustments: false,
        }
    }

    pub fn typeface(&self) -> &Arc<Typeface> {
        &self.typeface
    }

    /// Font units to pixels
    pub fn scale(&self) -> f32 {
        self.size / self.typeface.units_per_em()
    }

    /// Line height derived from the typeface metrics, in pixels
    pub fn default_line_height(&self) -> f32 {
        self.typeface.line_height() * self.scale()
    }

    /// The line height text is laid out with
    pub fn resolved_line_height(&self) -> f32 {
        if self.line_height == AUTO_LINE_HEIGHT || self.line_height < 0.0 {
            self.default_line_height()
        } else {
            self.line_height
        }
    }

    /// First paint, if any
    pub fn paint(&self) -> Option<&Paint> {
        self.paints.first()
    }

    /// Replace all paints with a single one
    pub fn set_paint(&mut self, paint: Paint) {
        self.paints = vec![paint];
    }

    /// Lay out `text` in this font
    pub fn typeset(&self, text: &str, options: &TypesetOptions) -> Arrangement {
        typeset(&[Span::new(text, self.clone())], options)
    }

    /// Width of the widest line and total height of `text`, unbounded
    pub fn compute_bounds(&self, text: &str) -> Vec2 {
        self.typeset(text, &TypesetOptions::default()).layout_size()
    }
}

/// Load a typeface and wrap it in a default [`Font`]
pub fn read_font(path: impl AsRef<FsPath>) -> Result<Font> {
    Ok(Font::new(Arc::new(read_typeface(path)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::typeface::tests::SQUARE_FONT;

    fn font() -> Font {
        Font::new(Arc::new(Typeface::parse_svg_font(SQUARE_FONT).unwrap()))
    }

    #[test]
    fn test_defaults() {
        let font = font();
        assert_eq!(font.size, 12.0);
        assert_eq!(font.line_height, AUTO_LINE_HEIGHT);
        assert_eq!(font.paints.len(), 1);
        assert_eq!(font.text_case, TextCase::Normal);
        assert!(!font.underline && !font.strikethrough);
    }

    #[test]
    fn test_scale_and_line_height() {
        let mut font = font();
        font.size = 20.0;
        assert!((font.scale() - 0.02).abs() < 1e-6);
        assert!((font.default_line_height() - 20.0).abs() < 1e-4);
        assert!((font.resolved_line_height() - 20.0).abs() < 1e-4);
        font.line_height = 30.0;
        assert_eq!(font.resolved_line_height(), 30.0);
    }

    #[test]
    fn test_compute_bounds_measures_lines() {
        let mut font = font();
        font.size = 10.0;
        let size = font.compute_bounds("AB\nB");
        // "A" 6px, kerned -1px, "B" 6px
        assert!((size.x - 11.0).abs() < 1e-4, "{:?}", size);
        assert!((size.y - 20.0).abs() < 1e-4, "{:?}", size);
    }
}
