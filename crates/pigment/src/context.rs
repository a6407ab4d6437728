//! Drawing context - the canvas-style drawing API
//!
//! A [`Context`] owns its target image and a current path. Style, transform
//! and clip live in a state value that `save` copies onto a stack and
//! `restore` pops back. Transform operations post-multiply, so each new
//! operation applies in the local space of the ones before it:
//! `M_new = M_current * M_op`.

use std::sync::Arc;

use pigment_core::{
    ensure_finite, BlendMode, HorizontalAlignment, LineCap, LineJoin, Mat3, PigmentError, Result,
    Vec2, WindingRule,
};
use pigment_image::{Image, Mask, Paint};
use pigment_paint::{Path, StrokeOptions};
use pigment_text::{Arrangement, Font, TextTarget, TypesetOptions};
use tracing::trace;

/// Result of [`Context::measure_text`]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TextMetrics {
    pub width: f32,
}

/// Everything `save` captures
#[derive(Clone, Debug)]
struct State {
    fill_style: Paint,
    stroke_style: Paint,
    global_alpha: f32,
    line_width: f32,
    miter_limit: f32,
    line_cap: LineCap,
    line_join: LineJoin,
    font: Option<Font>,
    font_size: f32,
    text_align: HorizontalAlignment,
    line_dash: Vec<f32>,
    transform: Mat3,
    clip: Option<Mask>,
}

impl Default for State {
    fn default() -> Self {
        Self {
            fill_style: Paint::default(),
            stroke_style: Paint::default(),
            global_alpha: 1.0,
            line_width: 1.0,
            miter_limit: 10.0,
            line_cap: LineCap::Butt,
            line_join: LineJoin::Miter,
            font: None,
            font_size: 12.0,
            text_align: HorizontalAlignment::Left,
            line_dash: Vec::new(),
            transform: Mat3::IDENTITY,
            clip: None,
        }
    }
}

#[derive(Debug)]
struct Saved {
    state: State,
    /// Target that was current before `save_layer`
    parent: Option<Image>,
}

/// Stateful drawing surface over an owned [`Image`]
///
/// Not internally synchronized; one writer at a time.
#[derive(Debug)]
pub struct Context {
    image: Image,
    state: State,
    stack: Vec<Saved>,
    path: Path,
}

impl Context {
    pub fn new(image: Image) -> Self {
        Self {
            image,
            state: State::default(),
            stack: Vec::new(),
            path: Path::new(),
        }
    }

    /// Context over a new transparent image
    pub fn with_size(width: u32, height: u32) -> Self {
        Self::new(Image::new(width, height))
    }

    /// The current target; inside `save_layer` this is the layer
    pub fn image(&self) -> &Image {
        &self.image
    }

    /// Finish drawing and take the image, merging any open layers
    pub fn into_image(mut self) -> Image {
        while !self.stack.is_empty() {
            // The stack is non-empty, restore cannot fail
            let _ = self.restore();
        }
        self.image
    }

    // === Style ===

    pub fn fill_style(&self) -> &Paint {
        &self.state.fill_style
    }

    pub fn set_fill_style(&mut self, paint: Paint) {
        self.state.fill_style = paint;
    }

    pub fn stroke_style(&self) -> &Paint {
        &self.state.stroke_style
    }

    pub fn set_stroke_style(&mut self, paint: Paint) {
        self.state.stroke_style = paint;
    }

    pub fn global_alpha(&self) -> f32 {
        self.state.global_alpha
    }

    /// Opacity multiplied into every drawing operation, 0.0 to 1.0
    pub fn set_global_alpha(&mut self, alpha: f32) -> Result<()> {
        ensure_finite("set_global_alpha", &[("alpha", alpha)])?;
        if !(0.0..=1.0).contains(&alpha) {
            return Err(PigmentError::invalid(
                "set_global_alpha",
                format!("alpha must be within 0..=1, got {alpha}"),
            ));
        }
        self.state.global_alpha = alpha;
        Ok(())
    }

    pub fn line_width(&self) -> f32 {
        self.state.line_width
    }

    pub fn set_line_width(&mut self, width: f32) -> Result<()> {
        ensure_finite("set_line_width", &[("width", width)])?;
        if width < 0.0 {
            return Err(PigmentError::invalid(
                "set_line_width",
                format!("width must be >= 0, got {width}"),
            ));
        }
        self.state.line_width = width;
        Ok(())
    }

    pub fn miter_limit(&self) -> f32 {
        self.state.miter_limit
    }

    pub fn set_miter_limit(&mut self, limit: f32) -> Result<()> {
        ensure_finite("set_miter_limit", &[("limit", limit)])?;
        if limit <= 0.0 {
            return Err(PigmentError::invalid(
                "set_miter_limit",
                format!("limit must be > 0, got {limit}"),
            ));
        }
        self.state.miter_limit = limit;
        Ok(())
    }

    pub fn line_cap(&self) -> LineCap {
        self.state.line_cap
    }

    pub fn set_line_cap(&mut self, cap: LineCap) {
        self.state.line_cap = cap;
    }

    pub fn line_join(&self) -> LineJoin {
        self.state.line_join
    }

    pub fn set_line_join(&mut self, join: LineJoin) {
        self.state.line_join = join;
    }

    pub fn line_dash(&self) -> &[f32] {
        &self.state.line_dash
    }

    /// Alternating on/off lengths; empty for a solid line
    pub fn set_line_dash(&mut self, dashes: Vec<f32>) -> Result<()> {
        if let Some(bad) = dashes.iter().find(|d| !d.is_finite() || **d < 0.0) {
            return Err(PigmentError::invalid(
                "set_line_dash",
                format!("dash lengths must be finite and >= 0, got {bad}"),
            ));
        }
        self.state.line_dash = dashes;
        Ok(())
    }

    pub fn font(&self) -> Option<&Font> {
        self.state.font.as_ref()
    }

    pub fn set_font(&mut self, font: Font) {
        self.state.font = Some(font);
    }

    pub fn font_size(&self) -> f32 {
        self.state.font_size
    }

    pub fn set_font_size(&mut self, size: f32) -> Result<()> {
        ensure_finite("set_font_size", &[("size", size)])?;
        if size <= 0.0 {
            return Err(PigmentError::invalid(
                "set_font_size",
                format!("size must be > 0, got {size}"),
            ));
        }
        self.state.font_size = size;
        Ok(())
    }

    pub fn text_align(&self) -> HorizontalAlignment {
        self.state.text_align
    }

    pub fn set_text_align(&mut self, align: HorizontalAlignment) {
        self.state.text_align = align;
    }

    fn stroke_options(&self) -> StrokeOptions {
        StrokeOptions {
            width: self.state.line_width,
            cap: self.state.line_cap,
            join: self.state.line_join,
            miter_limit: self.state.miter_limit,
            dashes: self.state.line_dash.clone(),
        }
    }

    // === State stack ===

    pub fn save(&mut self) {
        self.stack.push(Saved {
            state: self.state.clone(),
            parent: None,
        });
    }

    /// Save, then draw into a fresh transparent layer until the matching `restore`
    pub fn save_layer(&mut self) {
        let layer = Image::new(self.image.width(), self.image.height());
        let parent = std::mem::replace(&mut self.image, layer);
        self.stack.push(Saved {
            state: self.state.clone(),
            parent: Some(parent),
        });
    }

    /// Pop the last saved state, merging a layer through the restored clip
    /// and global alpha
    pub fn restore(&mut self) -> Result<()> {
        let saved = self.stack.pop().ok_or(PigmentError::StackUnderflow)?;
        self.state = saved.state;
        if let Some(parent) = saved.parent {
            let mut layer = std::mem::replace(&mut self.image, parent);
            if let Some(clip) = &self.state.clip {
                layer.draw_mask(clip, &Mat3::IDENTITY, BlendMode::Mask);
            }
            if self.state.global_alpha < 1.0 {
                layer.apply_opacity(self.state.global_alpha);
            }
            self.image.draw(&layer, &Mat3::IDENTITY, BlendMode::Normal);
            trace!(depth = self.stack.len(), "merged layer");
        }
        Ok(())
    }

    // === Transforms ===

    pub fn get_transform(&self) -> Mat3 {
        self.state.transform
    }

    pub fn set_transform(&mut self, transform: Mat3) {
        self.state.transform = transform;
    }

    /// Post-multiply `transform` onto the current matrix
    pub fn transform(&mut self, transform: Mat3) {
        self.state.transform = self.state.transform * transform;
    }

    pub fn reset_transform(&mut self) {
        self.state.transform = Mat3::IDENTITY;
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.transform(Mat3::translate(x, y));
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.transform(Mat3::scale(x, y));
    }

    /// Rotate by `angle` radians
    pub fn rotate(&mut self, angle: f32) {
        self.transform(Mat3::rotate(angle));
    }

    // === Current path ===

    pub fn begin_path(&mut self) {
        self.path.clear();
    }

    pub fn close_path(&mut self) {
        self.path.close_path();
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        self.path.move_to(x, y);
    }

    pub fn line_to(&mut self, x: f32, y: f32) {
        self.path.line_to(x, y);
    }

    pub fn bezier_curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.path.bezier_curve_to(x1, y1, x2, y2, x3, y3);
    }

    pub fn quadratic_curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.path.quadratic_curve_to(x1, y1, x2, y2);
    }

    pub fn arc(&mut self, x: f32, y: f32, r: f32, a0: f32, a1: f32, ccw: bool) -> Result<()> {
        self.path.arc(x, y, r, a0, a1, ccw)
    }

    pub fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, r: f32) -> Result<()> {
        self.path.arc_to(x1, y1, x2, y2, r)
    }

    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        self.path.rect(x, y, w, h, true);
    }

    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect(&mut self, x: f32, y: f32, w: f32, h: f32, nw: f32, ne: f32, se: f32, sw: f32) -> Result<()> {
        self.path.rounded_rect(x, y, w, h, nw, ne, se, sw, true)
    }

    pub fn ellipse(&mut self, x: f32, y: f32, rx: f32, ry: f32) -> Result<()> {
        self.path.ellipse(x, y, rx, ry)
    }

    pub fn circle(&mut self, x: f32, y: f32, r: f32) -> Result<()> {
        self.path.circle(x, y, r)
    }

    pub fn polygon(&mut self, x: f32, y: f32, size: f32, sides: u32) -> Result<()> {
        self.path.polygon(x, y, size, sides)
    }

    // === Painting ===

    /// Run `draw` against the canvas, limited to the clip
    ///
    /// With a clip, `draw` works on a copy of the canvas and each pixel is
    /// then mixed back by its clip coverage, so pixels outside the clip stay
    /// untouched whatever blend mode the draw uses.
    fn draw_clipped(&mut self, draw: impl FnOnce(&mut Image) -> Result<()>) -> Result<()> {
        match &self.state.clip {
            None => draw(&mut self.image),
            Some(clip) => {
                let mut drawn = self.image.clone();
                draw(&mut drawn)?;
                self.image.mix_through_mask(&drawn, clip);
                Ok(())
            }
        }
    }

    /// Run `draw` with `paint` under the global alpha and the clip
    fn paint_with(
        &mut self,
        paint: &Paint,
        draw: impl FnOnce(&mut Image, &Paint) -> Result<()>,
    ) -> Result<()> {
        let mut paint = paint.clone();
        paint.opacity *= self.state.global_alpha;
        self.draw_clipped(|image| draw(image, &paint))
    }

    /// Fill the current path with the fill style
    pub fn fill(&mut self, winding_rule: WindingRule) -> Result<()> {
        let path = self.path.clone();
        self.path_fill(&path, winding_rule)
    }

    pub fn path_fill(&mut self, path: &Path, winding_rule: WindingRule) -> Result<()> {
        let transform = self.state.transform;
        let style = self.state.fill_style.clone();
        self.paint_with(&style, |image, paint| {
            image.fill_path(path, paint, &transform, winding_rule)
        })
    }

    /// Stroke the current path with the stroke style and line settings
    pub fn stroke(&mut self) -> Result<()> {
        let path = self.path.clone();
        self.path_stroke(&path)
    }

    pub fn path_stroke(&mut self, path: &Path) -> Result<()> {
        let transform = self.state.transform;
        let stroke = self.stroke_options();
        let style = self.state.stroke_style.clone();
        self.paint_with(&style, |image, paint| {
            image.stroke_path(path, paint, &transform, &stroke)
        })
    }

    /// Intersect the clip with the current path
    pub fn clip(&mut self, winding_rule: WindingRule) {
        let path = self.path.clone();
        self.path_clip(&path, winding_rule);
    }

    pub fn path_clip(&mut self, path: &Path, winding_rule: WindingRule) {
        let mut coverage = Mask::new(self.image.width(), self.image.height());
        coverage.fill_path(path, &self.state.transform, winding_rule, BlendMode::Normal);
        match &mut self.state.clip {
            Some(clip) => clip.draw(&coverage, &Mat3::IDENTITY, BlendMode::Mask),
            None => self.state.clip = Some(coverage),
        }
    }

    fn rect_path(x: f32, y: f32, w: f32, h: f32) -> Path {
        let mut path = Path::new();
        path.rect(x, y, w, h, true);
        path
    }

    /// Make the transformed rectangle transparent inside the clip,
    /// ignoring global alpha and the fill style
    pub fn clear_rect(&mut self, x: f32, y: f32, w: f32, h: f32) -> Result<()> {
        let mut paint = Paint::solid(pigment_core::Color::TRANSPARENT);
        paint.blend_mode = BlendMode::Overwrite;
        let transform = self.state.transform;
        let rect = Self::rect_path(x, y, w, h);
        self.draw_clipped(|image| image.fill_path(&rect, &paint, &transform, WindingRule::NonZero))
    }

    /// Fill a rectangle without touching the current path
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) -> Result<()> {
        self.path_fill(&Self::rect_path(x, y, w, h), WindingRule::NonZero)
    }

    pub fn stroke_rect(&mut self, x: f32, y: f32, w: f32, h: f32) -> Result<()> {
        self.path_stroke(&Self::rect_path(x, y, w, h))
    }

    // === Images ===

    /// Draw `image` with its top-left corner at `(dx, dy)`
    pub fn draw_image(&mut self, image: &Image, dx: f32, dy: f32) -> Result<()> {
        let (w, h) = (image.width() as f32, image.height() as f32);
        self.draw_image_rect(image, 0.0, 0.0, w, h, dx, dy, w, h)
    }

    /// Draw `image` stretched to `dw` by `dh`
    pub fn draw_image_scaled(&mut self, image: &Image, dx: f32, dy: f32, dw: f32, dh: f32) -> Result<()> {
        let (w, h) = (image.width() as f32, image.height() as f32);
        self.draw_image_rect(image, 0.0, 0.0, w, h, dx, dy, dw, dh)
    }

    /// Draw the source rectangle of `image` into the destination rectangle
    #[allow(clippy::too_many_arguments)]
    pub fn draw_image_rect(
        &mut self,
        image: &Image,
        sx: f32,
        sy: f32,
        sw: f32,
        sh: f32,
        dx: f32,
        dy: f32,
        dw: f32,
        dh: f32,
    ) -> Result<()> {
        ensure_finite(
            "draw_image",
            &[("sx", sx), ("sy", sy), ("sw", sw), ("sh", sh), ("dx", dx), ("dy", dy), ("dw", dw), ("dh", dh)],
        )?;
        if sw <= 0.0 || sh <= 0.0 {
            return Err(PigmentError::invalid(
                "draw_image",
                format!("source size must be positive, got {sw}x{sh}"),
            ));
        }
        if dw == 0.0 || dh == 0.0 || image.width() == 0 || image.height() == 0 {
            return Ok(());
        }

        let placement = self.state.transform
            * Mat3::translate(dx, dy)
            * Mat3::scale(dw / sw, dh / sh)
            * Mat3::translate(-sx, -sy);
        let paint = Paint::image(Arc::new(image.clone()), placement, false);
        let transform = self.state.transform;
        let rect = Self::rect_path(dx, dy, dw, dh);
        self.paint_with(&paint, |target, paint| {
            target.fill_path(&rect, paint, &transform, WindingRule::NonZero)
        })
    }

    // === Text ===

    /// Lay out `text` in the current font, size and alignment
    fn arrange(&self, op: &'static str, text: &str, paint: &Paint) -> Result<Arrangement> {
        let Some(font) = &self.state.font else {
            return Err(PigmentError::invalid(op, "no font set"));
        };
        let mut font = font.clone();
        font.size = self.state.font_size;
        font.set_paint(paint.clone());
        let options = TypesetOptions {
            h_align: self.state.text_align,
            ..TypesetOptions::default()
        };
        Ok(font.typeset(text, &options))
    }

    /// Transform that puts the first baseline at `(x, y)`
    fn text_transform(&self, arrangement: &Arrangement, x: f32, y: f32) -> Mat3 {
        let baseline = arrangement.positions.first().map(|p| p.y).unwrap_or(0.0);
        self.state.transform * Mat3::translate(x, y - baseline)
    }

    /// Fill `text` with its baseline starting at `(x, y)`
    pub fn fill_text(&mut self, text: &str, x: f32, y: f32) -> Result<()> {
        let style = self.state.fill_style.clone();
        let arrangement = self.arrange("fill_text", text, &style)?;
        let transform = self.text_transform(&arrangement, x, y);
        self.paint_with(&style, move |image, paint| {
            let mut arrangement = arrangement;
            for font in &mut arrangement.fonts {
                font.set_paint(paint.clone());
            }
            image.fill_arrangement(&arrangement, &transform)
        })
    }

    pub fn stroke_text(&mut self, text: &str, x: f32, y: f32) -> Result<()> {
        let style = self.state.stroke_style.clone();
        let arrangement = self.arrange("stroke_text", text, &style)?;
        let transform = self.text_transform(&arrangement, x, y);
        let stroke = self.stroke_options();
        self.paint_with(&style, move |image, paint| {
            let mut arrangement = arrangement;
            for font in &mut arrangement.fonts {
                font.set_paint(paint.clone());
            }
            image.stroke_arrangement(&arrangement, &transform, &stroke)
        })
    }

    pub fn measure_text(&self, text: &str) -> Result<TextMetrics> {
        let arrangement = self.arrange("measure_text", text, &self.state.fill_style)?;
        Ok(TextMetrics {
            width: arrangement.layout_size().x,
        })
    }

    // === Hit testing ===

    /// Whether device point `(x, y)` is inside the current path
    pub fn is_point_in_path(&self, x: f32, y: f32, winding_rule: WindingRule) -> bool {
        self.path_is_point_in_path(&self.path, x, y, winding_rule)
    }

    pub fn path_is_point_in_path(&self, path: &Path, x: f32, y: f32, winding_rule: WindingRule) -> bool {
        path.fill_overlaps(Vec2::new(x, y), &self.state.transform, winding_rule)
    }

    /// Whether device point `(x, y)` is inside the stroke of the current path
    pub fn is_point_in_stroke(&self, x: f32, y: f32) -> bool {
        self.path_is_point_in_stroke(&self.path, x, y)
    }

    pub fn path_is_point_in_stroke(&self, path: &Path, x: f32, y: f32) -> bool {
        path.stroke_overlaps(Vec2::new(x, y), &self.state.transform, &self.stroke_options())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigment_core::{Color, ErrorKind, PremulRgba8};

    #[test]
    fn test_defaults() {
        let ctx = Context::with_size(4, 4);
        assert_eq!(ctx.miter_limit(), 10.0);
        assert_eq!(ctx.line_width(), 1.0);
        assert_eq!(ctx.font_size(), 12.0);
        assert_eq!(ctx.global_alpha(), 1.0);
        assert!(ctx.font().is_none());
        assert!(ctx.get_transform().is_identity());
    }

    #[test]
    fn test_transforms_apply_in_local_space() {
        let mut ctx = Context::with_size(4, 4);
        ctx.translate(10.0, 0.0);
        ctx.scale(2.0, 2.0);
        let p = ctx.get_transform().transform_point(Vec2::new(1.0, 1.0));
        assert_eq!(p, Vec2::new(12.0, 2.0));
        ctx.reset_transform();
        assert!(ctx.get_transform().is_identity());
    }

    #[test]
    fn test_fill_rect_uses_fill_style() {
        let mut ctx = Context::with_size(10, 10);
        ctx.set_fill_style(Paint::solid(Color::RED));
        ctx.fill_rect(2.0, 2.0, 4.0, 4.0).unwrap();
        assert_eq!(ctx.image().get_pixel(3, 3), PremulRgba8::new(255, 0, 0, 255));
        assert_eq!(ctx.image().get_pixel(7, 7), PremulRgba8::TRANSPARENT);
    }

    #[test]
    fn test_global_alpha_scales_drawing() {
        let mut ctx = Context::with_size(4, 4);
        ctx.set_global_alpha(0.5).unwrap();
        ctx.fill_rect(0.0, 0.0, 4.0, 4.0).unwrap();
        assert_eq!(ctx.image().get_pixel(1, 1).a, 128);
        assert!(ctx.set_global_alpha(1.5).is_err());
        assert_eq!(ctx.global_alpha(), 0.5);
    }

    #[test]
    fn test_clip_intersects() {
        let mut ctx = Context::with_size(10, 10);
        ctx.rect(0.0, 0.0, 6.0, 10.0);
        ctx.clip(WindingRule::NonZero);
        ctx.begin_path();
        ctx.rect(4.0, 0.0, 6.0, 10.0);
        ctx.clip(WindingRule::NonZero);
        ctx.fill_rect(0.0, 0.0, 10.0, 10.0).unwrap();
        assert_eq!(ctx.image().get_pixel(2, 5).a, 0);
        assert_eq!(ctx.image().get_pixel(5, 5).a, 255);
        assert_eq!(ctx.image().get_pixel(8, 5).a, 0);
    }

    #[test]
    fn test_clear_rect() {
        let mut ctx = Context::with_size(6, 6);
        ctx.fill_rect(0.0, 0.0, 6.0, 6.0).unwrap();
        ctx.clear_rect(0.0, 0.0, 3.0, 6.0).unwrap();
        assert_eq!(ctx.image().get_pixel(1, 1), PremulRgba8::TRANSPARENT);
        assert_eq!(ctx.image().get_pixel(4, 1).a, 255);
    }

    #[test]
    fn test_clear_rect_respects_clip() {
        let mut ctx = Context::with_size(6, 6);
        ctx.fill_rect(0.0, 0.0, 6.0, 6.0).unwrap();
        ctx.rect(0.0, 0.0, 3.0, 6.0);
        ctx.clip(WindingRule::NonZero);
        ctx.clear_rect(0.0, 0.0, 6.0, 6.0).unwrap();
        assert_eq!(ctx.image().get_pixel(1, 1), PremulRgba8::TRANSPARENT);
        assert_eq!(ctx.image().get_pixel(4, 1), PremulRgba8::new(0, 0, 0, 255));
    }

    fn clipped_canvas(mode: BlendMode) -> Context {
        let mut ctx = Context::with_size(10, 10);
        ctx.set_fill_style(Paint::solid(Color::GREEN));
        ctx.fill_rect(0.0, 0.0, 10.0, 10.0).unwrap();
        ctx.rect(0.0, 0.0, 5.0, 10.0);
        ctx.clip(WindingRule::NonZero);
        let mut paint = Paint::solid(Color::RED);
        paint.blend_mode = mode;
        ctx.set_fill_style(paint);
        ctx
    }

    #[test]
    fn test_clipped_mask_modes_keep_outside_pixels() {
        let green = PremulRgba8::new(0, 255, 0, 255);
        for mode in [
            BlendMode::Overwrite,
            BlendMode::Mask,
            BlendMode::SubtractMask,
            BlendMode::ExcludeMask,
        ] {
            let mut ctx = clipped_canvas(mode);
            ctx.fill_rect(0.0, 0.0, 2.0, 2.0).unwrap();
            assert_eq!(ctx.image().get_pixel(8, 5), green, "{:?} outside the clip", mode);
            assert_eq!(ctx.image().get_pixel(8, 8), green, "{:?} outside the clip", mode);
        }
    }

    #[test]
    fn test_clipped_mask_modes_inside_clip() {
        let green = PremulRgba8::new(0, 255, 0, 255);
        let red = PremulRgba8::new(255, 0, 0, 255);

        let mut ctx = clipped_canvas(BlendMode::Overwrite);
        ctx.fill_rect(0.0, 0.0, 2.0, 2.0).unwrap();
        assert_eq!(ctx.image().get_pixel(1, 1), red);
        assert_eq!(ctx.image().get_pixel(3, 3), green);

        // Mask keeps the destination only where the shape covers it
        let mut ctx = clipped_canvas(BlendMode::Mask);
        ctx.fill_rect(0.0, 0.0, 2.0, 2.0).unwrap();
        assert_eq!(ctx.image().get_pixel(1, 1), green);
        assert_eq!(ctx.image().get_pixel(3, 3), PremulRgba8::TRANSPARENT);

        let mut ctx = clipped_canvas(BlendMode::SubtractMask);
        ctx.fill_rect(0.0, 0.0, 2.0, 2.0).unwrap();
        assert_eq!(ctx.image().get_pixel(1, 1), PremulRgba8::TRANSPARENT);
        assert_eq!(ctx.image().get_pixel(3, 3), green);
    }

    #[test]
    fn test_save_layer_merges_with_alpha() {
        let mut ctx = Context::with_size(4, 4);
        ctx.set_global_alpha(0.5).unwrap();
        ctx.save_layer();
        ctx.set_global_alpha(1.0).unwrap();
        ctx.fill_rect(0.0, 0.0, 4.0, 4.0).unwrap();
        // Layer is isolated until restore
        assert_eq!(ctx.image().get_pixel(0, 0).a, 255);
        ctx.restore().unwrap();
        assert_eq!(ctx.image().get_pixel(0, 0).a, 128);
    }

    #[test]
    fn test_into_image_merges_open_layers() {
        let mut ctx = Context::with_size(2, 2);
        ctx.save_layer();
        ctx.fill_rect(0.0, 0.0, 2.0, 2.0).unwrap();
        let image = ctx.into_image();
        assert!(image.is_opaque());
    }

    #[test]
    fn test_point_queries() {
        let mut ctx = Context::with_size(10, 10);
        ctx.translate(5.0, 0.0);
        ctx.rect(0.0, 0.0, 4.0, 4.0);
        assert!(ctx.is_point_in_path(6.0, 2.0, WindingRule::NonZero));
        assert!(!ctx.is_point_in_path(2.0, 2.0, WindingRule::NonZero));
        assert!(ctx.is_point_in_stroke(5.0, 2.0));
        assert!(!ctx.is_point_in_stroke(7.0, 2.0));
    }

    #[test]
    fn test_text_needs_a_font() {
        let mut ctx = Context::with_size(4, 4);
        let err = ctx.fill_text("hi", 0.0, 0.0).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(ctx.measure_text("hi").is_err());
    }

    #[test]
    fn test_draw_image_places_pixels() {
        let mut source = Image::new(2, 2);
        source.fill(Color::GREEN);
        let mut ctx = Context::with_size(6, 6);
        ctx.draw_image(&source, 3.0, 1.0).unwrap();
        assert_eq!(ctx.image().get_pixel(3, 1), PremulRgba8::new(0, 255, 0, 255));
        assert_eq!(ctx.image().get_pixel(4, 2), PremulRgba8::new(0, 255, 0, 255));
        assert_eq!(ctx.image().get_pixel(2, 1), PremulRgba8::TRANSPARENT);
        assert_eq!(ctx.image().get_pixel(5, 1), PremulRgba8::TRANSPARENT);
    }

    #[test]
    fn test_invalid_style_values_are_rejected() {
        let mut ctx = Context::with_size(1, 1);
        assert!(ctx.set_line_width(-1.0).is_err());
        assert!(ctx.set_miter_limit(0.0).is_err());
        assert!(ctx.set_line_dash(vec![1.0, f32::NAN]).is_err());
        assert!(ctx.set_font_size(0.0).is_err());
        assert!(ctx.line_dash().is_empty());
    }

    #[test]
    fn test_bad_dash_entry_keeps_previous_pattern() {
        let mut ctx = Context::with_size(1, 1);
        ctx.set_line_dash(vec![4.0, 2.0]).unwrap();
        for bad in [-1.0, f32::INFINITY, f32::NAN] {
            let err = ctx.set_line_dash(vec![3.0, bad]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidArgument);
            assert_eq!(ctx.line_dash(), &[4.0, 2.0]);
        }
    }
}
