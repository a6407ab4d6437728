//! Compositing rasters, paints and paths onto images and masks

use pigment_core::{BlendMode, Mat3, PremulRgba8, Rect, Result, Vec2, WindingRule};
use pigment_paint::{blend, blend_mask, rasterize, Coverage, Path, Premul, StrokeOptions, DEFAULT_TOLERANCE};

use crate::image::Image;
use crate::mask::Mask;
use crate::paint::{Paint, Shader};
use crate::sample::{sample_bilinear, Texels};

/// Target pixels a draw may touch, as `(x0, y0, x1, y1)`
///
/// Mask-family modes change the whole target, since uncovered pixels count
/// as transparent source.
fn draw_region(target: (u32, u32), footprint: Option<Rect>, mode: BlendMode) -> (u32, u32, u32, u32) {
    let (w, h) = target;
    if mode.is_mask_mode() {
        return (0, 0, w, h);
    }
    match footprint {
        Some(rect) => {
            let x0 = rect.x.floor().max(0.0).min(w as f32) as u32;
            let y0 = rect.y.floor().max(0.0).min(h as f32) as u32;
            let x1 = rect.right().ceil().max(0.0).min(w as f32) as u32;
            let y1 = rect.bottom().ceil().max(0.0).min(h as f32) as u32;
            (x0, y0, x1.max(x0), y1.max(y0))
        }
        None => (0, 0, 0, 0),
    }
}

/// Visit every target pixel the source may reach, with the transformed
/// source color at that pixel
fn for_each_source_pixel<T: Texels>(
    target: (u32, u32),
    src: &T,
    transform: &Mat3,
    mode: BlendMode,
    mut visit: impl FnMut(u32, u32, Premul),
) {
    let (sw, sh) = src.dimensions();
    let inverse = transform.inverse();
    let footprint = inverse.map(|_| Rect::new(0.0, 0.0, sw as f32, sh as f32).transformed(transform));
    let (x0, y0, x1, y1) = draw_region(target, footprint, mode);

    let Some(inverse) = inverse else {
        for y in y0..y1 {
            for x in x0..x1 {
                visit(x, y, [0.0; 4]);
            }
        }
        return;
    };

    // Integer translations copy texels directly
    let t = transform.translation();
    let integral = transform.is_translation() && t.x.fract() == 0.0 && t.y.fract() == 0.0;
    for y in y0..y1 {
        for x in x0..x1 {
            let color = if integral {
                src.texel_or_clear(x as i64 - t.x as i64, y as i64 - t.y as i64)
            } else {
                let p = inverse.transform_point(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                sample_bilinear(src, p, false)
            };
            visit(x, y, color);
        }
    }
}

fn blend_pixel(pixel: &mut PremulRgba8, mode: BlendMode, source: Premul) {
    if mode == BlendMode::Normal && source[3] <= 0.0 {
        return;
    }
    *pixel = PremulRgba8::from_f32(blend(mode, pixel.to_f32(), source));
}

fn blend_value(value: &mut u8, mode: BlendMode, source: f32) {
    let out = blend_mask(mode, *value as f32 / 255.0, source);
    *value = (out.clamp(0.0, 1.0) * 255.0).round() as u8;
}

fn scale(c: Premul, k: f32) -> Premul {
    [c[0] * k, c[1] * k, c[2] * k, c[3] * k]
}

fn fill_polygons(contours: Vec<pigment_paint::Contour>) -> Vec<Vec<Vec2>> {
    contours.into_iter().map(|c| c.points).collect()
}

impl Image {
    /// Composite `other` onto this image under `transform`
    pub fn draw(&mut self, other: &Image, transform: &Mat3, blend_mode: BlendMode) {
        let target = self.wh();
        let width = self.width() as usize;
        let data = self.data_mut();
        for_each_source_pixel(target, other, transform, blend_mode, |x, y, color| {
            blend_pixel(&mut data[y as usize * width + x as usize], blend_mode, color);
        });
    }

    /// Composite a mask, read as black with the mask as alpha
    pub fn draw_mask(&mut self, mask: &Mask, transform: &Mat3, blend_mode: BlendMode) {
        let target = self.wh();
        let width = self.width() as usize;
        let data = self.data_mut();
        for_each_source_pixel(target, mask, transform, blend_mode, |x, y, color| {
            blend_pixel(&mut data[y as usize * width + x as usize], blend_mode, color);
        });
    }

    /// Move each pixel toward the matching pixel of `other` by `mask`
    ///
    /// A mask value of 0 keeps this image's pixel and 255 takes `other`'s;
    /// values between interpolate in premultiplied space. Sizes must match,
    /// otherwise nothing changes.
    pub fn mix_through_mask(&mut self, other: &Image, mask: &Mask) {
        if other.wh() != self.wh() || mask.wh() != self.wh() {
            return;
        }
        let pixels = self.data_mut().iter_mut().zip(other.data()).zip(mask.data());
        for ((pixel, target), &coverage) in pixels {
            match coverage {
                0 => {}
                255 => *pixel = *target,
                _ => {
                    let t = coverage as f32 / 255.0;
                    let (a, b) = (pixel.to_f32(), target.to_f32());
                    *pixel = PremulRgba8::from_f32(std::array::from_fn(|c| a[c] + (b[c] - a[c]) * t));
                }
            }
        }
    }

    /// Overwrite every pixel with the paint's color at that pixel
    pub fn fill_gradient(&mut self, paint: &Paint) -> Result<()> {
        let shader = Shader::new(paint)?;
        let opacity = paint.opacity.clamp(0.0, 1.0);
        let width = self.width();
        for (i, pixel) in self.data_mut().iter_mut().enumerate() {
            let (x, y) = (i as u32 % width, i as u32 / width);
            *pixel = PremulRgba8::from_f32(scale(shader.shade(x, y), opacity));
        }
        Ok(())
    }

    /// Rasterize `path` under `transform` and composite `paint` through it
    pub fn fill_path(
        &mut self,
        path: &Path,
        paint: &Paint,
        transform: &Mat3,
        winding_rule: WindingRule,
    ) -> Result<()> {
        let shader = Shader::new(paint)?;
        let polygons = fill_polygons(path.flatten(transform, DEFAULT_TOLERANCE));
        let coverage = rasterize(&polygons, winding_rule, self.width(), self.height());
        self.composite_coverage(&coverage, &shader, paint);
        Ok(())
    }

    /// Rasterize the stroke outline of `path` and composite `paint` through it
    pub fn stroke_path(
        &mut self,
        path: &Path,
        paint: &Paint,
        transform: &Mat3,
        stroke: &StrokeOptions,
    ) -> Result<()> {
        let shader = Shader::new(paint)?;
        let polygons = path.stroke_polygons(transform, stroke);
        let coverage = rasterize(&polygons, WindingRule::NonZero, self.width(), self.height());
        self.composite_coverage(&coverage, &shader, paint);
        Ok(())
    }

    /// Composite `paint` weighted by per-pixel coverage
    pub(crate) fn composite_coverage(&mut self, coverage: &Coverage, shader: &Shader<'_>, paint: &Paint) {
        let mode = paint.blend_mode;
        let opacity = paint.opacity.clamp(0.0, 1.0);
        let solid = shader.is_solid();
        let width = self.width();

        let apply = |pixel: &mut PremulRgba8, x: u32, y: u32, cov: u8| {
            if cov == 0 && !mode.is_mask_mode() {
                return;
            }
            let color = solid.unwrap_or_else(|| shader.shade(x, y));
            let k = cov as f32 / 255.0 * opacity;
            blend_pixel(pixel, mode, scale(color, k));
        };

        if mode.is_mask_mode() {
            for (i, pixel) in self.data_mut().iter_mut().enumerate() {
                let (x, y) = (i as u32 % width, i as u32 / width);
                apply(pixel, x, y, coverage.get(x, y));
            }
            return;
        }
        let data = self.data_mut();
        for (y, x0, row) in coverage.rows() {
            for (dx, cov) in row.iter().enumerate() {
                let x = x0 + dx as u32;
                apply(&mut data[y as usize * width as usize + x as usize], x, y, *cov);
            }
        }
    }
}

impl Mask {
    /// Combine `other` into this mask under `transform`
    pub fn draw(&mut self, other: &Mask, transform: &Mat3, blend_mode: BlendMode) {
        let target = self.wh();
        let width = self.width() as usize;
        let data = self.data_mut();
        for_each_source_pixel(target, other, transform, blend_mode, |x, y, color| {
            blend_value(&mut data[y as usize * width + x as usize], blend_mode, color[3]);
        });
    }

    /// Combine the alpha of `image` into this mask
    pub fn draw_image(&mut self, image: &Image, transform: &Mat3, blend_mode: BlendMode) {
        let target = self.wh();
        let width = self.width() as usize;
        let data = self.data_mut();
        for_each_source_pixel(target, image, transform, blend_mode, |x, y, color| {
            blend_value(&mut data[y as usize * width + x as usize], blend_mode, color[3]);
        });
    }

    pub fn fill_path(
        &mut self,
        path: &Path,
        transform: &Mat3,
        winding_rule: WindingRule,
        blend_mode: BlendMode,
    ) {
        let polygons = fill_polygons(path.flatten(transform, DEFAULT_TOLERANCE));
        let coverage = rasterize(&polygons, winding_rule, self.width(), self.height());
        self.composite_coverage(&coverage, blend_mode);
    }

    pub fn stroke_path(
        &mut self,
        path: &Path,
        transform: &Mat3,
        stroke: &StrokeOptions,
        blend_mode: BlendMode,
    ) {
        let polygons = path.stroke_polygons(transform, stroke);
        let coverage = rasterize(&polygons, WindingRule::NonZero, self.width(), self.height());
        self.composite_coverage(&coverage, blend_mode);
    }

    pub(crate) fn composite_coverage(&mut self, coverage: &Coverage, blend_mode: BlendMode) {
        let width = self.width();
        if blend_mode.is_mask_mode() {
            for (i, value) in self.data_mut().iter_mut().enumerate() {
                let cov = coverage.get(i as u32 % width, i as u32 / width);
                blend_value(value, blend_mode, cov as f32 / 255.0);
            }
            return;
        }
        let data = self.data_mut();
        for (y, x0, row) in coverage.rows() {
            for (dx, cov) in row.iter().enumerate() {
                if *cov == 0 {
                    continue;
                }
                let idx = y as usize * width as usize + (x0 as usize + dx);
                blend_value(&mut data[idx], blend_mode, *cov as f32 / 255.0);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigment_core::{Color, ColorStop};

    fn square(x: f32, y: f32, size: f32) -> Path {
        let mut path = Path::new();
        path.rect(x, y, size, size, true);
        path
    }

    #[test]
    fn test_mix_through_mask() {
        let mut image = Image::new(3, 1);
        image.fill(Color::GREEN);
        let mut other = Image::new(3, 1);
        other.fill(Color::RED);
        let mask = Mask::from_data(3, 1, vec![0, 255, 51]).unwrap();
        image.mix_through_mask(&other, &mask);
        assert_eq!(image.get_pixel(0, 0), PremulRgba8::new(0, 255, 0, 255));
        assert_eq!(image.get_pixel(1, 0), PremulRgba8::new(255, 0, 0, 255));
        assert_eq!(image.get_pixel(2, 0), PremulRgba8::new(51, 204, 0, 255));

        let before = image.clone();
        image.mix_through_mask(&Image::new(2, 2), &mask);
        assert_eq!(image, before);
    }

    #[test]
    fn test_fill_path_solid() {
        let mut image = Image::new(10, 10);
        image
            .fill_path(&square(2.0, 2.0, 4.0), &Paint::solid(Color::RED), &Mat3::IDENTITY, WindingRule::NonZero)
            .unwrap();
        assert_eq!(image.get_pixel(3, 3), PremulRgba8::new(255, 0, 0, 255));
        assert_eq!(image.get_pixel(7, 7), PremulRgba8::TRANSPARENT);
    }

    #[test]
    fn test_convex_fill_is_rule_independent() {
        let mut path = Path::new();
        path.polygon(16.0, 16.0, 12.0, 7).unwrap();
        let mut a = Image::new(32, 32);
        let mut b = Image::new(32, 32);
        let paint = Paint::solid(Color::BLUE);
        a.fill_path(&path, &paint, &Mat3::IDENTITY, WindingRule::NonZero).unwrap();
        b.fill_path(&path, &paint, &Mat3::IDENTITY, WindingRule::EvenOdd).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_draw_integer_offset_copies_exactly() {
        let mut src = Image::new(2, 2);
        src.fill(Color::GREEN);
        let mut dst = Image::new(4, 4);
        dst.draw(&src, &Mat3::translate(1.0, 2.0), BlendMode::Normal);
        assert_eq!(dst.get_pixel(1, 2), PremulRgba8::new(0, 255, 0, 255));
        assert_eq!(dst.get_pixel(2, 3), PremulRgba8::new(0, 255, 0, 255));
        assert_eq!(dst.get_pixel(0, 0), PremulRgba8::TRANSPARENT);
        assert_eq!(dst.get_pixel(3, 2), PremulRgba8::TRANSPARENT);
    }

    #[test]
    fn test_mask_mode_clears_outside_footprint() {
        let mut dst = Image::new(4, 4);
        dst.fill(Color::WHITE);
        let mut mask = Mask::new(2, 2);
        mask.fill(255);
        dst.draw_mask(&mask, &Mat3::IDENTITY, BlendMode::Mask);
        assert_eq!(dst.get_pixel(1, 1).a, 255);
        assert_eq!(dst.get_pixel(3, 3).a, 0);
    }

    #[test]
    fn test_mask_fill_and_subtract() {
        let mut mask = Mask::new(10, 10);
        mask.fill_path(&square(0.0, 0.0, 10.0), &Mat3::IDENTITY, WindingRule::NonZero, BlendMode::Normal);
        assert_eq!(mask.covered_area(), 100);
        mask.fill_path(&square(0.0, 0.0, 5.0), &Mat3::IDENTITY, WindingRule::NonZero, BlendMode::SubtractMask);
        assert_eq!(mask.covered_area(), 75);
    }

    #[test]
    fn test_fill_gradient_overwrites() {
        let mut image = Image::new(11, 1);
        let paint = Paint::linear_gradient(
            Vec2::new(0.5, 0.0),
            Vec2::new(10.5, 0.0),
            vec![
                ColorStop::new(Color::BLACK, 0.0),
                ColorStop::new(Color::WHITE, 1.0),
            ],
        );
        image.fill_gradient(&paint).unwrap();
        assert_eq!(image.get_pixel(0, 0), PremulRgba8::new(0, 0, 0, 255));
        assert_eq!(image.get_pixel(5, 0), PremulRgba8::new(128, 128, 128, 255));
        assert_eq!(image.get_pixel(10, 0), PremulRgba8::new(255, 255, 255, 255));
    }

    #[test]
    fn test_opacity_scales_source() {
        let mut image = Image::new(4, 4);
        let paint = Paint {
            opacity: 0.5,
            ..Paint::solid(Color::BLACK)
        };
        image
            .fill_path(&square(0.0, 0.0, 4.0), &paint, &Mat3::IDENTITY, WindingRule::NonZero)
            .unwrap();
        assert_eq!(image.get_pixel(1, 1).a, 128);
    }
}
