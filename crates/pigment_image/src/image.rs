//! RGBA raster buffer

use pigment_core::{Color, PigmentError, PremulRgba8, Result};

use crate::mask::Mask;

/// A `width * height` buffer of premultiplied RGBA pixels, row-major
///
/// Reads outside the image return transparent black and writes outside are
/// ignored. Not internally synchronized.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    data: Vec<PremulRgba8>,
}

impl Image {
    /// Transparent image; zero dimensions are allowed
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![PremulRgba8::TRANSPARENT; width as usize * height as usize],
        }
    }

    /// Wrap existing premultiplied pixels
    pub fn from_pixels(width: u32, height: u32, data: Vec<PremulRgba8>) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            return Err(PigmentError::bounds(
                "Image::from_pixels",
                format!("{}x{} needs {} pixels, got {}", width, height, width as usize * height as usize, data.len()),
            ));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn wh(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[PremulRgba8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [PremulRgba8] {
        &mut self.data
    }

    /// Raw bytes in RGBA order, premultiplied
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    /// Premultiplied pixel, transparent outside the image
    pub fn get_pixel(&self, x: i64, y: i64) -> PremulRgba8 {
        if self.in_bounds(x, y) {
            self.data[self.index(x as u32, y as u32)]
        } else {
            PremulRgba8::TRANSPARENT
        }
    }

    /// Store a premultiplied pixel; ignored outside the image
    pub fn set_pixel(&mut self, x: i64, y: i64, pixel: PremulRgba8) {
        if self.in_bounds(x, y) {
            let idx = self.index(x as u32, y as u32);
            self.data[idx] = pixel;
        }
    }

    /// Straight-alpha color, transparent outside the image
    pub fn get_color(&self, x: i64, y: i64) -> Color {
        self.get_pixel(x, y).to_color()
    }

    pub fn set_color(&mut self, x: i64, y: i64, color: Color) {
        self.set_pixel(x, y, PremulRgba8::from_color(color));
    }

    pub fn fill(&mut self, color: Color) {
        let pixel = PremulRgba8::from_color(color);
        self.data.iter_mut().for_each(|p| *p = pixel);
    }

    pub fn is_one_color(&self) -> bool {
        match self.data.first() {
            Some(first) => self.data.iter().all(|p| p == first),
            None => true,
        }
    }

    pub fn is_transparent(&self) -> bool {
        self.data.iter().all(|p| p.a == 0)
    }

    pub fn is_opaque(&self) -> bool {
        self.data.iter().all(|p| p.a == 255)
    }

    pub fn flip_horizontal(&mut self) {
        let width = self.width as usize;
        if width == 0 {
            return;
        }
        for row in self.data.chunks_mut(width) {
            row.reverse();
        }
    }

    pub fn flip_vertical(&mut self) {
        let width = self.width as usize;
        let height = self.height as usize;
        for y in 0..height / 2 {
            let (top, bottom) = self.data.split_at_mut((height - 1 - y) * width);
            top[y * width..(y + 1) * width].swap_with_slice(&mut bottom[..width]);
        }
    }

    /// Invert every straight-alpha channel, alpha included
    pub fn invert(&mut self) {
        for p in self.data.iter_mut() {
            let [r, g, b, a] = p.to_straight();
            *p = PremulRgba8::from_straight(255 - r, 255 - g, 255 - b, 255 - a);
        }
    }

    /// Scale every pixel's opacity by `opacity`, clamped to [0, 1]
    pub fn apply_opacity(&mut self, opacity: f32) {
        let k = opacity.clamp(0.0, 1.0);
        if k >= 1.0 {
            return;
        }
        for p in self.data.iter_mut() {
            let c = p.to_f32();
            *p = PremulRgba8::from_f32([c[0] * k, c[1] * k, c[2] * k, c[3] * k]);
        }
    }

    /// Copy of the rectangle at `(x, y)`, which must lie within the image
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Image> {
        if x as u64 + width as u64 > self.width as u64 || y as u64 + height as u64 > self.height as u64 {
            return Err(PigmentError::bounds(
                "sub_image",
                format!(
                    "rect {}x{} at ({}, {}) exceeds {}x{} image",
                    width, height, x, y, self.width, self.height
                ),
            ));
        }
        let mut out = Image::new(width, height);
        for row in 0..height {
            let src = self.index(x, y + row);
            let dst = out.index(0, row);
            out.data[dst..dst + width as usize].copy_from_slice(&self.data[src..src + width as usize]);
        }
        Ok(out)
    }

    /// Copy of the rectangle at `(x, y)`; areas outside the image are transparent
    pub fn super_image(&self, x: i64, y: i64, width: u32, height: u32) -> Image {
        let mut out = Image::new(width, height);
        for row in 0..height {
            for col in 0..width {
                let idx = out.index(col, row);
                out.data[idx] = self.get_pixel(x + col as i64, y + row as i64);
            }
        }
        out
    }

    /// Single-channel copy holding each pixel's alpha
    pub fn new_mask(&self) -> Mask {
        let values = self.data.iter().map(|p| p.a).collect();
        Mask::from_values(self.width, self.height, values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigment_core::ErrorKind;

    fn numbered(width: u32, height: u32) -> Image {
        let mut image = Image::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let v = (y * width + x) as u8;
                image.set_pixel(x as i64, y as i64, PremulRgba8::new(v, 0, 0, 255));
            }
        }
        image
    }

    #[test]
    fn test_out_of_range_policy() {
        let mut image = Image::new(2, 2);
        image.set_color(-1, 0, Color::RED);
        image.set_color(2, 2, Color::RED);
        assert!(image.is_transparent());
        assert_eq!(image.get_color(5, 5), Color::TRANSPARENT);
    }

    #[test]
    fn test_flips_are_involutions() {
        let original = numbered(5, 3);
        let mut image = original.clone();
        image.flip_horizontal();
        assert_ne!(image, original);
        assert_eq!(image.get_pixel(0, 0).r, 4);
        image.flip_horizontal();
        assert_eq!(image, original);
        image.flip_vertical();
        assert_eq!(image.get_pixel(0, 0).r, 10);
        image.flip_vertical();
        assert_eq!(image, original);
    }

    #[test]
    fn test_sub_and_super_image() {
        let image = numbered(4, 4);
        let sub = image.sub_image(1, 2, 2, 2).unwrap();
        assert_eq!(sub.get_pixel(0, 0).r, 9);
        assert_eq!(
            image.sub_image(3, 3, 2, 1).unwrap_err().kind(),
            ErrorKind::Bounds
        );
        let padded = image.super_image(-1, -1, 6, 6);
        assert_eq!(padded.get_pixel(0, 0), PremulRgba8::TRANSPARENT);
        assert_eq!(padded.get_pixel(1, 1).r, 0);
        assert_eq!(padded.get_pixel(4, 4).r, 15);
    }

    #[test]
    fn test_invert_and_opacity() {
        let mut image = Image::new(1, 1);
        image.fill(Color::new(1.0, 0.0, 0.0, 1.0));
        image.invert();
        assert_eq!(image.get_pixel(0, 0), PremulRgba8::TRANSPARENT);

        image.fill(Color::WHITE);
        image.apply_opacity(0.5);
        assert_eq!(image.get_pixel(0, 0).a, 128);
    }

    #[test]
    fn test_new_mask_takes_alpha() {
        let mut image = Image::new(2, 1);
        image.set_color(1, 0, Color::RED.with_alpha(0.5));
        let mask = image.new_mask();
        assert_eq!(mask.get_value(0, 0), 0);
        assert_eq!(mask.get_value(1, 0), 128);
    }

    #[test]
    fn test_zero_sized_image() {
        let mut image = Image::new(0, 3);
        image.flip_horizontal();
        image.flip_vertical();
        assert!(image.data().is_empty());
        assert!(image.is_one_color());
    }
}
