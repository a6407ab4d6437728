//! Single-channel coverage buffer

use pigment_core::{PigmentError, PremulRgba8, Result};

use crate::image::Image;

/// A `width * height` buffer of coverage values, row-major
///
/// Same bounds policy as [`Image`]: reads outside return 0, writes outside
/// are ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mask {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Mask {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; width as usize * height as usize],
        }
    }

    pub(crate) fn from_values(width: u32, height: u32, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width as usize * height as usize);
        Self {
            width,
            height,
            data,
        }
    }

    pub fn from_data(width: u32, height: u32, data: Vec<u8>) -> Result<Self> {
        if data.len() != width as usize * height as usize {
            return Err(PigmentError::bounds(
                "Mask::from_data",
                format!("{}x{} needs {} values, got {}", width, height, width as usize * height as usize, data.len()),
            ));
        }
        Ok(Self::from_values(width, height, data))
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

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && x < self.width as i64 && y < self.height as i64
    }

    pub(crate) fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn get_value(&self, x: i64, y: i64) -> u8 {
        if self.in_bounds(x, y) {
            self.data[self.index(x as u32, y as u32)]
        } else {
            0
        }
    }

    pub fn set_value(&mut self, x: i64, y: i64, value: u8) {
        if self.in_bounds(x, y) {
            let idx = self.index(x as u32, y as u32);
            self.data[idx] = value;
        }
    }

    pub fn fill(&mut self, value: u8) {
        self.data.iter_mut().for_each(|v| *v = value);
    }

    pub fn invert(&mut self) {
        self.data.iter_mut().for_each(|v| *v = 255 - *v);
    }

    pub fn apply_opacity(&mut self, opacity: f32) {
        let k = opacity.clamp(0.0, 1.0);
        if k >= 1.0 {
            return;
        }
        for v in self.data.iter_mut() {
            *v = (*v as f32 * k).round() as u8;
        }
    }

    /// Snap every non-zero value to full coverage
    pub fn ceil(&mut self) {
        for v in self.data.iter_mut() {
            if *v != 0 {
                *v = 255;
            }
        }
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

    pub fn sub_mask(&self, x: u32, y: u32, width: u32, height: u32) -> Result<Mask> {
        if x as u64 + width as u64 > self.width as u64 || y as u64 + height as u64 > self.height as u64 {
            return Err(PigmentError::bounds(
                "sub_mask",
                format!(
                    "rect {}x{} at ({}, {}) exceeds {}x{} mask",
                    width, height, x, y, self.width, self.height
                ),
            ));
        }
        let mut out = Mask::new(width, height);
        for row in 0..height {
            let src = self.index(x, y + row);
            let dst = out.index(0, row);
            out.data[dst..dst + width as usize].copy_from_slice(&self.data[src..src + width as usize]);
        }
        Ok(out)
    }

    /// Black image whose alpha is this mask
    pub fn new_image(&self) -> Image {
        let pixels = self
            .data
            .iter()
            .map(|v| PremulRgba8::new(0, 0, 0, *v))
            .collect();
        // Dimensions come from self, so the length always matches
        Image::from_pixels(self.width, self.height, pixels).unwrap_or_default()
    }

    /// Count of non-zero values
    pub fn covered_area(&self) -> usize {
        self.data.iter().filter(|v| **v != 0).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_policy() {
        let mut mask = Mask::new(3, 3);
        mask.set_value(3, 0, 200);
        mask.set_value(-1, 0, 200);
        assert_eq!(mask.covered_area(), 0);
        assert_eq!(mask.get_value(100, 100), 0);
    }

    #[test]
    fn test_ceil_snaps_partial_coverage() {
        let mut mask = Mask::from_data(3, 1, vec![0, 1, 200]).unwrap();
        mask.ceil();
        assert_eq!(mask.data(), &[0, 255, 255]);
    }

    #[test]
    fn test_new_image_is_black_with_alpha() {
        let mask = Mask::from_data(2, 1, vec![0, 128]).unwrap();
        let image = mask.new_image();
        assert_eq!(image.get_pixel(1, 0), PremulRgba8::new(0, 0, 0, 128));
        assert_eq!(image.new_mask(), mask);
    }

    #[test]
    fn test_from_data_checks_length() {
        assert!(Mask::from_data(2, 2, vec![0; 3]).is_err());
    }
}
