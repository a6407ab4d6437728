//! Texel access and bilinear sampling shared by images and masks

use pigment_core::Vec2;
use pigment_paint::Premul;

use crate::image::Image;
use crate::mask::Mask;

/// A raster that can be read as premultiplied color
pub(crate) trait Texels {
    fn dimensions(&self) -> (u32, u32);

    /// Texel at integer coordinates inside the raster
    fn texel(&self, x: u32, y: u32) -> Premul;

    fn texel_or_clear(&self, x: i64, y: i64) -> Premul {
        let (w, h) = self.dimensions();
        if x < 0 || y < 0 || x >= w as i64 || y >= h as i64 {
            [0.0; 4]
        } else {
            self.texel(x as u32, y as u32)
        }
    }

    fn texel_wrapped(&self, x: i64, y: i64) -> Premul {
        let (w, h) = self.dimensions();
        if w == 0 || h == 0 {
            return [0.0; 4];
        }
        self.texel(x.rem_euclid(w as i64) as u32, y.rem_euclid(h as i64) as u32)
    }
}

impl Texels for Image {
    fn dimensions(&self) -> (u32, u32) {
        self.wh()
    }

    fn texel(&self, x: u32, y: u32) -> Premul {
        self.data()[self.index(x, y)].to_f32()
    }
}

/// Masks read as black with the coverage as alpha
impl Texels for Mask {
    fn dimensions(&self) -> (u32, u32) {
        self.wh()
    }

    fn texel(&self, x: u32, y: u32) -> Premul {
        [0.0, 0.0, 0.0, self.data()[self.index(x, y)] as f32 / 255.0]
    }
}

/// Bilinear sample at a continuous position, pixel centers at +0.5
pub(crate) fn sample_bilinear<T: Texels>(src: &T, p: Vec2, tiled: bool) -> Premul {
    let x = p.x - 0.5;
    let y = p.y - 0.5;
    let (x0, y0) = (x.floor(), y.floor());
    let (fx, fy) = (x - x0, y - y0);
    let (ix, iy) = (x0 as i64, y0 as i64);

    let fetch = |x: i64, y: i64| {
        if tiled {
            src.texel_wrapped(x, y)
        } else {
            src.texel_or_clear(x, y)
        }
    };
    let (c00, c10) = (fetch(ix, iy), fetch(ix + 1, iy));
    let (c01, c11) = (fetch(ix, iy + 1), fetch(ix + 1, iy + 1));

    let mut out = [0.0; 4];
    for i in 0..4 {
        let top = c00[i] + (c10[i] - c00[i]) * fx;
        let bottom = c01[i] + (c11[i] - c01[i]) * fx;
        out[i] = top + (bottom - top) * fy;
    }
    out
}
