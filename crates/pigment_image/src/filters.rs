//! Resampling, blur, spread and shadow

use pigment_core::{BlendMode, Color, Mat3, PigmentError, PremulRgba8, Result, Vec2};
use tracing::trace;

use crate::image::Image;
use crate::mask::Mask;

/// Validated radius in whole pixels, capped at the longer side of `dims`
///
/// Taps further out than the longer side read past the edge for every
/// pixel, so the cap keeps kernels bounded by the raster size.
fn check_radius(op: &'static str, radius: f32, (w, h): (u32, u32)) -> Result<u32> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(PigmentError::invalid(
            op,
            format!("radius must be a finite value >= 0, got {}", radius),
        ));
    }
    Ok((radius.round().min(u32::MAX as f32) as u32).min(w.max(h)))
}

/// Normalized Gaussian weights for offsets `-radius..=radius`
fn gaussian_kernel(radius: u32) -> Vec<f32> {
    let sigma = radius as f32 / 2.0;
    let r = radius as i32;
    let mut kernel: Vec<f32> = (-r..=r)
        .map(|i| (-((i * i) as f32) / (2.0 * sigma * sigma)).exp())
        .collect();
    let sum: f32 = kernel.iter().sum();
    kernel.iter_mut().for_each(|w| *w /= sum);
    kernel
}

/// Separable convolution over interleaved channels; samples past the edge
/// read `edge`
fn convolve(data: &mut [f32], width: usize, height: usize, kernel: &[f32], edge: &[f32]) {
    let channels = edge.len();
    let radius = (kernel.len() / 2) as i64;
    let mut tmp = vec![0f32; data.len()];

    for y in 0..height {
        for x in 0..width {
            let out = &mut tmp[(y * width + x) * channels..][..channels];
            for (k, w) in kernel.iter().enumerate() {
                let sx = x as i64 + k as i64 - radius;
                let src = if sx < 0 || sx >= width as i64 {
                    edge
                } else {
                    &data[(y * width + sx as usize) * channels..][..channels]
                };
                for c in 0..channels {
                    out[c] += src[c] * w;
                }
            }
        }
    }

    data.iter_mut().for_each(|v| *v = 0.0);
    for y in 0..height {
        for x in 0..width {
            let out = &mut data[(y * width + x) * channels..][..channels];
            for (k, w) in kernel.iter().enumerate() {
                let sy = y as i64 + k as i64 - radius;
                let src = if sy < 0 || sy >= height as i64 {
                    edge
                } else {
                    &tmp[(sy as usize * width + x) * channels..][..channels]
                };
                for c in 0..channels {
                    out[c] += src[c] * w;
                }
            }
        }
    }
}

/// `(first source index, weights)` for each destination index along one axis
///
/// A tent filter whose support widens with the scale factor when shrinking.
fn tent_weights(src_len: u32, dst_len: u32) -> Vec<(usize, Vec<f32>)> {
    let scale = src_len as f32 / dst_len as f32;
    let support = scale.max(1.0);
    (0..dst_len)
        .map(|d| {
            let center = (d as f32 + 0.5) * scale - 0.5;
            let first = (center - support).floor().max(0.0) as usize;
            let last = ((center + support).ceil() as usize).min(src_len as usize - 1);
            let mut weights: Vec<f32> = (first..=last)
                .map(|s| (1.0 - (s as f32 - center).abs() / support).max(0.0))
                .collect();
            let sum: f32 = weights.iter().sum();
            if sum > 0.0 {
                weights.iter_mut().for_each(|w| *w /= sum);
            } else {
                // Center fell between samples past the edge; take the nearest
                let nearest = (center.round().max(0.0) as usize).min(src_len as usize - 1);
                weights = vec![0.0; last - first + 1];
                weights[nearest.clamp(first, last) - first] = 1.0;
            }
            (first, weights)
        })
        .collect()
}

/// Resample interleaved channels from `sw x sh` to `dw x dh`
fn resample(data: &[f32], channels: usize, (sw, sh): (u32, u32), (dw, dh): (u32, u32)) -> Vec<f32> {
    let xs = tent_weights(sw, dw);
    let ys = tent_weights(sh, dh);
    let (sw, dw, dh) = (sw as usize, dw as usize, dh as usize);

    let mut rows = vec![0f32; dw * sh as usize * channels];
    for y in 0..sh as usize {
        for (x, (first, weights)) in xs.iter().enumerate() {
            let out = &mut rows[(y * dw + x) * channels..][..channels];
            for (i, w) in weights.iter().enumerate() {
                let src = &data[(y * sw + first + i) * channels..][..channels];
                for c in 0..channels {
                    out[c] += src[c] * w;
                }
            }
        }
    }

    let mut out = vec![0f32; dw * dh * channels];
    for (y, (first, weights)) in ys.iter().enumerate() {
        for x in 0..dw {
            let dst = &mut out[(y * dw + x) * channels..][..channels];
            for (i, w) in weights.iter().enumerate() {
                let src = &rows[((first + i) * dw + x) * channels..][..channels];
                for c in 0..channels {
                    dst[c] += src[c] * w;
                }
            }
        }
    }
    out
}

fn check_resize(op: &'static str, width: u32, height: u32, src: (u32, u32)) -> Result<()> {
    if width < 1 || height < 1 {
        return Err(PigmentError::bounds(
            op,
            format!("target size must be at least 1x1, got {}x{}", width, height),
        ));
    }
    if src.0 < 1 || src.1 < 1 {
        return Err(PigmentError::bounds(op, "cannot resample an empty raster"));
    }
    Ok(())
}

fn halve_dims(op: &'static str, (w, h): (u32, u32), power: u32) -> Result<(u32, u32)> {
    let (nw, nh) = (w.checked_shr(power).unwrap_or(0), h.checked_shr(power).unwrap_or(0));
    if nw < 1 || nh < 1 {
        return Err(PigmentError::bounds(
            op,
            format!("{}x{} halved {} times drops below 1 pixel", w, h, power),
        ));
    }
    Ok((nw, nh))
}

fn double_dims(op: &'static str, (w, h): (u32, u32), power: u32) -> Result<(u32, u32)> {
    let factor = 1u32.checked_shl(power).filter(|f| *f > 0);
    let dims = factor.and_then(|f| Some((w.checked_mul(f)?, h.checked_mul(f)?)));
    dims.filter(|(nw, nh)| (*nw as u64) * (*nh as u64) <= u32::MAX as u64)
        .ok_or_else(|| {
            PigmentError::bounds(op, format!("{}x{} doubled {} times is too large", w, h, power))
        })
}

impl Image {
    /// Gaussian blur; pixels past the edge read as `out_of_bounds`
    pub fn blur(&mut self, radius: f32, out_of_bounds: Color) -> Result<()> {
        let radius = check_radius("blur", radius, self.wh())?;
        if radius == 0 || self.data().is_empty() {
            return Ok(());
        }
        trace!(radius, w = self.width(), h = self.height(), "blur image");
        let mut planes: Vec<f32> = self.data().iter().flat_map(|p| p.to_f32()).collect();
        let edge = out_of_bounds.premultiplied();
        let (w, h) = (self.width() as usize, self.height() as usize);
        convolve(&mut planes, w, h, &gaussian_kernel(radius), &edge);
        for (pixel, c) in self.data_mut().iter_mut().zip(planes.chunks_exact(4)) {
            *pixel = PremulRgba8::from_f32([c[0], c[1], c[2], c[3]]);
        }
        Ok(())
    }

    /// Resample to `width x height` (tent filter)
    pub fn resize(&self, width: u32, height: u32) -> Result<Image> {
        check_resize("resize", width, height, self.wh())?;
        if (width, height) == self.wh() {
            return Ok(self.clone());
        }
        let planes: Vec<f32> = self.data().iter().flat_map(|p| p.to_f32()).collect();
        let out = resample(&planes, 4, self.wh(), (width, height));
        let pixels = out
            .chunks_exact(4)
            .map(|c| PremulRgba8::from_f32([c[0], c[1], c[2], c[3]]))
            .collect();
        Image::from_pixels(width, height, pixels)
    }

    /// Halve both dimensions `power` times, averaging 2x2 blocks
    ///
    /// An odd trailing row or column is dropped.
    pub fn minify_by_2(&self, power: u32) -> Result<Image> {
        halve_dims("minify_by_2", self.wh(), power)?;
        let mut current = self.clone();
        for _ in 0..power {
            let (w, h) = (current.width() / 2, current.height() / 2);
            let mut next = Image::new(w, h);
            for y in 0..h {
                for x in 0..w {
                    let (sx, sy) = (2 * x as i64, 2 * y as i64);
                    let quad = [
                        current.get_pixel(sx, sy),
                        current.get_pixel(sx + 1, sy),
                        current.get_pixel(sx, sy + 1),
                        current.get_pixel(sx + 1, sy + 1),
                    ];
                    let avg = |f: fn(&PremulRgba8) -> u8| {
                        ((quad.iter().map(|p| f(p) as u32).sum::<u32>() + 2) / 4) as u8
                    };
                    next.set_pixel(
                        x as i64,
                        y as i64,
                        PremulRgba8::new(avg(|p| p.r), avg(|p| p.g), avg(|p| p.b), avg(|p| p.a)),
                    );
                }
            }
            current = next;
        }
        Ok(current)
    }

    /// Double both dimensions `power` times by pixel replication
    pub fn magnify_by_2(&self, power: u32) -> Result<Image> {
        let (w, h) = double_dims("magnify_by_2", self.wh(), power)?;
        let shift = power;
        let mut out = Image::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let pixel = self.get_pixel((x >> shift) as i64, (y >> shift) as i64);
                out.set_pixel(x as i64, y as i64, pixel);
            }
        }
        Ok(out)
    }

    /// Colored, blurred and offset copy of this image's alpha silhouette
    pub fn shadow(&self, offset: Vec2, spread: f32, blur: f32, color: Color) -> Result<Image> {
        let silhouette = self.new_mask();
        let mut mask = Mask::new(self.width(), self.height());
        mask.draw(&silhouette, &Mat3::translate(offset.x, offset.y), BlendMode::Overwrite);
        mask.spread(spread)?;
        mask.blur(blur, 0)?;

        let mut shadow = Image::new(self.width(), self.height());
        shadow.fill(color);
        shadow.draw_mask(&mask, &Mat3::IDENTITY, BlendMode::Mask);
        Ok(shadow)
    }
}

impl Mask {
    pub fn blur(&mut self, radius: f32, out_of_bounds: u8) -> Result<()> {
        let radius = check_radius("blur", radius, self.wh())?;
        if radius == 0 || self.data().is_empty() {
            return Ok(());
        }
        trace!(radius, w = self.width(), h = self.height(), "blur mask");
        let mut plane: Vec<f32> = self.data().iter().map(|v| *v as f32).collect();
        let (w, h) = (self.width() as usize, self.height() as usize);
        convolve(&mut plane, w, h, &gaussian_kernel(radius), &[out_of_bounds as f32]);
        for (v, f) in self.data_mut().iter_mut().zip(plane.iter()) {
            *v = f.round().clamp(0.0, 255.0) as u8;
        }
        Ok(())
    }

    /// Grow (`distance > 0`) or shrink (`distance < 0`) the covered region
    ///
    /// Uses a square window of `2 * |distance| + 1` pixels; outside the mask
    /// reads as uncovered.
    pub fn spread(&mut self, distance: f32) -> Result<()> {
        if !distance.is_finite() {
            return Err(PigmentError::invalid(
                "spread",
                format!("distance must be finite, got {}", distance),
            ));
        }
        let radius = check_radius("spread", distance.abs(), self.wh())? as i64;
        if radius == 0 || self.data().is_empty() {
            return Ok(());
        }
        let dilate = distance > 0.0;
        let pick = |a: u8, b: u8| if dilate { a.max(b) } else { a.min(b) };
        let (w, h) = (self.width() as i64, self.height() as i64);

        let src = self.data().to_vec();
        let mut rows = vec![0u8; src.len()];
        for y in 0..h {
            for x in 0..w {
                let mut value = src[(y * w + x) as usize];
                for dx in -radius..=radius {
                    let sx = x + dx;
                    let sample = if sx < 0 || sx >= w { 0 } else { src[(y * w + sx) as usize] };
                    value = pick(value, sample);
                }
                rows[(y * w + x) as usize] = value;
            }
        }
        let data = self.data_mut();
        for y in 0..h {
            for x in 0..w {
                let mut value = rows[(y * w + x) as usize];
                for dy in -radius..=radius {
                    let sy = y + dy;
                    let sample = if sy < 0 || sy >= h { 0 } else { rows[(sy * w + x) as usize] };
                    value = pick(value, sample);
                }
                data[(y * w + x) as usize] = value;
            }
        }
        Ok(())
    }

    pub fn resize(&self, width: u32, height: u32) -> Result<Mask> {
        check_resize("resize", width, height, self.wh())?;
        if (width, height) == self.wh() {
            return Ok(self.clone());
        }
        let plane: Vec<f32> = self.data().iter().map(|v| *v as f32).collect();
        let out = resample(&plane, 1, self.wh(), (width, height));
        Mask::from_data(
            width,
            height,
            out.iter().map(|v| v.round().clamp(0.0, 255.0) as u8).collect(),
        )
    }

    pub fn minify_by_2(&self, power: u32) -> Result<Mask> {
        halve_dims("minify_by_2", self.wh(), power)?;
        let mut current = self.clone();
        for _ in 0..power {
            let (w, h) = (current.width() / 2, current.height() / 2);
            let mut next = Mask::new(w, h);
            for y in 0..h as i64 {
                for x in 0..w as i64 {
                    let sum = current.get_value(2 * x, 2 * y) as u32
                        + current.get_value(2 * x + 1, 2 * y) as u32
                        + current.get_value(2 * x, 2 * y + 1) as u32
                        + current.get_value(2 * x + 1, 2 * y + 1) as u32;
                    next.set_value(x, y, ((sum + 2) / 4) as u8);
                }
            }
            current = next;
        }
        Ok(current)
    }

    pub fn magnify_by_2(&self, power: u32) -> Result<Mask> {
        let (w, h) = double_dims("magnify_by_2", self.wh(), power)?;
        let mut out = Mask::new(w, h);
        for y in 0..h {
            for x in 0..w {
                let value = self.get_value((x >> power) as i64, (y >> power) as i64);
                out.set_value(x as i64, y as i64, value);
            }
        }
        Ok(out)
    }
}
