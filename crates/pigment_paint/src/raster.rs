//! Scanline coverage rasterizer
//!
//! Each pixel row is sampled on five sub-scanlines. Along a sub-scanline
//! the inside spans are accumulated with exact fractional horizontal
//! coverage, so vertical edges antialias perfectly and sloped edges are
//! resolved to 1/5 of a pixel vertically.

use pigment_core::{Vec2, WindingRule};
use tracing::trace;

/// Sub-scanlines per pixel row
pub const SUBSAMPLES: usize = 5;

#[derive(Clone, Copy, Debug)]
struct Edge {
    x0: f32,
    y0: f32,
    x1: f32,
    y1: f32,
    winding: i32,
}

impl Edge {
    fn new(a: Vec2, b: Vec2) -> Option<Edge> {
        if a.y == b.y || !a.is_finite() || !b.is_finite() {
            return None;
        }
        let (top, bottom, winding) = if a.y < b.y { (a, b, 1) } else { (b, a, -1) };
        Some(Edge {
            x0: top.x,
            y0: top.y,
            x1: bottom.x,
            y1: bottom.y,
            winding,
        })
    }

    fn x_at(&self, y: f32) -> f32 {
        self.x0 + (y - self.y0) * (self.x1 - self.x0) / (self.y1 - self.y0)
    }
}

/// Per-pixel coverage of a shape, stored for its clipped bounding box
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Coverage {
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Coverage {
    /// Covered area as `(x, y, width, height)` in target pixels
    pub fn bounds(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Coverage at a target pixel, 0 outside the bounds
    pub fn get(&self, x: u32, y: u32) -> u8 {
        if x < self.x || y < self.y || x >= self.x + self.width || y >= self.y + self.height {
            return 0;
        }
        self.data[((y - self.y) * self.width + (x - self.x)) as usize]
    }

    /// Rows as `(y, first_x, coverage)`
    pub fn rows(&self) -> impl Iterator<Item = (u32, u32, &[u8])> + '_ {
        let width = self.width.max(1) as usize;
        self.data
            .chunks(width)
            .enumerate()
            .map(move |(i, row)| (self.y + i as u32, self.x, row))
    }
}

/// Rasterize closed polygons into coverage clipped to `width` x `height`
pub fn rasterize(polygons: &[Vec<Vec2>], rule: WindingRule, width: u32, height: u32) -> Coverage {
    let mut edges: Vec<Edge> = Vec::new();
    let (mut min, mut max) = (Vec2::new(f32::MAX, f32::MAX), Vec2::new(f32::MIN, f32::MIN));
    for polygon in polygons {
        let n = polygon.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            if let Some(edge) = Edge::new(polygon[i], polygon[(i + 1) % n]) {
                min = min.min(Vec2::new(edge.x0.min(edge.x1), edge.y0));
                max = max.max(Vec2::new(edge.x0.max(edge.x1), edge.y1));
                edges.push(edge);
            }
        }
    }
    if edges.is_empty() {
        return Coverage::default();
    }

    let x_start = min.x.floor().max(0.0) as u32;
    let y_start = min.y.floor().max(0.0) as u32;
    let x_end = (max.x.ceil().min(width as f32)).max(0.0) as u32;
    let y_end = (max.y.ceil().min(height as f32)).max(0.0) as u32;
    if x_end <= x_start || y_end <= y_start {
        return Coverage::default();
    }
    let span_width = (x_end - x_start) as usize;
    trace!(
        edges = edges.len(),
        x = x_start,
        y = y_start,
        w = span_width,
        h = y_end - y_start,
        "rasterize"
    );

    edges.sort_by(|a, b| a.y0.total_cmp(&b.y0));

    let mut data = vec![0u8; span_width * (y_end - y_start) as usize];
    let mut accum = vec![0f32; span_width];
    let mut active: Vec<Edge> = Vec::new();
    let mut crossings: Vec<(f32, i32)> = Vec::new();
    let mut next_edge = 0;
    let (left, right) = (x_start as f32, x_end as f32);

    for (row, y) in (y_start..y_end).enumerate() {
        let row_top = y as f32;
        while next_edge < edges.len() && edges[next_edge].y0 < row_top + 1.0 {
            active.push(edges[next_edge]);
            next_edge += 1;
        }
        active.retain(|e| e.y1 > row_top);
        if active.is_empty() {
            continue;
        }

        accum.iter_mut().for_each(|v| *v = 0.0);
        for sample in 0..SUBSAMPLES {
            let sy = row_top + (sample as f32 + 0.5) / SUBSAMPLES as f32;
            crossings.clear();
            for edge in active.iter() {
                if edge.y0 <= sy && sy < edge.y1 {
                    crossings.push((edge.x_at(sy), edge.winding));
                }
            }
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            for pair in crossings.windows(2) {
                winding += pair[0].1;
                if rule.is_inside(winding) {
                    let xa = pair[0].0.max(left);
                    let xb = pair[1].0.min(right);
                    if xb > xa {
                        add_span(&mut accum, xa - left, xb - left);
                    }
                }
            }
        }

        let out = &mut data[row * span_width..(row + 1) * span_width];
        for (dst, acc) in out.iter_mut().zip(accum.iter()) {
            let v = acc / SUBSAMPLES as f32;
            *dst = (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        }
    }

    Coverage {
        x: x_start,
        y: y_start,
        width: span_width as u32,
        height: y_end - y_start,
        data,
    }
}

/// Add the exact horizontal coverage of `[xa, xb)` to each pixel
fn add_span(accum: &mut [f32], xa: f32, xb: f32) {
    let len = accum.len();
    let ia = xa.floor() as usize;
    let ib = xb.floor() as usize;
    if ia >= len {
        return;
    }
    if ia == ib {
        accum[ia] += xb - xa;
        return;
    }
    accum[ia] += (ia + 1) as f32 - xa;
    for v in accum.iter_mut().take(ib.min(len)).skip(ia + 1) {
        *v += 1.0;
    }
    if ib < len {
        accum[ib] += xb - ib as f32;
    }
}

/// Winding number of the closed polygons around `point`
pub fn winding_number(polygons: &[Vec<Vec2>], point: Vec2) -> i32 {
    let mut winding = 0;
    for polygon in polygons {
        let n = polygon.len();
        if n < 2 {
            continue;
        }
        for i in 0..n {
            let (a, b) = (polygon[i], polygon[(i + 1) % n]);
            let side = (b - a).cross(point - a);
            if a.y <= point.y {
                if b.y > point.y && side > 0.0 {
                    winding += 1;
                }
            } else if b.y <= point.y && side < 0.0 {
                winding -= 1;
            }
        }
    }
    winding
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x: f32, y: f32, size: f32) -> Vec<Vec2> {
        vec![
            Vec2::new(x, y),
            Vec2::new(x + size, y),
            Vec2::new(x + size, y + size),
            Vec2::new(x, y + size),
        ]
    }

    #[test]
    fn test_aligned_square_is_fully_covered() {
        let cov = rasterize(&[square(2.0, 2.0, 4.0)], WindingRule::NonZero, 10, 10);
        assert_eq!(cov.bounds(), (2, 2, 4, 4));
        assert_eq!(cov.get(2, 2), 255);
        assert_eq!(cov.get(5, 5), 255);
        assert_eq!(cov.get(6, 6), 0);
        assert_eq!(cov.get(1, 3), 0);
    }

    #[test]
    fn test_half_pixel_edge() {
        let cov = rasterize(&[square(0.5, 0.0, 2.0)], WindingRule::NonZero, 4, 4);
        assert_eq!(cov.get(0, 0), 128);
        assert_eq!(cov.get(1, 0), 255);
        assert_eq!(cov.get(2, 0), 128);
    }

    #[test]
    fn test_winding_rules_differ_on_overlap() {
        let shapes = [square(0.0, 0.0, 10.0), square(5.0, 0.0, 10.0)];
        let nonzero = rasterize(&shapes, WindingRule::NonZero, 20, 20);
        let evenodd = rasterize(&shapes, WindingRule::EvenOdd, 20, 20);
        assert_eq!(nonzero.get(7, 5), 255);
        assert_eq!(evenodd.get(7, 5), 0);
        assert_eq!(evenodd.get(2, 5), 255);
        assert_eq!(evenodd.get(12, 5), 255);
    }

    #[test]
    fn test_clipped_to_target() {
        let cov = rasterize(&[square(-5.0, -5.0, 8.0)], WindingRule::NonZero, 2, 2);
        assert_eq!(cov.bounds(), (0, 0, 2, 2));
        assert!(cov.rows().all(|(_, _, row)| row.iter().all(|v| *v == 255)));
        assert!(rasterize(&[square(5.0, 5.0, 2.0)], WindingRule::NonZero, 2, 2).is_empty());
    }

    #[test]
    fn test_winding_number_orientation() {
        let cw = square(0.0, 0.0, 4.0);
        let mut ccw = cw.clone();
        ccw.reverse();
        let p = Vec2::new(2.0, 2.0);
        assert_eq!(winding_number(&[cw.clone()], p).abs(), 1);
        assert_eq!(winding_number(&[cw, ccw], p), 0);
        assert_eq!(winding_number(&[square(0.0, 0.0, 4.0)], Vec2::new(5.0, 2.0)), 0);
    }
}
