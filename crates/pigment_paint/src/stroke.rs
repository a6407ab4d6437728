//! Stroke outlines
//!
//! A stroke is the union of simple pieces: one quad per segment, a join
//! polygon per corner and a cap polygon per open end. Every piece is
//! oriented positively so the union fills correctly under non-zero.

use std::f32::consts::TAU;

use pigment_core::{LineCap, LineJoin, Vec2, DEFAULT_MITER_LIMIT};

use crate::flatten::Contour;

const EPSILON: f32 = 1e-6;

/// Stroke style
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeOptions {
    pub width: f32,
    pub cap: LineCap,
    pub join: LineJoin,
    pub miter_limit: f32,
    /// Alternating on/off lengths; empty for a solid stroke
    pub dashes: Vec<f32>,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            width: 1.0,
            cap: LineCap::Butt,
            join: LineJoin::Miter,
            miter_limit: DEFAULT_MITER_LIMIT,
            dashes: Vec::new(),
        }
    }
}

/// Corner angle (radians) below which a miter turns into a bevel
///
/// Limits below 1 (and NaN) act as 1, which bevels every corner.
pub fn miter_limit_to_angle(limit: f32) -> f32 {
    2.0 * (1.0 / limit.max(1.0)).asin()
}

/// Inverse of [`miter_limit_to_angle`]
pub fn angle_to_miter_limit(angle: f32) -> f32 {
    1.0 / (angle / 2.0).sin()
}

/// Outline polygons covering the stroke of `contours`
pub fn stroke_contours(contours: &[Contour], options: &StrokeOptions, tolerance: f32) -> Vec<Vec<Vec2>> {
    let half = options.width / 2.0;
    if !(half > 0.0) || !half.is_finite() {
        return Vec::new();
    }

    let mut pieces = Vec::new();
    for contour in contours {
        let points = dedup(&contour.points);
        if points.len() < 2 {
            continue;
        }
        let closed = contour.closed && points.len() > 2;
        match dash_pattern(&options.dashes) {
            Some(pattern) => {
                for dash in split_dashes(&points, contour.closed, &pattern) {
                    let dash = dedup(&dash);
                    if dash.len() >= 2 {
                        stroke_polyline(&dash, false, half, options, tolerance, &mut pieces);
                    }
                }
            }
            None => stroke_polyline(&points, closed, half, options, tolerance, &mut pieces),
        }
    }

    for piece in pieces.iter_mut() {
        if signed_area(piece) < 0.0 {
            piece.reverse();
        }
    }
    pieces.retain(|p| signed_area(p).abs() > EPSILON);
    pieces
}

/// Even-length dash pattern, or `None` for a solid stroke
fn dash_pattern(dashes: &[f32]) -> Option<Vec<f32>> {
    if dashes.is_empty() || dashes.iter().any(|d| !(*d >= 0.0) || !d.is_finite()) {
        return None;
    }
    if dashes.iter().sum::<f32>() <= 0.0 {
        return None;
    }
    let mut pattern = dashes.to_vec();
    if pattern.len() % 2 == 1 {
        pattern.extend_from_slice(dashes);
    }
    Some(pattern)
}

/// Cut a polyline into the "on" intervals of a cycling dash pattern
fn split_dashes(points: &[Vec2], closed: bool, pattern: &[f32]) -> Vec<Vec<Vec2>> {
    let mut path: Vec<Vec2> = points.to_vec();
    if closed {
        path.push(points[0]);
    }

    let mut dashes = Vec::new();
    let mut index = 0;
    let mut remaining = pattern[0];
    let mut on = true;
    let mut current: Vec<Vec2> = vec![path[0]];

    for w in path.windows(2) {
        let (mut a, b) = (w[0], w[1]);
        let mut seg_len = a.distance(b);
        while seg_len > 0.0 {
            if remaining >= seg_len {
                remaining -= seg_len;
                if on {
                    current.push(b);
                }
                seg_len = 0.0;
            } else {
                let split = a.lerp(b, remaining / seg_len);
                seg_len -= remaining;
                a = split;
                if on {
                    current.push(split);
                    dashes.push(std::mem::take(&mut current));
                } else {
                    current = vec![split];
                }
                on = !on;
                index = (index + 1) % pattern.len();
                remaining = pattern[index];
            }
        }
    }
    if on && current.len() >= 2 {
        dashes.push(current);
    }
    dashes
}

fn stroke_polyline(
    points: &[Vec2],
    closed: bool,
    half: f32,
    options: &StrokeOptions,
    tolerance: f32,
    pieces: &mut Vec<Vec<Vec2>>,
) {
    let n = points.len();
    let segments = if closed { n } else { n - 1 };

    for i in 0..segments {
        let (a, b) = (points[i], points[(i + 1) % n]);
        let normal = (b - a).normalize().perp() * half;
        pieces.push(vec![a + normal, b + normal, b - normal, a - normal]);
    }

    let joins = if closed { 0..n } else { 1..n - 1 };
    for i in joins {
        let prev = points[(i + n - 1) % n];
        let vertex = points[i];
        let next = points[(i + 1) % n];
        add_join(prev, vertex, next, half, options, tolerance, pieces);
    }

    if !closed {
        let start_dir = (points[1] - points[0]).normalize();
        let end_dir = (points[n - 1] - points[n - 2]).normalize();
        add_cap(points[0], -start_dir, half, options.cap, tolerance, pieces);
        add_cap(points[n - 1], end_dir, half, options.cap, tolerance, pieces);
    }
}

fn add_join(
    prev: Vec2,
    vertex: Vec2,
    next: Vec2,
    half: f32,
    options: &StrokeOptions,
    tolerance: f32,
    pieces: &mut Vec<Vec<Vec2>>,
) {
    let d0 = (vertex - prev).normalize();
    let d1 = (next - vertex).normalize();
    let turn = d0.cross(d1);
    if turn.abs() < EPSILON && d0.dot(d1) > 0.0 {
        return;
    }

    if options.join == LineJoin::Round {
        pieces.push(circle_polygon(vertex, half, tolerance));
        return;
    }

    // Outer side of the corner
    let side = if turn > 0.0 { -1.0 } else { 1.0 };
    let o0 = d0.perp() * (half * side);
    let o1 = d1.perp() * (half * side);

    if options.join == LineJoin::Miter {
        // Interior angle between the two segments
        let theta = std::f32::consts::PI - d0.dot(d1).clamp(-1.0, 1.0).acos();
        let ratio = angle_to_miter_limit(theta);
        if ratio.is_finite() && ratio <= options.miter_limit {
            let tip = vertex + (o0 + o1).normalize() * (half * ratio);
            pieces.push(vec![vertex, vertex + o0, tip, vertex + o1]);
            return;
        }
    }
    pieces.push(vec![vertex, vertex + o0, vertex + o1]);
}

/// Cap at `point`, with `outward` pointing away from the stroke
fn add_cap(
    point: Vec2,
    outward: Vec2,
    half: f32,
    cap: LineCap,
    tolerance: f32,
    pieces: &mut Vec<Vec<Vec2>>,
) {
    match cap {
        LineCap::Butt => {}
        LineCap::Round => pieces.push(circle_polygon(point, half, tolerance)),
        LineCap::Square => {
            let normal = outward.perp() * half;
            let ext = outward * half;
            pieces.push(vec![
                point + normal,
                point + normal + ext,
                point - normal + ext,
                point - normal,
            ]);
        }
    }
}

fn circle_polygon(center: Vec2, radius: f32, tolerance: f32) -> Vec<Vec2> {
    let step = if tolerance < radius {
        2.0 * (1.0 - tolerance / radius).acos()
    } else {
        TAU / 8.0
    };
    let count = (TAU / step).ceil().clamp(8.0, 256.0) as usize;
    (0..count)
        .map(|i| {
            let angle = i as f32 * TAU / count as f32;
            center + Vec2::new(angle.cos(), angle.sin()) * radius
        })
        .collect()
}

fn dedup(points: &[Vec2]) -> Vec<Vec2> {
    let mut out: Vec<Vec2> = Vec::with_capacity(points.len());
    for p in points {
        if out.last().map_or(true, |last| last.distance(*p) > EPSILON) {
            out.push(*p);
        }
    }
    out
}

pub(crate) fn signed_area(polygon: &[Vec2]) -> f32 {
    let n = polygon.len();
    (0..n)
        .map(|i| polygon[i].cross(polygon[(i + 1) % n]))
        .sum::<f32>()
        / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::winding_number;
    use crate::Path;
    use pigment_core::Mat3;

    fn outline(path: &Path, options: &StrokeOptions) -> Vec<Vec<Vec2>> {
        path.stroke_polygons(&Mat3::IDENTITY, options)
    }

    fn inside(polygons: &[Vec<Vec2>], x: f32, y: f32) -> bool {
        winding_number(polygons, Vec2::new(x, y)) != 0
    }

    #[test]
    fn test_miter_limit_angle_round_trip() {
        for limit in [1.5f32, 4.0, 10.0] {
            let angle = miter_limit_to_angle(limit);
            assert!((angle_to_miter_limit(angle) - limit).abs() < 1e-3);
        }
    }

    #[test]
    fn test_miter_limit_below_one_bevels_everything() {
        for limit in [0.5f32, 0.0, -3.0, f32::NAN] {
            assert_eq!(miter_limit_to_angle(limit), std::f32::consts::PI);
        }
    }

    #[test]
    fn test_zero_width_or_length_is_empty() {
        let mut path = Path::new();
        path.move_to(5.0, 5.0);
        path.line_to(5.0, 5.0);
        let options = StrokeOptions {
            cap: LineCap::Round,
            ..Default::default()
        };
        assert!(outline(&path, &options).is_empty());

        let mut line = Path::new();
        line.move_to(0.0, 0.0);
        line.line_to(10.0, 0.0);
        let zero = StrokeOptions {
            width: 0.0,
            ..Default::default()
        };
        assert!(outline(&line, &zero).is_empty());
    }

    #[test]
    fn test_square_cap_extends_by_half_width() {
        let mut path = Path::new();
        path.move_to(10.0, 10.0);
        path.line_to(20.0, 10.0);
        let square = StrokeOptions {
            width: 4.0,
            cap: LineCap::Square,
            ..Default::default()
        };
        let polys = outline(&path, &square);
        assert!(inside(&polys, 8.5, 10.0));
        assert!(!inside(&polys, 7.5, 10.0));
        assert!(inside(&polys, 21.5, 11.0));
    }

    #[test]
    fn test_miter_corner_reaches_tip() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(10.0, 0.0);
        path.line_to(10.0, 10.0);
        let options = StrokeOptions {
            width: 2.0,
            ..Default::default()
        };
        // Outer corner of the right angle sits at (11, -1)
        assert!(inside(&outline(&path, &options), 10.8, -0.8));
        let bevel = StrokeOptions {
            join: LineJoin::Bevel,
            ..options
        };
        assert!(!inside(&outline(&path, &bevel), 10.8, -0.8));
    }

    #[test]
    fn test_dashes_leave_gaps() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(30.0, 0.0);
        let options = StrokeOptions {
            width: 2.0,
            dashes: vec![5.0, 5.0],
            ..Default::default()
        };
        let polys = outline(&path, &options);
        assert!(inside(&polys, 2.5, 0.0));
        assert!(!inside(&polys, 7.5, 0.0));
        assert!(inside(&polys, 12.5, 0.0));
        assert!(!inside(&polys, 27.5, 0.0));
    }

    #[test]
    fn test_pieces_are_positively_oriented() {
        let mut path = Path::new();
        path.rect(0.0, 0.0, 10.0, 10.0, false);
        let options = StrokeOptions {
            width: 3.0,
            join: LineJoin::Round,
            ..Default::default()
        };
        for piece in outline(&path, &options) {
            assert!(signed_area(&piece) > 0.0);
        }
    }
}
