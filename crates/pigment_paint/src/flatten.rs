//! Curve flattening into polylines

use pigment_core::{Mat3, Vec2};

use crate::path::PathCommand;

/// Maximum distance between a curve and its polyline, in device pixels
pub const DEFAULT_TOLERANCE: f32 = 0.25;

const MAX_SEGMENTS: f32 = 1000.0;

/// One flattened subpath
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Contour {
    pub points: Vec<Vec2>,
    /// Ended with an explicit close command
    pub closed: bool,
}

impl Contour {
    /// Total polyline length, counting the closing edge of closed contours
    pub fn length(&self) -> f32 {
        let open: f32 = self.points.windows(2).map(|w| w[0].distance(w[1])).sum();
        match (self.closed, self.points.first(), self.points.last()) {
            (true, Some(first), Some(last)) => open + first.distance(*last),
            _ => open,
        }
    }
}

/// Flatten commands under `transform` so every chord stays within `tolerance`
pub fn flatten(commands: &[PathCommand], transform: &Mat3, tolerance: f32) -> Vec<Contour> {
    let tolerance = if tolerance > 0.0 && tolerance.is_finite() {
        tolerance
    } else {
        DEFAULT_TOLERANCE
    };
    let tf = |p: Vec2| transform.transform_point(p);

    let mut contours = Vec::new();
    let mut current = Contour::default();
    let mut start = Vec2::ZERO;
    let mut last = Vec2::ZERO;

    let finish = |current: &mut Contour, contours: &mut Vec<Contour>| {
        if !current.points.is_empty() {
            contours.push(std::mem::take(current));
        }
    };

    for cmd in commands {
        match *cmd {
            PathCommand::MoveTo(p) => {
                finish(&mut current, &mut contours);
                start = tf(p);
                last = start;
                current.points.push(start);
            }
            PathCommand::LineTo(p) => {
                if current.points.is_empty() {
                    current.points.push(last);
                }
                last = tf(p);
                current.points.push(last);
            }
            PathCommand::QuadTo { control, end } => {
                if current.points.is_empty() {
                    current.points.push(last);
                }
                let (p1, p2) = (tf(control), tf(end));
                flatten_quad(last, p1, p2, tolerance, &mut current.points);
                last = p2;
            }
            PathCommand::CubicTo {
                control1,
                control2,
                end,
            } => {
                if current.points.is_empty() {
                    current.points.push(last);
                }
                let (p1, p2, p3) = (tf(control1), tf(control2), tf(end));
                flatten_cubic(last, p1, p2, p3, tolerance, &mut current.points);
                last = p3;
            }
            PathCommand::Close => {
                if !current.points.is_empty() {
                    if current.points.len() > 1 && current.points.last() == Some(&start) {
                        current.points.pop();
                    }
                    current.closed = true;
                    finish(&mut current, &mut contours);
                }
                last = start;
            }
        }
    }
    finish(&mut current, &mut contours);
    contours
}

/// Segment count bound for a Bezier with the given second differences
fn segment_count(second_diff: f32, degree_factor: f32, tolerance: f32) -> usize {
    let n = (degree_factor * second_diff / tolerance).sqrt().ceil();
    if n.is_finite() {
        n.clamp(1.0, MAX_SEGMENTS) as usize
    } else {
        1
    }
}

fn flatten_quad(p0: Vec2, p1: Vec2, p2: Vec2, tolerance: f32, out: &mut Vec<Vec2>) {
    let dd = (p0 - p1 * 2.0 + p2).length();
    let n = segment_count(dd, 0.25, tolerance);
    for i in 1..=n {
        let t = i as f32 / n as f32;
        let mt = 1.0 - t;
        out.push(p0 * (mt * mt) + p1 * (2.0 * mt * t) + p2 * (t * t));
    }
}

fn flatten_cubic(p0: Vec2, p1: Vec2, p2: Vec2, p3: Vec2, tolerance: f32, out: &mut Vec<Vec2>) {
    let dd = (p0 - p1 * 2.0 + p2)
        .length()
        .max((p1 - p2 * 2.0 + p3).length());
    let n = segment_count(dd, 0.75, tolerance);
    for i in 1..=n {
        let t = i as f32 / n as f32;
        let mt = 1.0 - t;
        out.push(
            p0 * (mt * mt * mt)
                + p1 * (3.0 * mt * mt * t)
                + p2 * (3.0 * mt * t * t)
                + p3 * (t * t * t),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Path;

    #[test]
    fn test_close_drops_duplicate_start() {
        let mut path = Path::new();
        path.rect(0.0, 0.0, 4.0, 4.0, true);
        let contours = path.flatten(&Mat3::IDENTITY, DEFAULT_TOLERANCE);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].points.len(), 4);
        assert!(contours[0].closed);
        assert_eq!(contours[0].length(), 16.0);
    }

    #[test]
    fn test_quarter_circle_stays_within_tolerance() {
        let mut path = Path::new();
        path.circle(0.0, 0.0, 100.0).unwrap();
        let contours = path.flatten(&Mat3::IDENTITY, 0.25);
        let points = &contours[0].points;
        assert!(points.len() > 16);
        for w in points.windows(2) {
            let mid = (w[0] + w[1]) / 2.0;
            assert!((100.0 - mid.length()) < 0.3, "chord too far from arc");
        }
    }

    #[test]
    fn test_line_after_close_starts_new_contour_at_start() {
        let mut path = Path::new();
        path.move_to(1.0, 1.0);
        path.line_to(5.0, 1.0);
        path.line_to(5.0, 5.0);
        path.close_path();
        path.line_to(9.0, 9.0);
        let contours = path.flatten(&Mat3::IDENTITY, DEFAULT_TOLERANCE);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[1].points, vec![Vec2::new(1.0, 1.0), Vec2::new(9.0, 9.0)]);
        assert!(!contours[1].closed);
    }
}
