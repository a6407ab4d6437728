//! Gradient evaluation

use std::f32::consts::TAU;

use pigment_core::{ColorStop, Mat3, PigmentError, Result, Vec2};

use crate::blend::Premul;

/// Gradient geometry
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GradientShape {
    /// Varies along the line from the first handle to the second
    Linear,
    /// Centered on the first handle; the second handle marks t = 1.
    /// A third handle makes the gradient elliptical.
    Radial,
    /// Sweeps around the first handle, starting at the direction of the second
    Angular,
}

/// A gradient ready for per-pixel evaluation
#[derive(Clone, Debug)]
pub struct Gradient {
    shape: GradientShape,
    start: Vec2,
    end: Vec2,
    /// Maps target space into the unit frame of an elliptical radial gradient
    frame: Option<Mat3>,
    stops: Vec<ColorStop>,
}

impl Gradient {
    pub fn new(shape: GradientShape, handles: &[Vec2], stops: &[ColorStop]) -> Result<Self> {
        const OP: &str = "gradient";
        if handles.len() < 2 {
            return Err(PigmentError::invalid(
                OP,
                format!("needs at least 2 handle positions, got {}", handles.len()),
            ));
        }
        if stops.is_empty() {
            return Err(PigmentError::invalid(OP, "needs at least one color stop"));
        }
        if handles.iter().any(|h| !h.is_finite()) {
            return Err(PigmentError::invalid(OP, "handle positions must be finite"));
        }

        let (start, end) = (handles[0], handles[1]);
        let frame = match (shape, handles.get(2)) {
            (GradientShape::Radial, Some(third)) => {
                let (u, v) = (end - start, *third - start);
                Mat3::from_affine(u.x, v.x, start.x, u.y, v.y, start.y).inverse()
            }
            _ => None,
        };

        Ok(Self {
            shape,
            start,
            end,
            frame,
            stops: sort_stops(stops),
        })
    }

    /// Gradient parameter at a target-space point, not yet clamped
    pub fn parameter(&self, p: Vec2) -> f32 {
        match self.shape {
            GradientShape::Linear => {
                let axis = self.end - self.start;
                let len2 = axis.length_squared();
                if len2 == 0.0 {
                    0.0
                } else {
                    (p - self.start).dot(axis) / len2
                }
            }
            GradientShape::Radial => match self.frame {
                Some(frame) => frame.transform_point(p).length(),
                None => {
                    let radius = self.start.distance(self.end);
                    if radius == 0.0 {
                        1.0
                    } else {
                        p.distance(self.start) / radius
                    }
                }
            },
            GradientShape::Angular => {
                let base = (self.end - self.start).angle();
                let angle = (p - self.start).angle();
                ((angle - base) / TAU).rem_euclid(1.0)
            }
        }
    }

    pub fn color_at(&self, p: Vec2) -> Premul {
        color_at(&self.stops, self.parameter(p))
    }
}

/// Stops ordered by position, keeping the given order for ties
pub fn sort_stops(stops: &[ColorStop]) -> Vec<ColorStop> {
    let mut sorted = stops.to_vec();
    sorted.sort_by(|a, b| a.position.total_cmp(&b.position));
    sorted
}

/// Premultiplied color at `t` over sorted stops, clamping outside the range
pub fn color_at(stops: &[ColorStop], t: f32) -> Premul {
    let (first, last) = match (stops.first(), stops.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => return [0.0; 4],
    };
    if !(t > first.position) {
        return first.color.premultiplied();
    }
    if t >= last.position {
        return last.color.premultiplied();
    }
    for pair in stops.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        if t <= b.position {
            let span = b.position - a.position;
            let k = if span > 0.0 { (t - a.position) / span } else { 1.0 };
            let (ca, cb) = (a.color.premultiplied(), b.color.premultiplied());
            return [
                ca[0] + (cb[0] - ca[0]) * k,
                ca[1] + (cb[1] - ca[1]) * k,
                ca[2] + (cb[2] - ca[2]) * k,
                ca[3] + (cb[3] - ca[3]) * k,
            ];
        }
    }
    last.color.premultiplied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigment_core::{Color, ErrorKind};

    fn stops() -> Vec<ColorStop> {
        vec![
            ColorStop::new(Color::WHITE, 1.0),
            ColorStop::new(Color::BLACK, 0.0),
        ]
    }

    #[test]
    fn test_requires_two_handles_and_a_stop() {
        let err = Gradient::new(GradientShape::Linear, &[Vec2::ZERO], &stops()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let handles = [Vec2::ZERO, Vec2::new(1.0, 0.0)];
        assert!(Gradient::new(GradientShape::Linear, &handles, &[]).is_err());
    }

    #[test]
    fn test_linear_projects_and_clamps() {
        let g = Gradient::new(
            GradientShape::Linear,
            &[Vec2::new(0.0, 0.0), Vec2::new(100.0, 0.0)],
            &stops(),
        )
        .unwrap();
        assert_eq!(g.parameter(Vec2::new(50.0, 30.0)), 0.5);
        let mid = g.color_at(Vec2::new(50.0, 0.0));
        assert!((mid[0] - 0.5).abs() < 1e-5 && mid[3] == 1.0);
        assert_eq!(g.color_at(Vec2::new(-20.0, 0.0)), [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(g.color_at(Vec2::new(200.0, 0.0)), [1.0, 1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_radial_and_elliptical() {
        let center = Vec2::new(10.0, 10.0);
        let circle = Gradient::new(GradientShape::Radial, &[center, Vec2::new(20.0, 10.0)], &stops()).unwrap();
        assert!((circle.parameter(Vec2::new(10.0, 15.0)) - 0.5).abs() < 1e-6);

        let ellipse = Gradient::new(
            GradientShape::Radial,
            &[center, Vec2::new(20.0, 10.0), Vec2::new(10.0, 30.0)],
            &stops(),
        )
        .unwrap();
        assert!((ellipse.parameter(Vec2::new(10.0, 30.0)) - 1.0).abs() < 1e-5);
        assert!((ellipse.parameter(Vec2::new(15.0, 10.0)) - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_angular_wraps_from_second_handle() {
        let g = Gradient::new(
            GradientShape::Angular,
            &[Vec2::ZERO, Vec2::new(1.0, 0.0)],
            &stops(),
        )
        .unwrap();
        assert!((g.parameter(Vec2::new(0.0, 1.0)) - 0.25).abs() < 1e-5);
        assert!((g.parameter(Vec2::new(0.0, -1.0)) - 0.75).abs() < 1e-5);
    }

    #[test]
    fn test_premultiplied_interpolation() {
        let stops = [
            ColorStop::new(Color::RED, 0.0),
            ColorStop::new(Color::TRANSPARENT, 1.0),
        ];
        let c = color_at(&stops, 0.5);
        assert!((c[0] - 0.5).abs() < 1e-6 && (c[3] - 0.5).abs() < 1e-6);
    }
}
