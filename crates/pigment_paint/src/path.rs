//! Path building and representation

use std::f32::consts::{PI, TAU};
use std::fmt;

use pigment_core::{ensure_finite, Mat3, PigmentError, Rect, Result, Vec2, WindingRule};
use smallvec::SmallVec;

use crate::flatten::{flatten, Contour, DEFAULT_TOLERANCE};
use crate::raster::winding_number;
use crate::stroke::{signed_area, stroke_contours, StrokeOptions};

/// Cubic control-point distance for a quarter circle of radius 1
const KAPPA: f32 = 0.552_284_8;

/// Path command, all coordinates absolute
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo {
        control: Vec2,
        end: Vec2,
    },
    CubicTo {
        control1: Vec2,
        control2: Vec2,
        end: Vec2,
    },
    Close,
}

/// A 2D path composed of commands
///
/// Arcs, ellipses and rounded corners are stored as cubic segments.
/// A `Path` is not internally synchronized; concurrent writers must lock it.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    commands: SmallVec<[PathCommand; 16]>,
    start: Vec2,
    current: Option<Vec2>,
}

impl Path {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[PathCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Last point of the path, `None` before the first command
    pub fn current_point(&self) -> Option<Vec2> {
        self.current
    }

    pub fn clear(&mut self) {
        self.commands.clear();
        self.start = Vec2::ZERO;
        self.current = None;
    }

    pub fn move_to(&mut self, x: f32, y: f32) {
        let point = Vec2::new(x, y);
        self.commands.push(PathCommand::MoveTo(point));
        self.start = point;
        self.current = Some(point);
    }

    /// Starts a subpath at the point when there is none
    pub fn line_to(&mut self, x: f32, y: f32) {
        if self.current.is_none() {
            self.move_to(x, y);
            return;
        }
        let point = Vec2::new(x, y);
        self.commands.push(PathCommand::LineTo(point));
        self.current = Some(point);
    }

    pub fn bezier_curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x3: f32, y3: f32) {
        self.ensure_subpath(x1, y1);
        let end = Vec2::new(x3, y3);
        self.commands.push(PathCommand::CubicTo {
            control1: Vec2::new(x1, y1),
            control2: Vec2::new(x2, y2),
            end,
        });
        self.current = Some(end);
    }

    pub fn quadratic_curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32) {
        self.ensure_subpath(x1, y1);
        let end = Vec2::new(x2, y2);
        self.commands.push(PathCommand::QuadTo {
            control: Vec2::new(x1, y1),
            end,
        });
        self.current = Some(end);
    }

    /// SVG elliptical arc from the current point to `(x, y)`
    ///
    /// `x_axis_rotation` is in degrees. A zero radius draws a straight line,
    /// as SVG requires; a negative radius is an error.
    #[allow(clippy::too_many_arguments)]
    pub fn elliptical_arc_to(
        &mut self,
        rx: f32,
        ry: f32,
        x_axis_rotation: f32,
        large_arc: bool,
        sweep: bool,
        x: f32,
        y: f32,
    ) -> Result<()> {
        const OP: &str = "elliptical_arc_to";
        ensure_finite(
            OP,
            &[
                ("rx", rx),
                ("ry", ry),
                ("x_axis_rotation", x_axis_rotation),
                ("x", x),
                ("y", y),
            ],
        )?;
        if rx < 0.0 || ry < 0.0 {
            return Err(PigmentError::geometry(
                OP,
                format!("radii must be >= 0, got rx={} ry={}", rx, ry),
            ));
        }

        let from = match self.current {
            Some(p) => p,
            None => {
                self.move_to(x, y);
                return Ok(());
            }
        };
        let to = Vec2::new(x, y);
        if from == to {
            return Ok(());
        }
        if rx == 0.0 || ry == 0.0 {
            self.line_to(x, y);
            return Ok(());
        }

        let phi = x_axis_rotation.to_radians();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let half = (from - to) / 2.0;
        let x1p = cos_phi * half.x + sin_phi * half.y;
        let y1p = -sin_phi * half.x + cos_phi * half.y;

        let (mut rx, mut ry) = (rx, ry);
        let lambda = (x1p * x1p) / (rx * rx) + (y1p * y1p) / (ry * ry);
        if lambda > 1.0 {
            let s = lambda.sqrt();
            rx *= s;
            ry *= s;
        }

        let num = rx * rx * ry * ry - rx * rx * y1p * y1p - ry * ry * x1p * x1p;
        let den = rx * rx * y1p * y1p + ry * ry * x1p * x1p;
        let mut coef = if den > 0.0 { (num / den).max(0.0).sqrt() } else { 0.0 };
        if large_arc == sweep {
            coef = -coef;
        }
        let cxp = coef * rx * y1p / ry;
        let cyp = -coef * ry * x1p / rx;
        let mid = (from + to) / 2.0;
        let center = Vec2::new(
            cos_phi * cxp - sin_phi * cyp + mid.x,
            sin_phi * cxp + cos_phi * cyp + mid.y,
        );

        let u = Vec2::new((x1p - cxp) / rx, (y1p - cyp) / ry);
        let v = Vec2::new((-x1p - cxp) / rx, (-y1p - cyp) / ry);
        let theta1 = u.angle();
        let mut delta = u.cross(v).atan2(u.dot(v));
        if !sweep && delta > 0.0 {
            delta -= TAU;
        } else if sweep && delta < 0.0 {
            delta += TAU;
        }

        self.push_arc(center, rx, ry, phi, theta1, delta);
        // Land exactly on the requested end point
        self.current = Some(to);
        if let Some(PathCommand::CubicTo { end, .. }) = self.commands.last_mut() {
            *end = to;
        }
        Ok(())
    }

    /// Canvas-style circular arc around `(x, y)` from angle `a0` to `a1`
    ///
    /// Connects to the arc start with a line when a subpath is open.
    pub fn arc(&mut self, x: f32, y: f32, r: f32, a0: f32, a1: f32, ccw: bool) -> Result<()> {
        const OP: &str = "arc";
        ensure_finite(
            OP,
            &[("x", x), ("y", y), ("r", r), ("a0", a0), ("a1", a1)],
        )?;
        if r < 0.0 {
            return Err(PigmentError::geometry(
                OP,
                format!("radius must be >= 0, got {}", r),
            ));
        }

        let sweep = arc_sweep(a0, a1, ccw);
        if r == 0.0 && sweep != 0.0 {
            return Err(PigmentError::geometry(
                OP,
                format!("zero radius with a sweep of {} radians", sweep),
            ));
        }

        let center = Vec2::new(x, y);
        let start = center + Vec2::new(a0.cos(), a0.sin()) * r;
        match self.current {
            Some(_) => self.line_to(start.x, start.y),
            None => self.move_to(start.x, start.y),
        }
        if sweep != 0.0 {
            self.push_arc(center, r, r, 0.0, a0, sweep);
        }
        Ok(())
    }

    /// Canvas-style fillet between the lines current→p1 and p1→p2
    pub fn arc_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, r: f32) -> Result<()> {
        const OP: &str = "arc_to";
        ensure_finite(
            OP,
            &[("x1", x1), ("y1", y1), ("x2", x2), ("y2", y2), ("r", r)],
        )?;
        if r < 0.0 {
            return Err(PigmentError::geometry(
                OP,
                format!("radius must be >= 0, got {}", r),
            ));
        }

        let p0 = match self.current {
            Some(p) => p,
            None => {
                self.move_to(x1, y1);
                Vec2::new(x1, y1)
            }
        };
        let p1 = Vec2::new(x1, y1);
        let p2 = Vec2::new(x2, y2);

        let v1 = (p0 - p1).normalize();
        let v2 = (p2 - p1).normalize();
        let collinear = v1.cross(v2).abs() < 1e-6;
        if p0 == p1 || p1 == p2 || r == 0.0 || collinear {
            self.line_to(x1, y1);
            return Ok(());
        }

        let theta = v1.dot(v2).clamp(-1.0, 1.0).acos();
        let tangent_dist = r / (theta / 2.0).tan();
        let t1 = p1 + v1 * tangent_dist;
        let t2 = p1 + v2 * tangent_dist;
        let center = p1 + (v1 + v2).normalize() * (r / (theta / 2.0).sin());

        self.line_to(t1.x, t1.y);
        let a0 = (t1 - center).angle();
        let a1 = (t2 - center).angle();
        let mut delta = a1 - a0;
        if delta > PI {
            delta -= TAU;
        } else if delta < -PI {
            delta += TAU;
        }
        self.push_arc(center, r, r, 0.0, a0, delta);
        Ok(())
    }

    /// Closed rectangle subpath
    pub fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, clockwise: bool) {
        self.move_to(x, y);
        if clockwise {
            self.line_to(x + w, y);
            self.line_to(x + w, y + h);
            self.line_to(x, y + h);
        } else {
            self.line_to(x, y + h);
            self.line_to(x + w, y + h);
            self.line_to(x + w, y);
        }
        self.close_path();
    }

    /// Closed rectangle with per-corner radii
    ///
    /// Radii are scaled down together when adjacent corners would overlap.
    #[allow(clippy::too_many_arguments)]
    pub fn rounded_rect(
        &mut self,
        x: f32,
        y: f32,
        w: f32,
        h: f32,
        nw: f32,
        ne: f32,
        se: f32,
        sw: f32,
        clockwise: bool,
    ) -> Result<()> {
        const OP: &str = "rounded_rect";
        ensure_finite(
            OP,
            &[("w", w), ("h", h), ("nw", nw), ("ne", ne), ("se", se), ("sw", sw)],
        )?;
        if nw < 0.0 || ne < 0.0 || se < 0.0 || sw < 0.0 {
            return Err(PigmentError::geometry(
                OP,
                format!("corner radii must be >= 0, got {} {} {} {}", nw, ne, se, sw),
            ));
        }
        if nw == 0.0 && ne == 0.0 && se == 0.0 && sw == 0.0 {
            self.rect(x, y, w, h, clockwise);
            return Ok(());
        }

        let (aw, ah) = (w.abs(), h.abs());
        let mut factor: f32 = 1.0;
        for (sum, limit) in [(nw + ne, aw), (sw + se, aw), (nw + sw, ah), (ne + se, ah)] {
            if sum > limit && sum > 0.0 {
                factor = factor.min(limit / sum);
            }
        }
        let (nw, ne, se, sw) = (nw * factor, ne * factor, se * factor, sw * factor);
        let k = 1.0 - KAPPA;
        let (r, b) = (x + w, y + h);

        if clockwise {
            self.move_to(x + nw, y);
            self.line_to(r - ne, y);
            self.bezier_curve_to(r - ne * k, y, r, y + ne * k, r, y + ne);
            self.line_to(r, b - se);
            self.bezier_curve_to(r, b - se * k, r - se * k, b, r - se, b);
            self.line_to(x + sw, b);
            self.bezier_curve_to(x + sw * k, b, x, b - sw * k, x, b - sw);
            self.line_to(x, y + nw);
            self.bezier_curve_to(x, y + nw * k, x + nw * k, y, x + nw, y);
        } else {
            self.move_to(x + nw, y);
            self.bezier_curve_to(x + nw * k, y, x, y + nw * k, x, y + nw);
            self.line_to(x, b - sw);
            self.bezier_curve_to(x, b - sw * k, x + sw * k, b, x + sw, b);
            self.line_to(r - se, b);
            self.bezier_curve_to(r - se * k, b, r, b - se * k, r, b - se);
            self.line_to(r, y + ne);
            self.bezier_curve_to(r, y + ne * k, r - ne * k, y, r - ne, y);
        }
        self.close_path();
        Ok(())
    }

    /// Closed axis-aligned ellipse built from four cubic quarters
    pub fn ellipse(&mut self, cx: f32, cy: f32, rx: f32, ry: f32) -> Result<()> {
        const OP: &str = "ellipse";
        ensure_finite(OP, &[("cx", cx), ("cy", cy), ("rx", rx), ("ry", ry)])?;
        if rx < 0.0 || ry < 0.0 {
            return Err(PigmentError::geometry(
                OP,
                format!("radii must be >= 0, got rx={} ry={}", rx, ry),
            ));
        }
        let (kx, ky) = (rx * KAPPA, ry * KAPPA);
        self.move_to(cx + rx, cy);
        self.bezier_curve_to(cx + rx, cy + ky, cx + kx, cy + ry, cx, cy + ry);
        self.bezier_curve_to(cx - kx, cy + ry, cx - rx, cy + ky, cx - rx, cy);
        self.bezier_curve_to(cx - rx, cy - ky, cx - kx, cy - ry, cx, cy - ry);
        self.bezier_curve_to(cx + kx, cy - ry, cx + rx, cy - ky, cx + rx, cy);
        self.close_path();
        Ok(())
    }

    pub fn circle(&mut self, cx: f32, cy: f32, r: f32) -> Result<()> {
        if r < 0.0 {
            return Err(PigmentError::geometry(
                "circle",
                format!("radius must be >= 0, got {}", r),
            ));
        }
        self.ellipse(cx, cy, r, r)
    }

    /// Regular polygon centered at `(x, y)` with its first vertex straight up
    pub fn polygon(&mut self, x: f32, y: f32, size: f32, sides: u32) -> Result<()> {
        if sides < 3 {
            return Err(PigmentError::geometry(
                "polygon",
                format!("sides must be >= 3, got {}", sides),
            ));
        }
        self.move_to(x, y - size);
        for side in 1..sides {
            let angle = side as f32 * TAU / sides as f32;
            self.line_to(x + size * angle.sin(), y - size * angle.cos());
        }
        self.close_path();
        Ok(())
    }

    /// Close the current subpath back to its start
    pub fn close_path(&mut self) {
        if self.current.is_some() {
            self.commands.push(PathCommand::Close);
            self.current = Some(self.start);
        }
    }

    /// Append every command of `other`
    pub fn add_path(&mut self, other: &Path) {
        self.commands.extend(other.commands.iter().copied());
        if other.current.is_some() {
            self.start = other.start;
            self.current = other.current;
        }
    }

    /// Apply `transform` to every point in place
    pub fn transform(&mut self, transform: &Mat3) {
        let t = |p: &mut Vec2| *p = transform.transform_point(*p);
        for cmd in self.commands.iter_mut() {
            match cmd {
                PathCommand::MoveTo(p) | PathCommand::LineTo(p) => t(p),
                PathCommand::QuadTo { control, end } => {
                    t(control);
                    t(end);
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => {
                    t(control1);
                    t(control2);
                    t(end);
                }
                PathCommand::Close => {}
            }
        }
        self.start = transform.transform_point(self.start);
        self.current = self.current.map(|p| transform.transform_point(p));
    }

    /// Flatten into polyline contours in device space
    pub fn flatten(&self, transform: &Mat3, tolerance: f32) -> Vec<Contour> {
        flatten(&self.commands, transform, tolerance)
    }

    /// Tight bounds of the transformed, flattened path
    pub fn compute_bounds(&self, transform: &Mat3) -> Rect {
        let contours = self.flatten(transform, DEFAULT_TOLERANCE);
        Rect::bounding(contours.iter().flat_map(|c| c.points.iter().copied())).unwrap_or_default()
    }

    /// Sum of the signed areas of the flattened contours
    ///
    /// Positive when the outer contours run clockwise on a y-down canvas.
    pub fn signed_area(&self) -> f32 {
        self.flatten(&Mat3::IDENTITY, DEFAULT_TOLERANCE)
            .iter()
            .map(|c| signed_area(&c.points))
            .sum()
    }

    /// Whether `test` lies inside the filled path
    pub fn fill_overlaps(&self, test: Vec2, transform: &Mat3, winding_rule: WindingRule) -> bool {
        let polygons: Vec<Vec<Vec2>> = self
            .flatten(transform, DEFAULT_TOLERANCE)
            .into_iter()
            .map(|c| c.points)
            .collect();
        winding_rule.is_inside(winding_number(&polygons, test))
    }

    /// Whether `test` lies inside the stroked outline of the path
    pub fn stroke_overlaps(&self, test: Vec2, transform: &Mat3, stroke: &StrokeOptions) -> bool {
        let polygons = self.stroke_polygons(transform, stroke);
        winding_number(&polygons, test) != 0
    }

    /// Stroke outline polygons in device space, all positively oriented
    pub fn stroke_polygons(&self, transform: &Mat3, stroke: &StrokeOptions) -> Vec<Vec<Vec2>> {
        let pixel_scale = transform.pixel_scale();
        if pixel_scale <= 0.0 || !pixel_scale.is_finite() {
            return Vec::new();
        }
        let tolerance = DEFAULT_TOLERANCE / pixel_scale;
        let contours = self.flatten(&Mat3::IDENTITY, tolerance);
        let mut polygons = stroke_contours(&contours, stroke, tolerance);
        if !transform.is_identity() {
            let flips = transform.determinant() < 0.0;
            for polygon in polygons.iter_mut() {
                for p in polygon.iter_mut() {
                    *p = transform.transform_point(*p);
                }
                if flips {
                    polygon.reverse();
                }
            }
        }
        polygons
    }

    fn ensure_subpath(&mut self, x: f32, y: f32) {
        if self.current.is_none() {
            self.move_to(x, y);
        }
    }

    /// Append cubic segments approximating an elliptical arc
    fn push_arc(&mut self, center: Vec2, rx: f32, ry: f32, phi: f32, theta1: f32, delta: f32) {
        let segments = (delta.abs() / (PI / 2.0)).ceil().max(1.0) as usize;
        let step = delta / segments as f32;
        let k = 4.0 / 3.0 * (step / 4.0).tan();
        let (sin_phi, cos_phi) = phi.sin_cos();
        let map = |p: Vec2| {
            let (x, y) = (p.x * rx, p.y * ry);
            center + Vec2::new(cos_phi * x - sin_phi * y, sin_phi * x + cos_phi * y)
        };

        let mut angle = theta1;
        for _ in 0..segments {
            let next = angle + step;
            let (s0, c0) = angle.sin_cos();
            let (s1, c1) = next.sin_cos();
            let control1 = map(Vec2::new(c0 - k * s0, s0 + k * c0));
            let control2 = map(Vec2::new(c1 + k * s1, s1 - k * c1));
            let end = map(Vec2::new(c1, s1));
            self.commands.push(PathCommand::CubicTo {
                control1,
                control2,
                end,
            });
            self.current = Some(end);
            angle = next;
        }
    }
}

/// Signed sweep of a canvas arc
fn arc_sweep(a0: f32, a1: f32, ccw: bool) -> f32 {
    if !ccw {
        let d = a1 - a0;
        if d >= TAU {
            TAU
        } else {
            d.rem_euclid(TAU)
        }
    } else {
        let d = a0 - a1;
        if d >= TAU {
            -TAU
        } else {
            -d.rem_euclid(TAU)
        }
    }
}

fn fmt_number(f: &mut fmt::Formatter<'_>, v: f32) -> fmt::Result {
    if v == v.trunc() && v.abs() < 1e9 {
        write!(f, "{}", v as i64)
    } else {
        write!(f, "{}", v)
    }
}

/// SVG path data; parses back with [`crate::parse_path`]
impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for cmd in self.commands.iter() {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            let (letter, points): (&str, SmallVec<[Vec2; 3]>) = match cmd {
                PathCommand::MoveTo(p) => ("M", SmallVec::from_slice(&[*p])),
                PathCommand::LineTo(p) => ("L", SmallVec::from_slice(&[*p])),
                PathCommand::QuadTo { control, end } => {
                    ("Q", SmallVec::from_slice(&[*control, *end]))
                }
                PathCommand::CubicTo {
                    control1,
                    control2,
                    end,
                } => ("C", SmallVec::from_slice(&[*control1, *control2, *end])),
                PathCommand::Close => ("Z", SmallVec::new()),
            };
            f.write_str(letter)?;
            for p in points {
                f.write_str(" ")?;
                fmt_number(f, p.x)?;
                f.write_str(" ")?;
                fmt_number(f, p.y)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigment_core::ErrorKind;

    fn approx(a: f32, b: f32, eps: f32) -> bool {
        (a - b).abs() <= eps
    }

    #[test]
    fn test_rect_bounds() {
        let mut path = Path::new();
        path.rect(10.0, 20.0, 30.0, 40.0, true);
        assert_eq!(path.compute_bounds(&Mat3::IDENTITY), Rect::new(10.0, 20.0, 30.0, 40.0));
        let moved = path.compute_bounds(&Mat3::translate(5.0, -5.0));
        assert_eq!(moved, Rect::new(15.0, 15.0, 30.0, 40.0));
    }

    #[test]
    fn test_rect_orientation_sign() {
        let mut cw = Path::new();
        cw.rect(0.0, 0.0, 4.0, 2.0, true);
        assert_eq!(cw.signed_area(), 8.0);
        let mut ccw = Path::new();
        ccw.rect(0.0, 0.0, 4.0, 2.0, false);
        assert_eq!(ccw.signed_area(), -8.0);
    }

    #[test]
    fn test_circle_bounds_are_tight() {
        let mut path = Path::new();
        path.circle(50.0, 50.0, 25.0).unwrap();
        let b = path.compute_bounds(&Mat3::IDENTITY);
        assert!(approx(b.x, 25.0, 0.05), "{:?}", b);
        assert!(approx(b.w, 50.0, 0.1), "{:?}", b);
    }

    #[test]
    fn test_negative_radius_is_a_geometry_error() {
        let mut path = Path::new();
        let err = path.arc(0.0, 0.0, -1.0, 0.0, 1.0, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Geometry);
        assert!(path.arc_to(1.0, 1.0, 2.0, 0.0, -3.0).is_err());
        assert!(path
            .elliptical_arc_to(-1.0, 2.0, 0.0, false, true, 4.0, 4.0)
            .is_err());
        assert!(path.is_empty(), "failed calls must not mutate the path");
    }

    #[test]
    fn test_zero_radius_arc_with_sweep_is_degenerate() {
        let mut path = Path::new();
        assert!(path.arc(0.0, 0.0, 0.0, 0.0, 1.0, false).is_err());
        assert!(path.arc(0.0, 0.0, 0.0, 1.0, 1.0, false).is_ok());
    }

    #[test]
    fn test_polygon_requires_three_sides() {
        let mut path = Path::new();
        assert_eq!(
            path.polygon(0.0, 0.0, 10.0, 2).unwrap_err().kind(),
            ErrorKind::Geometry
        );
        path.polygon(0.0, 0.0, 10.0, 4).unwrap();
        let b = path.compute_bounds(&Mat3::IDENTITY);
        assert!(approx(b.y, -10.0, 1e-4) && approx(b.h, 20.0, 1e-4));
    }

    #[test]
    fn test_elliptical_arc_half_circle() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.elliptical_arc_to(10.0, 10.0, 0.0, false, true, 20.0, 0.0)
            .unwrap();
        assert_eq!(path.current_point(), Some(Vec2::new(20.0, 0.0)));
        let b = path.compute_bounds(&Mat3::IDENTITY);
        // sweep=1 runs through increasing angles, over the top in y-down space
        assert!(approx(b.y, -10.0, 0.05), "{:?}", b);
        assert!(approx(b.bottom(), 0.0, 1e-3), "{:?}", b);
    }

    #[test]
    fn test_arc_full_circle_clockwise() {
        let mut path = Path::new();
        path.arc(0.0, 0.0, 10.0, 0.0, TAU, false).unwrap();
        let b = path.compute_bounds(&Mat3::IDENTITY);
        assert!(approx(b.w, 20.0, 0.1) && approx(b.h, 20.0, 0.1), "{:?}", b);
    }

    #[test]
    fn test_arc_to_fillet_touches_both_lines() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.arc_to(10.0, 0.0, 10.0, 10.0, 5.0).unwrap();
        let end = path.current_point().unwrap();
        assert!(approx(end.x, 10.0, 1e-3) && approx(end.y, 5.0, 1e-3), "{:?}", end);
    }

    #[test]
    fn test_rounded_rect_radii_are_scaled_to_fit() {
        let mut path = Path::new();
        path.rounded_rect(0.0, 0.0, 10.0, 10.0, 8.0, 8.0, 8.0, 8.0, true)
            .unwrap();
        let b = path.compute_bounds(&Mat3::IDENTITY);
        assert_eq!(b, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_transform_then_bounds_matches_bounds_under_transform() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.bezier_curve_to(10.0, 30.0, 20.0, -10.0, 30.0, 5.0);
        path.quadratic_curve_to(40.0, 40.0, 5.0, 20.0);
        let m = Mat3::translate(3.0, 4.0) * Mat3::rotate(0.4) * Mat3::scale(2.0, 1.5);
        let a = path.compute_bounds(&m);
        let mut moved = path.clone();
        moved.transform(&m);
        let b = moved.compute_bounds(&Mat3::IDENTITY);
        assert!(approx(a.x, b.x, 0.05) && approx(a.y, b.y, 0.05));
        assert!(approx(a.w, b.w, 0.1) && approx(a.h, b.h, 0.1));
    }

    #[test]
    fn test_display_is_svg_path_data() {
        let mut path = Path::new();
        path.move_to(1.0, 2.0);
        path.line_to(3.5, 4.0);
        path.close_path();
        assert_eq!(path.to_string(), "M 1 2 L 3.5 4 Z");
    }

    #[test]
    fn test_fill_overlaps_with_hole() {
        let mut path = Path::new();
        path.rect(0.0, 0.0, 10.0, 10.0, true);
        path.rect(2.0, 2.0, 6.0, 6.0, false);
        let center = Vec2::new(5.0, 5.0);
        assert!(!path.fill_overlaps(center, &Mat3::IDENTITY, WindingRule::NonZero));
        assert!(path.fill_overlaps(Vec2::new(1.0, 1.0), &Mat3::IDENTITY, WindingRule::NonZero));
    }

    #[test]
    fn test_stroke_overlaps() {
        let mut path = Path::new();
        path.move_to(0.0, 0.0);
        path.line_to(100.0, 0.0);
        let stroke = StrokeOptions {
            width: 4.0,
            ..Default::default()
        };
        assert!(path.stroke_overlaps(Vec2::new(50.0, 1.5), &Mat3::IDENTITY, &stroke));
        assert!(!path.stroke_overlaps(Vec2::new(50.0, 3.0), &Mat3::IDENTITY, &stroke));
        assert!(!path.stroke_overlaps(Vec2::new(-1.0, 0.0), &Mat3::IDENTITY, &stroke));
    }
}
