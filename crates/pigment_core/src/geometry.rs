//! Vectors, affine matrices and rectangles

use std::ops::{Add, AddAssign, Div, Mul, MulAssign, Neg, Sub, SubAssign};

/// A 2D point or vector
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn dot(self, other: Vec2) -> f32 {
        self.x * other.x + self.y * other.y
    }

    /// Z component of the 3D cross product
    pub fn cross(self, other: Vec2) -> f32 {
        self.x * other.y - self.y * other.x
    }

    pub fn length(self) -> f32 {
        self.length_squared().sqrt()
    }

    pub fn length_squared(self) -> f32 {
        self.dot(self)
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    /// Unit vector in the same direction, or zero for a zero vector
    pub fn normalize(self) -> Vec2 {
        let len = self.length();
        if len > 0.0 {
            self / len
        } else {
            Vec2::ZERO
        }
    }

    /// Counterclockwise perpendicular
    pub fn perp(self) -> Vec2 {
        Vec2::new(-self.y, self.x)
    }

    /// Angle of the vector in radians, in (-PI, PI]
    pub fn angle(self) -> f32 {
        self.y.atan2(self.x)
    }

    pub fn lerp(self, other: Vec2, t: f32) -> Vec2 {
        self + (other - self) * t
    }

    pub fn min(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.min(other.x), self.y.min(other.y))
    }

    pub fn max(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x.max(other.x), self.y.max(other.y))
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl SubAssign for Vec2 {
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

/// Row-major 3x3 affine transform
///
/// ```text
/// | a b c |
/// | d e f |
/// | g h i |   bottom row is always [0, 0, 1]
/// ```
///
/// A point maps as `x' = a*x + b*y + c`, `y' = d*x + e*y + f`.
/// `A * B` applies `B` first, then `A`.
#[derive(Clone, Copy, Debug, PartialEq)]
#[repr(C)]
pub struct Mat3 {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub e: f32,
    pub f: f32,
    pub g: f32,
    pub h: f32,
    pub i: f32,
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mat3 {
    pub const IDENTITY: Mat3 = Mat3 {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 0.0,
        e: 1.0,
        f: 0.0,
        g: 0.0,
        h: 0.0,
        i: 1.0,
    };

    /// Build from the six affine coefficients
    pub const fn from_affine(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Mat3 {
            a,
            b,
            c,
            d,
            e,
            f,
            g: 0.0,
            h: 0.0,
            i: 1.0,
        }
    }

    pub const fn translate(x: f32, y: f32) -> Self {
        Self::from_affine(1.0, 0.0, x, 0.0, 1.0, y)
    }

    pub const fn scale(sx: f32, sy: f32) -> Self {
        Self::from_affine(sx, 0.0, 0.0, 0.0, sy, 0.0)
    }

    /// Rotation by `angle` radians; positive angles turn +x towards +y
    pub fn rotate(angle: f32) -> Self {
        let (sin, cos) = angle.sin_cos();
        Self::from_affine(cos, -sin, 0.0, sin, cos, 0.0)
    }

    pub fn determinant(&self) -> f32 {
        self.a * self.e - self.b * self.d
    }

    pub fn inverse(&self) -> Option<Mat3> {
        let det = self.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;
        Some(Self::from_affine(
            self.e * inv,
            -self.b * inv,
            (self.b * self.f - self.e * self.c) * inv,
            -self.d * inv,
            self.a * inv,
            (self.d * self.c - self.a * self.f) * inv,
        ))
    }

    pub fn transform_point(&self, p: Vec2) -> Vec2 {
        Vec2::new(
            self.a * p.x + self.b * p.y + self.c,
            self.d * p.x + self.e * p.y + self.f,
        )
    }

    /// Transform ignoring the translation part
    pub fn transform_vector(&self, v: Vec2) -> Vec2 {
        Vec2::new(self.a * v.x + self.b * v.y, self.d * v.x + self.e * v.y)
    }

    pub fn translation(&self) -> Vec2 {
        Vec2::new(self.c, self.f)
    }

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// True when the matrix only translates
    pub fn is_translation(&self) -> bool {
        self.a == 1.0 && self.b == 0.0 && self.d == 0.0 && self.e == 1.0
    }

    /// Largest length a unit vector can reach under this transform's axes
    pub fn pixel_scale(&self) -> f32 {
        let x = Vec2::new(self.a, self.d).length();
        let y = Vec2::new(self.b, self.e).length();
        x.max(y)
    }

    pub fn is_finite(&self) -> bool {
        [self.a, self.b, self.c, self.d, self.e, self.f]
            .iter()
            .all(|v| v.is_finite())
    }
}

impl Mul for Mat3 {
    type Output = Mat3;
    fn mul(self, rhs: Mat3) -> Mat3 {
        Mat3::from_affine(
            self.a * rhs.a + self.b * rhs.d,
            self.a * rhs.b + self.b * rhs.e,
            self.a * rhs.c + self.b * rhs.f + self.c,
            self.d * rhs.a + self.e * rhs.d,
            self.d * rhs.b + self.e * rhs.e,
            self.d * rhs.c + self.e * rhs.f + self.f,
        )
    }
}

impl MulAssign for Mat3 {
    fn mul_assign(&mut self, rhs: Mat3) {
        *self = *self * rhs;
    }
}

impl Mul<Vec2> for Mat3 {
    type Output = Vec2;
    fn mul(self, rhs: Vec2) -> Vec2 {
        self.transform_point(rhs)
    }
}

/// An axis-aligned rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    pub fn from_points(p1: Vec2, p2: Vec2) -> Self {
        let min = p1.min(p2);
        let max = p1.max(p2);
        Self::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }

    /// Tight bounds of a point set, `None` when empty
    pub fn bounding<I: IntoIterator<Item = Vec2>>(points: I) -> Option<Rect> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Rect::from_points(min, max))
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn size(&self) -> Vec2 {
        Vec2::new(self.w, self.h)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.w / 2.0, self.y + self.h / 2.0)
    }

    pub fn is_empty(&self) -> bool {
        self.w <= 0.0 || self.h <= 0.0
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_points(
            self.origin().min(other.origin()),
            Vec2::new(self.right().max(other.right()), self.bottom().max(other.bottom())),
        )
    }

    /// Overlapping area, zero-sized when the rectangles are disjoint
    pub fn intersection(&self, other: &Rect) -> Rect {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let r = self.right().min(other.right());
        let b = self.bottom().min(other.bottom());
        Rect::new(x, y, (r - x).max(0.0), (b - y).max(0.0))
    }

    /// Bounds of this rectangle's four corners under `transform`
    pub fn transformed(&self, transform: &Mat3) -> Rect {
        let corners = [
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.y),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.x, self.bottom()),
        ];
        Rect::bounding(corners.iter().map(|p| transform.transform_point(*p))).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn test_composition_applies_right_operand_first() {
        let m = Mat3::translate(10.0, 0.0) * Mat3::scale(2.0, 2.0);
        assert!(close(m * Vec2::new(1.0, 1.0), Vec2::new(12.0, 2.0)));
    }

    #[test]
    fn test_inverse_round_trips() {
        let m = Mat3::translate(3.0, -7.0) * Mat3::rotate(0.7) * Mat3::scale(2.0, 0.5);
        let inv = m.inverse().expect("invertible");
        let p = Vec2::new(4.5, -1.25);
        assert!(close(inv * (m * p), p));
        assert!(Mat3::scale(0.0, 1.0).inverse().is_none());
    }

    #[test]
    fn test_rect_union_and_intersection() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.union(&b), Rect::new(0.0, 0.0, 15.0, 15.0));
        assert_eq!(a.intersection(&b), Rect::new(5.0, 5.0, 5.0, 5.0));
        assert!(a.intersection(&Rect::new(20.0, 20.0, 1.0, 1.0)).is_empty());
    }

    #[test]
    fn test_pixel_scale() {
        assert_eq!(Mat3::scale(3.0, 2.0).pixel_scale(), 3.0);
        assert!((Mat3::rotate(1.0).pixel_scale() - 1.0).abs() < 1e-6);
    }
}
