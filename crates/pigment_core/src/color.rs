//! Color types and utilities

use bytemuck::{Pod, Zeroable};

/// Straight-alpha RGBA color with f32 components (0.0 to 1.0)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const GREEN: Color = Color::new(0.0, 1.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Create from u8 components (0-255)
    pub fn from_rgba8(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
            a: a as f32 / 255.0,
        }
    }

    /// Create from hex value (0xRRGGBB or 0xRRGGBBAA)
    pub fn from_hex(hex: u32) -> Self {
        if hex > 0xFFFFFF {
            Self::from_rgba8(
                ((hex >> 24) & 0xFF) as u8,
                ((hex >> 16) & 0xFF) as u8,
                ((hex >> 8) & 0xFF) as u8,
                (hex & 0xFF) as u8,
            )
        } else {
            Self::from_rgba8(
                ((hex >> 16) & 0xFF) as u8,
                ((hex >> 8) & 0xFF) as u8,
                (hex & 0xFF) as u8,
                255,
            )
        }
    }

    /// Parse `#rgb`, `#rrggbb` or `#rrggbbaa` (leading `#` optional)
    pub fn parse_hex(text: &str) -> Option<Self> {
        let digits = text.strip_prefix('#').unwrap_or(text);
        let value = u32::from_str_radix(digits, 16).ok()?;
        match digits.len() {
            3 => {
                let expand = |v: u32| ((v & 0xF) * 17) as u8;
                Some(Self::from_rgba8(
                    expand(value >> 8),
                    expand(value >> 4),
                    expand(value),
                    255,
                ))
            }
            6 => Some(Self::from_hex(value & 0xFFFFFF)),
            8 => Some(Self::from_rgba8(
                (value >> 24) as u8,
                (value >> 16) as u8,
                (value >> 8) as u8,
                value as u8,
            )),
            _ => None,
        }
    }

    /// Create a grayscale color
    pub fn gray(value: f32) -> Self {
        Self::rgb(value, value, value)
    }

    /// Set alpha and return new color
    pub fn with_alpha(self, alpha: f32) -> Self {
        Self { a: alpha, ..self }
    }

    /// Linear interpolation in straight space
    pub fn mix(self, other: Color, t: f32) -> Self {
        Self {
            r: self.r + (other.r - self.r) * t,
            g: self.g + (other.g - self.g) * t,
            b: self.b + (other.b - self.b) * t,
            a: self.a + (other.a - self.a) * t,
        }
    }

    pub fn clamped(self) -> Self {
        Self {
            r: self.r.clamp(0.0, 1.0),
            g: self.g.clamp(0.0, 1.0),
            b: self.b.clamp(0.0, 1.0),
            a: self.a.clamp(0.0, 1.0),
        }
    }

    /// Convert to u8 array [r, g, b, a]
    pub fn to_rgba8(&self) -> [u8; 4] {
        let c = self.clamped();
        [
            (c.r * 255.0).round() as u8,
            (c.g * 255.0).round() as u8,
            (c.b * 255.0).round() as u8,
            (c.a * 255.0).round() as u8,
        ]
    }

    /// Premultiplied f32 components
    pub fn premultiplied(&self) -> [f32; 4] {
        let c = self.clamped();
        [c.r * c.a, c.g * c.a, c.b * c.a, c.a]
    }

    /// Inverse of [`Color::premultiplied`]
    pub fn from_premultiplied(p: [f32; 4]) -> Self {
        let a = p[3].clamp(0.0, 1.0);
        if a <= 0.0 {
            return Color::TRANSPARENT;
        }
        Color::new(p[0] / a, p[1] / a, p[2] / a, a).clamped()
    }
}

/// Premultiplied 8-bit RGBA, the storage format of images
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Pod, Zeroable)]
#[repr(C)]
pub struct PremulRgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl PremulRgba8 {
    pub const TRANSPARENT: PremulRgba8 = PremulRgba8::new(0, 0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Premultiply straight 8-bit components
    pub fn from_straight(r: u8, g: u8, b: u8, a: u8) -> Self {
        let mul = |c: u8| ((c as u32 * a as u32 + 127) / 255) as u8;
        Self::new(mul(r), mul(g), mul(b), a)
    }

    /// Straight 8-bit components; exact inverse of [`PremulRgba8::from_straight`]
    /// for every value it produces
    pub fn to_straight(self) -> [u8; 4] {
        if self.a == 0 {
            return [0, 0, 0, 0];
        }
        let a = self.a as u32;
        let div = |c: u8| ((c as u32 * 255 + a / 2) / a).min(255) as u8;
        [div(self.r), div(self.g), div(self.b), self.a]
    }

    pub fn from_color(color: Color) -> Self {
        Self::from_f32(color.premultiplied())
    }

    pub fn to_color(self) -> Color {
        Color::from_premultiplied(self.to_f32())
    }

    /// Premultiplied components scaled to 0.0..=1.0
    pub fn to_f32(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Quantize premultiplied components, keeping every channel <= alpha
    pub fn from_f32(p: [f32; 4]) -> Self {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        let a = q(p[3]);
        Self::new(q(p[0]).min(a), q(p[1]).min(a), q(p[2]).min(a), a)
    }
}

/// A gradient color stop
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[repr(C)]
pub struct ColorStop {
    pub color: Color,
    /// 0.0 to 1.0
    pub position: f32,
}

impl ColorStop {
    pub const fn new(color: Color, position: f32) -> Self {
        Self { color, position }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_premultiply_round_trip_is_exact() {
        for a in 0..=255u8 {
            for c in (0..=255u8).step_by(3) {
                let p = PremulRgba8::from_straight(c, c, c, a);
                let [r, _, _, alpha] = p.to_straight();
                let back = PremulRgba8::from_straight(r, r, r, alpha);
                assert_eq!(p, back, "straight {} alpha {}", c, a);
            }
        }
    }

    #[test]
    fn test_parse_hex() {
        assert_eq!(Color::parse_hex("#ff0000"), Some(Color::RED));
        assert_eq!(Color::parse_hex("fff"), Some(Color::WHITE));
        assert_eq!(Color::parse_hex("#00000000"), Some(Color::TRANSPARENT));
        assert_eq!(Color::parse_hex("#12345"), None);
    }

    #[test]
    fn test_from_f32_keeps_premultiplied_invariant() {
        let p = PremulRgba8::from_f32([0.9, 0.2, 0.1, 0.5]);
        assert!(p.r <= p.a && p.g <= p.a && p.b <= p.a);
    }
}
