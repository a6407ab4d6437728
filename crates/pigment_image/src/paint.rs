//! Fill and stroke sources

use std::sync::Arc;

use pigment_core::{BlendMode, Color, ColorStop, Mat3, PaintKind, PigmentError, Result, Vec2};
use pigment_paint::{Gradient, GradientShape, Premul};
use tracing::warn;

use crate::image::Image;
use crate::sample::sample_bilinear;

/// What a fill or stroke is colored with
///
/// Image placement and gradient handles are in target pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    pub kind: PaintKind,
    pub blend_mode: BlendMode,
    /// Multiplies the final source color, 0.0 to 1.0
    pub opacity: f32,
    pub color: Color,
    /// Shared with every other paint built from the same image
    pub image: Option<Arc<Image>>,
    pub image_mat: Mat3,
    pub gradient_handle_positions: Vec<Vec2>,
    pub gradient_stops: Vec<ColorStop>,
}

impl Default for Paint {
    fn default() -> Self {
        Self::new(PaintKind::Solid)
    }
}

impl Paint {
    /// Opaque black paint of the given kind
    pub fn new(kind: PaintKind) -> Self {
        Self {
            kind,
            blend_mode: BlendMode::Normal,
            opacity: 1.0,
            color: Color::BLACK,
            image: None,
            image_mat: Mat3::IDENTITY,
            gradient_handle_positions: Vec::new(),
            gradient_stops: Vec::new(),
        }
    }

    pub fn solid(color: Color) -> Self {
        Self {
            color,
            ..Self::new(PaintKind::Solid)
        }
    }

    pub fn image(image: Arc<Image>, image_mat: Mat3, tiled: bool) -> Self {
        let kind = if tiled {
            PaintKind::ImageTiled
        } else {
            PaintKind::Image
        };
        Self {
            image: Some(image),
            image_mat,
            ..Self::new(kind)
        }
    }

    pub fn linear_gradient(start: Vec2, end: Vec2, stops: Vec<ColorStop>) -> Self {
        Self::gradient(PaintKind::GradientLinear, vec![start, end], stops)
    }

    /// `edge` is any point on the t = 1 circle
    pub fn radial_gradient(center: Vec2, edge: Vec2, stops: Vec<ColorStop>) -> Self {
        Self::gradient(PaintKind::GradientRadial, vec![center, edge], stops)
    }

    /// Sweep around `center`, starting in the direction of `start`
    pub fn angular_gradient(center: Vec2, start: Vec2, stops: Vec<ColorStop>) -> Self {
        Self::gradient(PaintKind::GradientAngular, vec![center, start], stops)
    }

    fn gradient(kind: PaintKind, handles: Vec<Vec2>, stops: Vec<ColorStop>) -> Self {
        Self {
            gradient_handle_positions: handles,
            gradient_stops: stops,
            ..Self::new(kind)
        }
    }

    /// Independent copy; the referenced image stays shared
    pub fn copy(&self) -> Self {
        self.clone()
    }

    /// Paints that draw nothing can be skipped entirely
    pub fn is_invisible(&self) -> bool {
        if self.opacity <= 0.0 {
            return true;
        }
        match self.kind {
            PaintKind::Solid => self.color.a <= 0.0 && !self.blend_mode.is_mask_mode(),
            _ => false,
        }
    }
}

/// A paint compiled for per-pixel evaluation
pub(crate) enum Shader<'a> {
    Solid(Premul),
    Image {
        image: &'a Image,
        inverse: Mat3,
        tiled: bool,
    },
    Gradient(Gradient),
}

impl<'a> Shader<'a> {
    pub(crate) fn new(paint: &'a Paint) -> Result<Self> {
        match paint.kind {
            PaintKind::Solid => Ok(Shader::Solid(paint.color.premultiplied())),
            PaintKind::Image | PaintKind::ImageTiled => {
                let image = paint.image.as_deref().ok_or_else(|| {
                    PigmentError::invalid("paint", "image paint has no image")
                })?;
                let inverse = paint.image_mat.inverse().ok_or_else(|| {
                    PigmentError::invalid("paint", "image matrix is not invertible")
                })?;
                Ok(Shader::Image {
                    image,
                    inverse,
                    tiled: paint.kind == PaintKind::ImageTiled,
                })
            }
            PaintKind::GradientLinear | PaintKind::GradientRadial | PaintKind::GradientAngular => {
                let shape = match paint.kind {
                    PaintKind::GradientLinear => GradientShape::Linear,
                    PaintKind::GradientRadial => GradientShape::Radial,
                    _ => GradientShape::Angular,
                };
                let stops = &paint.gradient_stops;
                if stops.iter().any(|s| !(0.0..=1.0).contains(&s.position)) {
                    warn!("gradient stop positions outside [0, 1] are clamped by evaluation");
                }
                Ok(Shader::Gradient(Gradient::new(
                    shape,
                    &paint.gradient_handle_positions,
                    stops,
                )?))
            }
        }
    }

    /// Premultiplied source color at the center of target pixel `(x, y)`
    pub(crate) fn shade(&self, x: u32, y: u32) -> Premul {
        let center = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
        match self {
            Shader::Solid(color) => *color,
            Shader::Image {
                image,
                inverse,
                tiled,
            } => sample_bilinear(*image, inverse.transform_point(center), *tiled),
            Shader::Gradient(gradient) => gradient.color_at(center),
        }
    }

    pub(crate) fn is_solid(&self) -> Option<Premul> {
        match self {
            Shader::Solid(color) => Some(*color),
            _ => None,
        }
    }
}
