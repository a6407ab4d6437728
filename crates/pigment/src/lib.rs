//! Pigment
//!
//! A CPU 2D vector graphics engine. This crate re-exports the whole engine
//! and adds the canvas-style [`Context`].
//!
//! # Example
//!
//! ```ignore
//! use pigment::prelude::*;
//!
//! let mut ctx = Context::with_size(200, 200);
//! ctx.set_fill_style(Paint::solid(Color::from_hex(0xff5500)));
//! ctx.circle(100.0, 100.0, 80.0)?;
//! ctx.fill(WindingRule::NonZero)?;
//! ctx.into_image().write_file("circle.png")?;
//! ```

mod context;

pub use context::{Context, TextMetrics};

pub use pigment_core::{
    ensure_finite, BlendMode, Color, ColorStop, ErrorKind, FileFormat, HorizontalAlignment,
    LineCap, LineJoin, Mat3, PaintKind, PigmentError, PremulRgba8, Rect, Result, TextCase, Vec2,
    VerticalAlignment, WindingRule, AUTO_LINE_HEIGHT, DEFAULT_MITER_LIMIT,
};
pub use pigment_image::{decode_image, decode_mask, read_image, read_mask, Image, Mask, Paint};
pub use pigment_paint::{
    angle_to_miter_limit, miter_limit_to_angle, parse_path, Contour, Path, PathCommand,
    StrokeOptions,
};
pub use pigment_text::{
    read_font, read_typeface, typeset, Arrangement, Font, Span, TextTarget, Typeface,
    TypesetOptions,
};

/// Everything needed for everyday drawing
pub mod prelude {
    pub use crate::{
        BlendMode, Color, ColorStop, Context, Font, Image, Mask, Mat3, Paint, Path, Rect,
        StrokeOptions, TextTarget, Vec2, WindingRule,
    };
}
