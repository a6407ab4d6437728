//! Pigment core
//!
//! Leaf crate shared by every other pigment crate:
//!
//! - **Geometry**: `Vec2`, `Mat3` (row-major affine), `Rect`
//! - **Color**: straight-alpha `Color` for the API, premultiplied
//!   `PremulRgba8` for storage
//! - **Errors**: the `PigmentError` taxonomy and `ErrorKind`
//! - **Codes**: the small closed enums (blend mode, winding rule, ...) with
//!   their stable integer codes

pub mod codes;
pub mod color;
pub mod error;
pub mod geometry;

pub use codes::{
    BlendMode, FileFormat, HorizontalAlignment, LineCap, LineJoin, PaintKind, TextCase,
    VerticalAlignment, WindingRule,
};
pub use color::{Color, ColorStop, PremulRgba8};
pub use error::{ensure_finite, ErrorKind, PigmentError, Result};
pub use geometry::{Mat3, Rect, Vec2};

/// Miter limit used when none is given
pub const DEFAULT_MITER_LIMIT: f32 = 4.0;

/// Font line-height sentinel meaning "derive from the typeface metrics"
pub const AUTO_LINE_HEIGHT: f32 = -1.0;
