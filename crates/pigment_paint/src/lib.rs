//! Pigment paint
//!
//! Resolution-independent geometry and the per-pixel math built on it.
//!
//! # Features
//!
//! - Path building (lines, curves, SVG and canvas arcs, shapes)
//! - SVG path data parsing and serialization
//! - Curve flattening and stroke outlines (caps, joins, dashes)
//! - Antialiased scanline coverage with non-zero and even-odd fills
//! - Premultiplied blend functions for every blend mode
//! - Linear, radial and angular gradient evaluation

pub mod blend;
pub mod flatten;
pub mod gradient;
pub mod path;
pub mod raster;
pub mod stroke;
pub mod svg;

pub use blend::{blend, blend_mask, Premul};
pub use flatten::{Contour, DEFAULT_TOLERANCE};
pub use gradient::{Gradient, GradientShape};
pub use path::{Path, PathCommand};
pub use raster::{rasterize, winding_number, Coverage};
pub use stroke::{angle_to_miter_limit, miter_limit_to_angle, StrokeOptions};
pub use svg::parse_path;
