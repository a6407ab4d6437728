//! Text for Pigment
//!
//! This crate provides:
//! - Typeface loading (TTF/OTF via ttf-parser, SVG fonts via roxmltree)
//! - Sized, styled fonts with paints and decorations
//! - Multi-span layout (case transforms, kerning, wrapping, alignment)
//! - Filling and stroking laid-out text into images and masks

mod draw;
mod font;
mod typeface;
mod typeset;

pub use draw::TextTarget;
pub use font::{read_font, Font};
pub use typeface::{read_typeface, Glyphs, LineMetrics, Typeface};
pub use typeset::{typeset, Arrangement, Span, TypesetOptions};
