//! Pigment Image
//!
//! Raster buffers and everything that writes into them.
//!
//! # Features
//!
//! - `Image` (premultiplied RGBA) and `Mask` (8-bit coverage) buffers
//! - Solid, image, tiled-image and gradient `Paint`s
//! - Compositing with all twenty blend modes
//! - Path fills and strokes
//! - Blur, spread, shadow, resize and power-of-two resampling
//! - PNG, BMP, JPEG and GIF encoding and decoding
//!
//! # Example
//!
//! ```ignore
//! use pigment_image::{Image, Paint};
//!
//! let mut image = Image::new(200, 200);
//! image.fill_path(&path, &Paint::solid(Color::RED), &Mat3::IDENTITY, WindingRule::NonZero)?;
//! image.write_file("out.png")?;
//! ```

mod draw;
mod filters;
mod image;
mod io;
mod mask;
mod paint;
mod sample;

pub use crate::image::Image;
pub use io::{decode_image, decode_mask, read_image, read_mask};
pub use mask::Mask;
pub use paint::Paint;
