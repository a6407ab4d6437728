//! Encoding and decoding through the `image` crate

use std::io::Cursor;
use std::path::Path;

use image::{DynamicImage, GrayImage, ImageFormat, RgbaImage};
use pigment_core::{FileFormat, PigmentError, PremulRgba8, Result};
use tracing::debug;

use crate::image::Image;
use crate::mask::Mask;

fn image_format(format: FileFormat) -> ImageFormat {
    match format {
        FileFormat::Png => ImageFormat::Png,
        FileFormat::Bmp => ImageFormat::Bmp,
        FileFormat::Jpg => ImageFormat::Jpeg,
        FileFormat::Gif => ImageFormat::Gif,
    }
}

fn map_codec_error(what: &'static str, err: image::ImageError) -> PigmentError {
    match err {
        image::ImageError::Unsupported(e) => PigmentError::UnsupportedFormat(e.to_string()),
        image::ImageError::IoError(e) => PigmentError::io(what, "<memory>", e),
        other => PigmentError::decode(what, other.to_string()),
    }
}

fn format_for_path(path: &Path) -> Result<FileFormat> {
    FileFormat::from_path(path).ok_or_else(|| {
        PigmentError::UnsupportedFormat(format!(
            "cannot pick an encoder for {:?}; use .png, .bmp, .jpg or .gif",
            path
        ))
    })
}

fn encode_dynamic(image: DynamicImage, format: FileFormat) -> Result<Vec<u8>> {
    // JPEG has no alpha channel
    let image = match format {
        FileFormat::Jpg => DynamicImage::ImageRgb8(image.to_rgb8()),
        FileFormat::Gif => DynamicImage::ImageRgba8(image.to_rgba8()),
        _ => image,
    };
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, image_format(format))
        .map_err(|e| map_codec_error("encode", e))?;
    Ok(out.into_inner())
}

fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    std::fs::write(path, bytes).map_err(|e| PigmentError::io("write", path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "wrote file");
    Ok(())
}

/// Decode PNG, BMP, JPEG or GIF data
pub fn decode_image(bytes: &[u8]) -> Result<Image> {
    let decoded = image::load_from_memory(bytes).map_err(|e| map_codec_error("decode", e))?;
    let rgba = decoded.to_rgba8();
    let (width, height) = rgba.dimensions();
    let pixels = rgba
        .pixels()
        .map(|p| PremulRgba8::from_straight(p[0], p[1], p[2], p[3]))
        .collect();
    Image::from_pixels(width, height, pixels)
}

/// Decode raster data into a mask
///
/// Data with an alpha channel keeps the alpha. Grayscale or RGB data, such
/// as a mask written by [`Mask::write_file`], uses its luminance.
pub fn decode_mask(bytes: &[u8]) -> Result<Mask> {
    let decoded = image::load_from_memory(bytes).map_err(|e| map_codec_error("decode", e))?;
    let (width, height) = (decoded.width(), decoded.height());
    let values = if decoded.color().has_alpha() {
        decoded.to_rgba8().pixels().map(|p| p[3]).collect()
    } else {
        decoded.to_luma8().into_raw()
    };
    Mask::from_data(width, height, values)
}

fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    let bytes = std::fs::read(path).map_err(|e| PigmentError::io("read", path, e))?;
    debug!(path = %path.display(), bytes = bytes.len(), "decoding file");
    Ok(bytes)
}

pub fn read_image(path: impl AsRef<Path>) -> Result<Image> {
    decode_image(&read_bytes(path.as_ref())?)
}

pub fn read_mask(path: impl AsRef<Path>) -> Result<Mask> {
    decode_mask(&read_bytes(path.as_ref())?)
}

impl Image {
    /// Encode as straight-alpha RGBA (RGB for JPEG)
    pub fn encode(&self, format: FileFormat) -> Result<Vec<u8>> {
        let straight: Vec<u8> = self.data().iter().flat_map(|p| p.to_straight()).collect();
        let buffer = RgbaImage::from_raw(self.width(), self.height(), straight)
            .ok_or_else(|| PigmentError::bounds("encode", "pixel buffer does not match size"))?;
        encode_dynamic(DynamicImage::ImageRgba8(buffer), format)
    }

    /// Encode in the format named by the file extension and write
    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.encode(format_for_path(path)?)?;
        write_bytes(path, &bytes)
    }
}

impl Mask {
    /// Encode as 8-bit grayscale
    pub fn encode(&self, format: FileFormat) -> Result<Vec<u8>> {
        let buffer = GrayImage::from_raw(self.width(), self.height(), self.data().to_vec())
            .ok_or_else(|| PigmentError::bounds("encode", "mask buffer does not match size"))?;
        encode_dynamic(DynamicImage::ImageLuma8(buffer), format)
    }

    pub fn write_file(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes = self.encode(format_for_path(path)?)?;
        write_bytes(path, &bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pigment_core::{Color, ErrorKind};

    #[test]
    fn test_png_bytes_round_trip() {
        let mut image = Image::new(3, 2);
        image.set_color(0, 0, Color::new(0.2, 0.4, 0.6, 0.5));
        image.set_color(2, 1, Color::RED);
        let bytes = image.encode(FileFormat::Png).unwrap();
        assert_eq!(decode_image(&bytes).unwrap(), image);
    }

    #[test]
    fn test_garbage_does_not_decode() {
        let err = decode_image(b"definitely not an image").unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::Io | ErrorKind::UnsupportedFormat));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let err = Image::new(1, 1).write_file("out.tiff").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnsupportedFormat);
    }

    #[test]
    fn test_jpeg_encodes_without_alpha() {
        let mut image = Image::new(4, 4);
        image.fill(Color::WHITE);
        let bytes = image.encode(FileFormat::Jpg).unwrap();
        let back = decode_image(&bytes).unwrap();
        assert_eq!(back.wh(), (4, 4));
        assert!(back.is_opaque());
    }

    #[test]
    fn test_mask_bytes_keep_values() {
        let mut mask = Mask::new(4, 4);
        mask.data_mut()[5] = 200;
        mask.data_mut()[10] = 17;
        let bytes = mask.encode(FileFormat::Png).unwrap();
        assert_eq!(decode_mask(&bytes).unwrap(), mask);
    }

    #[test]
    fn test_mask_from_image_data_uses_alpha() {
        let mut image = Image::new(2, 1);
        image.set_pixel(1, 0, PremulRgba8::new(0, 0, 0, 90));
        let bytes = image.encode(FileFormat::Png).unwrap();
        assert_eq!(decode_mask(&bytes).unwrap().data(), &[0, 90]);
    }
}
