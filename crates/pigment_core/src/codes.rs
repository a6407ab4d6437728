//! Closed, integer-coded enums shared across the engine boundary

use crate::error::PigmentError;

macro_rules! coded_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$vmeta:meta])* $variant:ident = $code:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[repr(u8)]
        pub enum $name {
            $( $(#[$vmeta])* $variant = $code ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// Stable integer code
            pub const fn code(self) -> u8 {
                self as u8
            }
        }

        impl TryFrom<u8> for $name {
            type Error = PigmentError;

            fn try_from(code: u8) -> Result<Self, Self::Error> {
                match code {
                    $( $code => Ok($name::$variant), )+
                    _ => Err(PigmentError::invalid(
                        stringify!($name),
                        format!("unknown code {}", code),
                    )),
                }
            }
        }
    };
}

coded_enum! {
    /// Per-pixel compositing function
    pub enum BlendMode {
        #[default]
        Normal = 0,
        Darken = 1,
        Multiply = 2,
        ColorBurn = 3,
        Lighten = 4,
        Screen = 5,
        ColorDodge = 6,
        Overlay = 7,
        SoftLight = 8,
        HardLight = 9,
        Difference = 10,
        Exclusion = 11,
        Hue = 12,
        Saturation = 13,
        Color = 14,
        Luminosity = 15,
        /// Keep the backdrop where the source is covered
        Mask = 16,
        /// Replace the backdrop with the source
        Overwrite = 17,
        /// Remove the backdrop where the source is covered
        SubtractMask = 18,
        /// Keep only where exactly one of source and backdrop is covered
        ExcludeMask = 19,
    }
}

impl BlendMode {
    /// Modes that read the source as coverage rather than color
    pub fn is_mask_mode(self) -> bool {
        matches!(
            self,
            BlendMode::Mask | BlendMode::SubtractMask | BlendMode::ExcludeMask
        )
    }
}

coded_enum! {
    /// Interior test for filled paths
    pub enum WindingRule {
        #[default]
        NonZero = 0,
        EvenOdd = 1,
    }
}

impl WindingRule {
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            WindingRule::NonZero => winding != 0,
            WindingRule::EvenOdd => winding % 2 != 0,
        }
    }
}

coded_enum! {
    /// Geometry at the open ends of a stroke
    pub enum LineCap {
        #[default]
        Butt = 0,
        Round = 1,
        Square = 2,
    }
}

coded_enum! {
    /// Geometry at stroke corners
    pub enum LineJoin {
        #[default]
        Miter = 0,
        Round = 1,
        Bevel = 2,
    }
}

coded_enum! {
    pub enum HorizontalAlignment {
        #[default]
        Left = 0,
        Center = 1,
        Right = 2,
    }
}

coded_enum! {
    pub enum VerticalAlignment {
        #[default]
        Top = 0,
        Middle = 1,
        Bottom = 2,
    }
}

coded_enum! {
    /// Per-character case transform applied before shaping
    pub enum TextCase {
        #[default]
        Normal = 0,
        Upper = 1,
        Lower = 2,
        Title = 3,
    }
}

coded_enum! {
    pub enum PaintKind {
        #[default]
        Solid = 0,
        Image = 1,
        ImageTiled = 2,
        GradientLinear = 3,
        GradientRadial = 4,
        GradientAngular = 5,
    }
}

coded_enum! {
    /// Raster file formats understood at the I/O boundary
    pub enum FileFormat {
        #[default]
        Png = 0,
        Bmp = 1,
        Jpg = 2,
        Gif = 3,
    }
}

impl FileFormat {
    /// Pick a format from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(FileFormat::Png),
            "bmp" => Some(FileFormat::Bmp),
            "jpg" | "jpeg" => Some(FileFormat::Jpg),
            "gif" => Some(FileFormat::Gif),
            _ => None,
        }
    }

    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_blend_mode_codes_are_dense() {
        assert_eq!(BlendMode::ALL.len(), 20);
        for (i, mode) in BlendMode::ALL.iter().enumerate() {
            assert_eq!(mode.code() as usize, i);
            assert_eq!(BlendMode::try_from(i as u8).ok(), Some(*mode));
        }
        let err = BlendMode::try_from(20).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn test_winding_rules() {
        assert!(WindingRule::NonZero.is_inside(2));
        assert!(!WindingRule::EvenOdd.is_inside(2));
        assert!(WindingRule::EvenOdd.is_inside(-1));
    }

    #[test]
    fn test_file_format_from_extension() {
        assert_eq!(FileFormat::from_extension("PNG"), Some(FileFormat::Png));
        assert_eq!(FileFormat::from_extension("jpeg"), Some(FileFormat::Jpg));
        assert_eq!(FileFormat::from_extension("tiff"), None);
    }
}
