//! Error taxonomy shared by every pigment crate

use std::path::PathBuf;
use thiserror::Error;

/// Coarse, matchable classification of a [`PigmentError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Geometry,
    Bounds,
    Parse,
    Io,
    StackUnderflow,
    UnsupportedFormat,
    InvalidArgument,
}

/// Engine errors
#[derive(Error, Debug)]
pub enum PigmentError {
    /// Invalid radius, side count or degenerate arc
    #[error("{op}: {message}")]
    Geometry { op: &'static str, message: String },

    /// Size mismatch or a dimension that would drop below 1
    #[error("{op}: {message}")]
    Bounds { op: &'static str, message: String },

    /// Malformed path data
    #[error("invalid path data at offset {offset}: {message} (near {token:?})")]
    Parse {
        offset: usize,
        token: String,
        message: String,
    },

    /// File read/write or decode failure
    #[error("{op} {path:?}: {source}")]
    Io {
        op: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Data could be read but not decoded
    #[error("failed to decode {what}: {message}")]
    Decode { what: &'static str, message: String },

    /// `restore` without a matching `save`
    #[error("restore called with an empty save stack")]
    StackUnderflow,

    /// Encoding or decoding of an unhandled file type
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),

    /// A parameter outside the operation's domain
    #[error("{op}: {message}")]
    InvalidArgument { op: &'static str, message: String },
}

impl PigmentError {
    pub fn geometry(op: &'static str, message: impl Into<String>) -> Self {
        Self::Geometry {
            op,
            message: message.into(),
        }
    }

    pub fn bounds(op: &'static str, message: impl Into<String>) -> Self {
        Self::Bounds {
            op,
            message: message.into(),
        }
    }

    pub fn invalid(op: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            op,
            message: message.into(),
        }
    }

    pub fn parse(offset: usize, token: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            offset,
            token: token.into(),
            message: message.into(),
        }
    }

    pub fn io(op: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            op,
            path: path.into(),
            source,
        }
    }

    pub fn decode(what: &'static str, message: impl Into<String>) -> Self {
        Self::Decode {
            what,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Geometry { .. } => ErrorKind::Geometry,
            Self::Bounds { .. } => ErrorKind::Bounds,
            Self::Parse { .. } => ErrorKind::Parse,
            Self::Io { .. } | Self::Decode { .. } => ErrorKind::Io,
            Self::StackUnderflow => ErrorKind::StackUnderflow,
            Self::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Self::InvalidArgument { .. } => ErrorKind::InvalidArgument,
        }
    }
}

/// Result type for pigment operations
pub type Result<T> = std::result::Result<T, PigmentError>;

/// Reject NaN and infinite inputs with a geometry error naming the parameter
pub fn ensure_finite(op: &'static str, values: &[(&'static str, f32)]) -> Result<()> {
    for (name, value) in values {
        if !value.is_finite() {
            return Err(PigmentError::geometry(
                op,
                format!("{} must be finite, got {}", name, value),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_operation_and_parameter() {
        let err = PigmentError::geometry("arc", "radius must be >= 0, got -2");
        assert_eq!(err.to_string(), "arc: radius must be >= 0, got -2");
        assert_eq!(err.kind(), ErrorKind::Geometry);
    }

    #[test]
    fn test_ensure_finite() {
        assert!(ensure_finite("line_to", &[("x", 1.0), ("y", 2.0)]).is_ok());
        let err = ensure_finite("line_to", &[("x", f32::NAN)]).unwrap_err();
        assert!(err.to_string().contains("x must be finite"));
    }
}
