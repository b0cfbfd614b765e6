//! Error types shared across the text engine.

use std::fmt;
use std::io;

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Classification of an I/O failure from the file loader (`§6`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoErrorKind {
    NotFound,
    Permission,
    Other,
}

impl From<io::ErrorKind> for IoErrorKind {
    fn from(kind: io::ErrorKind) -> Self {
        match kind {
            io::ErrorKind::NotFound => Self::NotFound,
            io::ErrorKind::PermissionDenied => Self::Permission,
            _ => Self::Other,
        }
    }
}

/// Error type for engine operations.
#[derive(Debug)]
pub enum Error {
    /// Allocator refused growth (pool pages, rope nodes, temporary buffers).
    /// Partial state on the failing path has already been rolled back.
    OutOfMemory,
    /// A pool ID's class is out of range, or the slot is free.
    InvalidId,
    /// The slot is live but belongs to a later allocation than the ID carries.
    WrongGeneration,
    /// A rope index fell outside the valid range for the operation.
    InvalidIndex { index: usize, len: usize },
    /// An external file operation failed.
    IoError { kind: IoErrorKind, source: io::Error },
    /// Text handed to the scanner was not well-formed UTF-8.
    InvalidUtf8 { offset: usize },
    /// Invalid color format (e.g., malformed hex string).
    InvalidColor(String),
    /// Buffer dimension error (e.g., zero width/height).
    InvalidDimensions { width: u32, height: u32 },
    /// A scissor-rect pop was not paired with a preceding push.
    UnbalancedScissorPop,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfMemory => write!(f, "allocator refused growth"),
            Self::InvalidId => write!(f, "grapheme ID is out of range or freed"),
            Self::WrongGeneration => write!(f, "grapheme ID refers to a stale generation"),
            Self::InvalidIndex { index, len } => {
                write!(f, "index {index} out of range for length {len}")
            }
            Self::IoError { kind, source } => write!(f, "I/O error ({kind:?}): {source}"),
            Self::InvalidUtf8 { offset } => {
                write!(f, "invalid UTF-8 at byte offset {offset}")
            }
            Self::InvalidColor(s) => write!(f, "invalid color format: {s}"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {width}x{height}")
            }
            Self::UnbalancedScissorPop => {
                write!(f, "scissor-rect pop without a matching push")
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::IoError { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::IoError {
            kind: e.kind().into(),
            source: e,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidColor("not-a-color".to_string());
        assert!(err.to_string().contains("invalid color format"));

        let err = Error::InvalidDimensions {
            width: 0,
            height: 100,
        };
        assert!(err.to_string().contains("0x100"));

        let err = Error::InvalidIndex { index: 10, len: 5 };
        assert!(err.to_string().contains("10"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::IoError {
                kind: IoErrorKind::NotFound,
                ..
            }
        ));
    }

    #[test]
    fn test_permission_kind_mapping() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::IoError {
                kind: IoErrorKind::Permission,
                ..
            }
        ));
    }
}
