//! Error types for easycv.

use std::path::PathBuf;
use thiserror::Error;

/// Result alias for easycv operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when calling into the wrapper.
///
/// Failures come in two families: argument validation performed by this
/// crate before touching OpenCV, and errors surfaced by OpenCV itself,
/// which are propagated unchanged.
#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied argument is out of range or inconsistent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A friendly name does not map to any known option.
    #[error("unsupported {what}: '{value}'")]
    Unsupported { what: &'static str, value: String },
    /// A file could not be read or decoded as an image.
    #[error("could not read image at '{}'", path.display())]
    ImageRead { path: PathBuf },
    /// A camera index or media file could not be opened.
    #[error("could not open source: {0}")]
    SourceOpen(String),
    /// A required model or cascade file is missing.
    #[error("model file not found: '{}'", path.display())]
    ModelNotFound { path: PathBuf },
    /// Error propagated from the OpenCV bindings.
    #[error(transparent)]
    OpenCv(#[from] opencv::Error),
    /// Filesystem error outside of OpenCV's own I/O.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for an [`Error::InvalidArgument`] with a formatted message.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Error::InvalidArgument(msg.into())
    }

    /// Returns true when the error comes from argument validation rather
    /// than from OpenCV or the filesystem.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Error::InvalidArgument(_) | Error::Unsupported { .. }
        )
    }
}
