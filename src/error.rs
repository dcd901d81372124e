//! Error types for the conversion pipeline.
//!
//! [`ConvertError`] covers every failure that aborts the conversion of one
//! asset. Decoding of the binary model format reports a [`FormatError`] which
//! is wrapped into [`ConvertError::DeserializationFailure`] together with the
//! offending path.
//!
//! Out-of-range attribute indices inside a face are *not* errors; they are
//! replaced by defaults in [`crate::dedup`].

use std::path::PathBuf;

use thiserror::Error;

/// The main error type of the converter.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// A mesh, material or texture file does not exist.
    #[error("Asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// The mesh or material text could not be parsed.
    #[error("Failed to parse {}: {message}", path.display())]
    ParseFailure { path: PathBuf, message: String },

    /// The image exists but could not be decoded.
    #[error("Failed to decode image {}: {message}", path.display())]
    ImageDecodeFailure { path: PathBuf, message: String },

    /// A resource manager lookup used a stale or foreign handle.
    #[error("Invalid {0} handle")]
    InvalidHandle(&'static str),

    /// `add_vertex`/`add_index` was called before a pool was pushed.
    #[error("No {0} pool is currently pushed")]
    NoCurrentPool(&'static str),

    /// Writing an output file failed.
    #[error("Failed to write {}: {message}", path.display())]
    SerializationFailure { path: PathBuf, message: String },

    /// A binary model file is corrupt, truncated or of another version.
    #[error("Failed to load {}: {source}", path.display())]
    DeserializationFailure {
        path: PathBuf,
        #[source]
        source: FormatError,
    },

    /// Reading a file failed for a reason other than it being absent.
    #[error("IO error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Maps an I/O error on `path` to [`ConvertError::AssetNotFound`] when the
    /// file is missing and to [`ConvertError::Io`] otherwise.
    pub fn from_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            ConvertError::AssetNotFound(path)
        } else {
            ConvertError::Io { path, source }
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        ConvertError::SerializationFailure {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Structural problems found while decoding a binary model file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("truncated while reading {context}: needed {needed} bytes, {remaining} left")]
    Truncated {
        context: &'static str,
        needed: usize,
        remaining: usize,
    },

    #[error("not a model file (bad magic)")]
    BadMagic,

    #[error("unsupported format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("missing end-of-file marker")]
    MissingTrailer,

    #[error("{0} unexpected bytes after end-of-file marker")]
    TrailingBytes(usize),

    #[error("invalid range: {0}")]
    InvalidRange(String),

    #[error("string is not valid UTF-8")]
    InvalidUtf8,

    #[error("re-encoded model differs from the stored bytes at offset {offset}")]
    RoundTripMismatch { offset: usize },

    #[error("image of {width}x{height} declares {len} bytes")]
    ImageSizeMismatch { width: u32, height: u32, len: usize },
}

/// Alias for `Result<T, ConvertError>`.
pub type Result<T> = std::result::Result<T, ConvertError>;
