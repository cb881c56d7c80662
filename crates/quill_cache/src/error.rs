//! Error types for cache operations.

use std::path::PathBuf;

use quill_core::ProverError;
use quill_serial::SerialError;

/// Errors that can occur during cache operations.
///
/// Reading an existing cache file is fail-safe (a damaged file is treated as
/// absent), so most of these come from writing, from decoding a stored
/// annotation, or from the prover itself.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// An I/O error occurred while reading or writing cache files.
    #[error("cache I/O error at {path}: {source}")]
    Io {
        /// The path that caused the error.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The requested compression is not one of `none`, `gzip` or `xz`.
    #[error("unsupported cache compression: {name}")]
    UnsupportedCompression {
        /// The name that was requested.
        name: String,
    },

    /// Compressed cache data could not be decompressed.
    #[error("corrupt compressed cache file {path}: {reason}")]
    Codec {
        /// The cache file path.
        path: PathBuf,
        /// Description of the codec failure.
        reason: String,
    },

    /// A cache file or record could not be converted to or from JSON.
    #[error("serialization error: {reason}")]
    Serialization {
        /// Description of the serialization failure.
        reason: String,
    },

    /// A stored annotation could not be decoded (or a new one encoded).
    #[error("malformed cached annotation: {0}")]
    Decode(#[from] SerialError),

    /// The prover failed while annotating a cache miss.
    #[error(transparent)]
    Prover(#[from] ProverError),
}
