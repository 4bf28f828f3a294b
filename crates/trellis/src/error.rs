//! Error types for trellis operations.
//!
//! A scan is all-or-nothing: the first unreadable or undecodable file aborts
//! the whole invocation and the error propagates to the caller. Cycles in the
//! assembled graph are deliberately *not* errors — they are a reportable data
//! condition recorded on the graph itself (see [`crate::graph`]).

use std::io;
use thiserror::Error;

/// A specialized Result type for trellis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The error type for trellis operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Joining paths produced no usable result (all segments empty or missing).
    #[error("path error: {0}")]
    Path(String),

    /// `analyze` was invoked before any file path was resolvable.
    #[error("no file path set: provide one at construction or to analyze()")]
    MissingPath,

    /// File bytes did not match the declared encoding.
    #[error("{encoding} decode error: {path}")]
    Decode {
        /// Path of the file that failed to decode.
        path: String,
        /// Encoding the file was declared to use.
        encoding: String,
    },

    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A comment token or file-match pattern failed to compile.
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// JSON parsing or serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid configuration or arguments.
    #[error("configuration error: {0}")]
    Config(String),
}
