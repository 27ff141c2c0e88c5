//! Error types for stream operations.
//!
//! Failures are explicit and typed. Nothing is retried and nothing is
//! swallowed: every error surfaces through the future's output, and bytes
//! already written to a destination stay written.

use std::fmt;
use std::io;

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T = (), E = Error> = std::result::Result<T, E>;

/// An error from a stream operation.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The underlying read or write failed.
    ///
    /// Propagated unchanged from the stream. Bytes already transferred to
    /// the destination remain transferred.
    #[error("stream I/O failed")]
    Io(#[from] io::Error),

    /// A working buffer of zero capacity was requested.
    ///
    /// Detected before any I/O is issued. A zero-capacity buffer would make
    /// every read return zero bytes, which is indistinguishable from end of
    /// stream.
    #[error("working buffer capacity must be non-zero")]
    ZeroCapacity,

    /// Rendering format arguments into text failed.
    ///
    /// Fatal to the formatted write that produced it only.
    #[error("message formatting failed")]
    Format(#[from] fmt::Error),
}
