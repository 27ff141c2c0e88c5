//! Asynchronous stream-manipulation primitives.
//!
//! This crate is a small toolkit for moving bytes between async streams:
//! one-shot chunk reads decoded to text, full drains into memory, encoded
//! text and raw byte writes, and buffered copy - unbounded or capped at an
//! exact byte ceiling. Everything is generic over [`tokio::io::AsyncRead`]
//! and [`tokio::io::AsyncWrite`], so any socket, pipe, file, or in-memory
//! buffer works as a source or destination.
//!
//! Each operation owns a single fixed-capacity working buffer for the
//! duration of the call and alternates strictly between reading and
//! writing; memory use stays O(capacity) no matter how much data moves.
//! The working-buffer defaults (4080 bytes for chunk reads, 4095 bytes for
//! copies) decide the chunking boundaries the destination observes and can
//! be overridden per call.
//!
//! ```
//! use siphon::{copy, ChunkRead, ChunkWrite};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> siphon::Result {
//! let mut source: &[u8] = b"PING\r\n";
//! let mut sink = Vec::new();
//! let copied = copy(&mut source, &mut sink).await?;
//! assert_eq!(copied, 6);
//!
//! let mut incoming: &[u8] = &sink;
//! let command = incoming.read_chunk().await?;
//! assert_eq!(command, "PING\r\n");
//!
//! let mut reply = Vec::new();
//! reply.write_line("PONG").await?;
//! assert_eq!(reply, b"PONG\r\n");
//! # Ok(())
//! # }
//! ```
//!
//! # Concurrency
//!
//! No state is shared across calls: concurrent operations on independent
//! stream pairs are safe. Concurrent calls against the *same* stream handle
//! must be serialized by the caller; this crate performs no locking.
//!
//! # Cancel Safety
//!
//! - [`copy`] / [`copy_limited`]: cancel-safe; bytes already written to the
//!   destination remain committed.
//! - [`ChunkRead::read_chunk`]: cancel-safe; nothing is consumed until the
//!   single read completes.
//! - [`ChunkRead::drain_to_vec`] and the write helpers: not cancel-safe;
//!   dropping one mid-flight loses collected bytes or leaves a partial
//!   prefix written.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::cast_possible_truncation)]

mod copy;
mod encoding;
mod error;
mod read;
#[cfg(test)]
mod test_utils;
mod write;

pub use copy::{
    copy, copy_limited, copy_limited_with_capacity, copy_with_capacity, Copy, CopyLimited,
    DEFAULT_COPY_CAPACITY,
};
pub use encoding::{Latin1, TextEncoding, Utf8};
pub use error::{Error, Result};
pub use read::{ChunkRead, DrainToVec, ReadChunk, DEFAULT_CHUNK_CAPACITY};
pub use write::{ChunkWrite, WriteBytes, WriteEncoded, WriteFormatted};
