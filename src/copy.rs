//! Buffered copy between a reader and a writer.
//!
//! Both copy variants stream through a single fixed-capacity working buffer:
//! read a chunk, write it out in full, repeat. Memory use is O(capacity)
//! regardless of how much data moves, and reads and writes alternate
//! strictly - no chunk is buffered ahead of the one in flight.
//!
//! # Cancel Safety
//!
//! - [`Copy`]: Cancel-safe. Bytes already written to the destination remain
//!   committed; dropping the future loses at most the chunk in flight.
//! - [`CopyLimited`]: Cancel-safe, same commitment rule.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tracing::trace;

use crate::error::{Error, Result};

/// Default working-buffer capacity for copy operations: 4095 bytes.
pub const DEFAULT_COPY_CAPACITY: usize = 4095;

/// Copy all data from `reader` to `writer` until end of stream.
///
/// Uses a working buffer of [`DEFAULT_COPY_CAPACITY`] (4095) bytes. Resolves
/// to the total number of bytes transferred. A read of zero bytes terminates
/// the copy successfully; a write that accepts zero bytes of a non-empty
/// chunk fails with [`WriteZero`](io::ErrorKind::WriteZero).
///
/// # Example
///
/// ```ignore
/// let mut reader: &[u8] = b"PING\r\n";
/// let mut writer = Vec::new();
/// let n = copy(&mut reader, &mut writer).await?;
/// assert_eq!(n, 6);
/// ```
pub fn copy<'a, R, W>(reader: &'a mut R, writer: &'a mut W) -> Copy<'a, R, W>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    copy_with_capacity(reader, writer, DEFAULT_COPY_CAPACITY)
}

/// Copy all data from `reader` to `writer` with an explicit working-buffer
/// capacity.
///
/// The capacity decides the chunking boundaries seen by the destination.
/// Requesting a capacity of zero fails with [`Error::ZeroCapacity`] before
/// any I/O is issued.
pub fn copy_with_capacity<'a, R, W>(
    reader: &'a mut R,
    writer: &'a mut W,
    capacity: usize,
) -> Copy<'a, R, W>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    Copy {
        reader,
        writer,
        buf: vec![0u8; capacity].into_boxed_slice(),
        read_done: false,
        pos: 0,
        cap: 0,
        total: 0,
    }
}

/// Copy at most `max_bytes` from `reader` to `writer`.
///
/// Uses a working buffer of [`DEFAULT_COPY_CAPACITY`] (4095) bytes. The copy
/// ends when `max_bytes` have been transferred or the source reaches end of
/// stream, whichever comes first - early exhaustion is success, not an
/// error. Each read request is clamped to the remaining budget, so the
/// destination never receives more than `max_bytes` bytes.
///
/// Resolves to the total number of bytes transferred.
pub fn copy_limited<'a, R, W>(
    reader: &'a mut R,
    writer: &'a mut W,
    max_bytes: u64,
) -> CopyLimited<'a, R, W>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    copy_limited_with_capacity(reader, writer, max_bytes, DEFAULT_COPY_CAPACITY)
}

/// Copy at most `max_bytes` with an explicit working-buffer capacity.
///
/// Requesting a capacity of zero fails with [`Error::ZeroCapacity`] before
/// any I/O is issued.
pub fn copy_limited_with_capacity<'a, R, W>(
    reader: &'a mut R,
    writer: &'a mut W,
    max_bytes: u64,
    capacity: usize,
) -> CopyLimited<'a, R, W>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    CopyLimited {
        reader,
        writer,
        buf: vec![0u8; capacity].into_boxed_slice(),
        remaining: max_bytes,
        read_done: false,
        pos: 0,
        cap: 0,
        total: 0,
    }
}

/// Future for the [`copy`] function.
pub struct Copy<'a, R: ?Sized, W: ?Sized> {
    reader: &'a mut R,
    writer: &'a mut W,
    buf: Box<[u8]>,
    read_done: bool,
    pos: usize,
    cap: usize,
    total: u64,
}

impl<R, W> Future for Copy<'_, R, W>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    type Output = Result<u64>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.buf.is_empty() {
            return Poll::Ready(Err(Error::ZeroCapacity));
        }

        loop {
            // Drain the chunk in flight before reading again.
            if this.pos < this.cap {
                match Pin::new(&mut *this.writer).poll_write(cx, &this.buf[this.pos..this.cap]) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Err(err)) => return Poll::Ready(Err(err.into())),
                    Poll::Ready(Ok(0)) => {
                        return Poll::Ready(Err(
                            io::Error::from(io::ErrorKind::WriteZero).into()
                        ));
                    }
                    Poll::Ready(Ok(n)) => {
                        this.pos += n;
                        this.total += n as u64;
                        continue;
                    }
                }
            }

            if this.read_done {
                trace!(bytes = this.total, "copy complete");
                return Poll::Ready(Ok(this.total));
            }

            // Fresh ReadBuf each iteration: the filled marker starts at zero,
            // so stale bytes from earlier chunks are never reinterpreted.
            let mut read_buf = ReadBuf::new(&mut this.buf);
            match Pin::new(&mut *this.reader).poll_read(cx, &mut read_buf) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(err)) => return Poll::Ready(Err(err.into())),
                Poll::Ready(Ok(())) => {
                    let n = read_buf.filled().len();
                    if n == 0 {
                        this.read_done = true;
                    } else {
                        this.pos = 0;
                        this.cap = n;
                    }
                }
            }
        }
    }
}

/// Future for the [`copy_limited`] function.
pub struct CopyLimited<'a, R: ?Sized, W: ?Sized> {
    reader: &'a mut R,
    writer: &'a mut W,
    buf: Box<[u8]>,
    remaining: u64,
    read_done: bool,
    pos: usize,
    cap: usize,
    total: u64,
}

impl<R, W> Future for CopyLimited<'_, R, W>
where
    R: AsyncRead + Unpin + ?Sized,
    W: AsyncWrite + Unpin + ?Sized,
{
    type Output = Result<u64>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.buf.is_empty() {
            return Poll::Ready(Err(Error::ZeroCapacity));
        }

        loop {
            if this.pos < this.cap {
                match Pin::new(&mut *this.writer).poll_write(cx, &this.buf[this.pos..this.cap]) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Err(err)) => return Poll::Ready(Err(err.into())),
                    Poll::Ready(Ok(0)) => {
                        return Poll::Ready(Err(
                            io::Error::from(io::ErrorKind::WriteZero).into()
                        ));
                    }
                    Poll::Ready(Ok(n)) => {
                        this.pos += n;
                        this.total += n as u64;
                        continue;
                    }
                }
            }

            if this.read_done || this.remaining == 0 {
                trace!(bytes = this.total, "limited copy complete");
                return Poll::Ready(Ok(this.total));
            }

            // The read request is clamped to the remaining budget so the
            // final chunk cannot push the total past the ceiling.
            let max = std::cmp::min(this.buf.len() as u64, this.remaining) as usize;
            let mut read_buf = ReadBuf::new(&mut this.buf[..max]);
            match Pin::new(&mut *this.reader).poll_read(cx, &mut read_buf) {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(err)) => return Poll::Ready(Err(err.into())),
                Poll::Ready(Ok(())) => {
                    let n = read_buf.filled().len();
                    if n == 0 {
                        this.read_done = true;
                    } else {
                        this.pos = 0;
                        this.cap = n;
                        this.remaining -= n as u64;
                    }
                }
            }
        }
    }
}
