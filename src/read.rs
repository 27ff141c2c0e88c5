//! Read-side extension methods: one-shot chunk reads and full drains.
//!
//! # Cancel Safety
//!
//! - [`ReadChunk`]: Cancel-safe. No bytes are consumed until the single read
//!   completes; dropping the future before that consumes nothing.
//! - [`DrainToVec`]: Not cancel-safe. Bytes collected so far are lost when
//!   the future is dropped.

use std::future::Future;
use std::io;
use std::mem;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tracing::trace;

use crate::copy::DEFAULT_COPY_CAPACITY;
use crate::encoding::{TextEncoding, Utf8};
use crate::error::{Error, Result};

/// Default buffer capacity for one-shot chunk reads: 4080 bytes.
pub const DEFAULT_CHUNK_CAPACITY: usize = 4080;

/// Read-side extension methods for any [`AsyncRead`] stream.
pub trait ChunkRead: AsyncRead {
    /// Performs exactly one read of up to [`DEFAULT_CHUNK_CAPACITY`] (4080)
    /// bytes and decodes it as UTF-8.
    ///
    /// Resolves to an empty string when the read yields zero bytes - end of
    /// stream and no-data-available are not distinguished. The buffer is not
    /// refilled: whatever the single read returns is the chunk.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let banner = stream.read_chunk().await?;
    /// if banner.starts_with("220") { /* ... */ }
    /// ```
    fn read_chunk(&mut self) -> ReadChunk<'_, Self, Utf8>
    where
        Self: Unpin,
    {
        self.read_chunk_with(DEFAULT_CHUNK_CAPACITY, Utf8)
    }

    /// One-shot chunk read with an explicit buffer capacity and encoding.
    ///
    /// Requesting a capacity of zero fails with [`Error::ZeroCapacity`]
    /// before any I/O is issued.
    fn read_chunk_with<E>(&mut self, capacity: usize, encoding: E) -> ReadChunk<'_, Self, E>
    where
        Self: Unpin,
        E: TextEncoding,
    {
        ReadChunk {
            reader: self,
            buf: vec![0u8; capacity].into_boxed_slice(),
            encoding,
        }
    }

    /// Drains this stream to exhaustion into a freshly allocated buffer.
    ///
    /// Runs the buffered-copy loop with the accumulator as destination,
    /// so the consumed bytes land in memory exactly as a copy would have
    /// delivered them. Resolves to the accumulated bytes.
    fn drain_to_vec(&mut self) -> DrainToVec<'_, Self>
    where
        Self: Unpin,
    {
        DrainToVec {
            reader: self,
            out: Vec::new(),
            buf: vec![0u8; DEFAULT_COPY_CAPACITY].into_boxed_slice(),
            read_done: false,
            pos: 0,
            cap: 0,
        }
    }
}

impl<R: AsyncRead + ?Sized> ChunkRead for R {}

/// Future for [`read_chunk`](ChunkRead::read_chunk).
pub struct ReadChunk<'a, R: ?Sized, E> {
    reader: &'a mut R,
    buf: Box<[u8]>,
    encoding: E,
}

impl<R, E> Future for ReadChunk<'_, R, E>
where
    R: AsyncRead + Unpin + ?Sized,
    E: TextEncoding + Unpin,
{
    type Output = Result<String>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        if this.buf.is_empty() {
            return Poll::Ready(Err(Error::ZeroCapacity));
        }

        let mut read_buf = ReadBuf::new(&mut this.buf);
        match Pin::new(&mut *this.reader).poll_read(cx, &mut read_buf) {
            Poll::Pending => Poll::Pending,
            Poll::Ready(Err(err)) => Poll::Ready(Err(err.into())),
            Poll::Ready(Ok(())) => {
                let filled = read_buf.filled();
                if filled.is_empty() {
                    return Poll::Ready(Ok(String::new()));
                }
                Poll::Ready(Ok(this.encoding.decode(filled).into_owned()))
            }
        }
    }
}

/// Future for [`drain_to_vec`](ChunkRead::drain_to_vec).
pub struct DrainToVec<'a, R: ?Sized> {
    reader: &'a mut R,
    out: Vec<u8>,
    buf: Box<[u8]>,
    read_done: bool,
    pos: usize,
    cap: usize,
}

impl<R> Future for DrainToVec<'_, R>
where
    R: AsyncRead + Unpin + ?Sized,
{
    type Output = Result<Vec<u8>>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();

        loop {
            // Same read-then-write pairing as the copy core; the accumulator
            // is driven through its AsyncWrite implementation.
            if this.pos < this.cap {
                match Pin::new(&mut this.out).poll_write(cx, &this.buf[this.pos..this.cap]) {
                    Poll::Pending => return Poll::Pending,
                    Poll::Ready(Err(err)) => return Poll::Ready(Err(err.into())),
                    Poll::Ready(Ok(0)) => {
                        return Poll::Ready(Err(
                            io::Error::from(io::ErrorKind::WriteZero).into()
                        ));
                    }
                    Poll::Ready(Ok(n)) => {
                        this.pos += n;
                        continue;
                    }
                }
            }

            if this.read_done {
                trace!(bytes = this.out.len(), "drain complete");
                return Poll::Ready(Ok(mem::take(&mut this.out)));
            }

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
