//! Write-side extension methods: full writes of raw bytes and encoded text.
//!
//! Every helper here upholds the same contract: either the entire payload
//! reaches the destination or the call fails. Partial acceptance by the
//! underlying writer is retried until the payload is drained; a writer that
//! accepts zero bytes of a non-empty payload fails the call with
//! [`WriteZero`](std::io::ErrorKind::WriteZero).
//!
//! # Cancel Safety
//!
//! None of these futures are cancel-safe: dropping one mid-flight may leave
//! a prefix of the payload written.

use std::fmt;
use std::future::Future;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::AsyncWrite;

use crate::encoding::{TextEncoding, Utf8};
use crate::error::{Error, Result};

/// Write-side extension methods for any [`AsyncWrite`] stream.
pub trait ChunkWrite: AsyncWrite {
    /// Writes `data` to the stream in full.
    fn write_bytes<'a>(&'a mut self, data: &'a [u8]) -> WriteBytes<'a, Self>
    where
        Self: Unpin,
    {
        WriteBytes {
            writer: self,
            buf: data,
            pos: 0,
        }
    }

    /// Encodes `text` as UTF-8 and writes it in full.
    fn write_text(&mut self, text: &str) -> WriteEncoded<'_, Self>
    where
        Self: Unpin,
    {
        self.write_text_with(text, Utf8)
    }

    /// Encodes `text` with the supplied encoding and writes it in full.
    fn write_text_with<E>(&mut self, text: &str, encoding: E) -> WriteEncoded<'_, Self>
    where
        Self: Unpin,
        E: TextEncoding,
    {
        WriteEncoded {
            writer: self,
            payload: encoding.encode(text).into_owned(),
            pos: 0,
        }
    }

    /// Writes `text` followed by the line terminator CR LF, UTF-8 encoded.
    ///
    /// The terminator is the two bytes `0x0D 0x0A` regardless of the host
    /// platform: this is the framing convention of line-oriented wire
    /// protocols, not a platform newline.
    ///
    /// # Example
    ///
    /// ```ignore
    /// stream.write_line("250 OK").await?;
    /// ```
    fn write_line(&mut self, text: &str) -> WriteEncoded<'_, Self>
    where
        Self: Unpin,
    {
        self.write_line_with(text, Utf8)
    }

    /// CR-LF-terminated line write with the supplied encoding.
    ///
    /// The terminator is appended to the text before encoding, so the codec
    /// sees one contiguous string.
    fn write_line_with<E>(&mut self, text: &str, encoding: E) -> WriteEncoded<'_, Self>
    where
        Self: Unpin,
        E: TextEncoding,
    {
        let mut line = String::with_capacity(text.len() + 2);
        line.push_str(text);
        line.push_str("\r\n");
        WriteEncoded {
            writer: self,
            payload: encoding.encode(&line).into_owned(),
            pos: 0,
        }
    }

    /// Renders format arguments into text, encodes it as UTF-8, and writes
    /// it in full.
    ///
    /// A `Display` implementation that fails surfaces as
    /// [`Error::Format`]; nothing is written in that case.
    ///
    /// # Example
    ///
    /// ```ignore
    /// stream.write_formatted(format_args!("221 {} closing", host)).await?;
    /// ```
    fn write_formatted(&mut self, args: fmt::Arguments<'_>) -> WriteFormatted<'_, Self>
    where
        Self: Unpin,
    {
        self.write_formatted_with(args, Utf8)
    }

    /// Format-rendered write with the supplied encoding.
    fn write_formatted_with<E>(
        &mut self,
        args: fmt::Arguments<'_>,
        encoding: E,
    ) -> WriteFormatted<'_, Self>
    where
        Self: Unpin,
        E: TextEncoding,
    {
        let mut text = String::new();
        let payload = fmt::write(&mut text, args).map(|()| encoding.encode(&text).into_owned());
        WriteFormatted {
            writer: self,
            payload,
            pos: 0,
        }
    }
}

impl<W: AsyncWrite + ?Sized> ChunkWrite for W {}

/// Future for [`write_bytes`](ChunkWrite::write_bytes).
pub struct WriteBytes<'a, W: ?Sized> {
    writer: &'a mut W,
    buf: &'a [u8],
    pos: usize,
}

impl<W> Future for WriteBytes<'_, W>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    type Output = Result;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        poll_write_all(cx, &mut *this.writer, this.buf, &mut this.pos)
    }
}

/// Future for the encoded text writes ([`write_text`](ChunkWrite::write_text),
/// [`write_line`](ChunkWrite::write_line) and their `_with` variants).
pub struct WriteEncoded<'a, W: ?Sized> {
    writer: &'a mut W,
    payload: Vec<u8>,
    pos: usize,
}

impl<W> Future for WriteEncoded<'_, W>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    type Output = Result;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        poll_write_all(cx, &mut *this.writer, &this.payload, &mut this.pos)
    }
}

/// Future for [`write_formatted`](ChunkWrite::write_formatted).
pub struct WriteFormatted<'a, W: ?Sized> {
    writer: &'a mut W,
    payload: std::result::Result<Vec<u8>, fmt::Error>,
    pos: usize,
}

impl<W> Future for WriteFormatted<'_, W>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    type Output = Result;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.get_mut();
        match &this.payload {
            Err(err) => Poll::Ready(Err(Error::Format(*err))),
            Ok(payload) => poll_write_all(cx, &mut *this.writer, payload, &mut this.pos),
        }
    }
}

/// Shared full-write loop: drives `buf[*pos..]` into the writer until the
/// payload is drained, an error occurs, or the writer stalls.
fn poll_write_all<W>(
    cx: &mut Context<'_>,
    writer: &mut W,
    buf: &[u8],
    pos: &mut usize,
) -> Poll<Result>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    while *pos < buf.len() {
        match Pin::new(&mut *writer).poll_write(cx, &buf[*pos..]) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Err(err)) => return Poll::Ready(Err(err.into())),
            Poll::Ready(Ok(0)) => {
                return Poll::Ready(Err(io::Error::from(io::ErrorKind::WriteZero).into()));
            }
            Poll::Ready(Ok(n)) => *pos += n,
        }
    }
    Poll::Ready(Ok(()))
}
