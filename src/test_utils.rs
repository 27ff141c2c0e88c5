//! Shared helpers for unit tests.
//!
//! Provides consistent tracing-based logging initialization, phase and
//! assertion macros for readable test output, and mock streams with
//! adversarial delivery patterns: fragmented reads, stingy writes, stalls,
//! and hard failures.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Once};
use std::task::{Context, Poll, Wake, Waker};

use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tracing_subscriber::fmt::format::FmtSpan;

static INIT_LOGGING: Once = Once::new();

/// Initialize test logging with trace-level output.
///
/// Safe to call multiple times; only initializes once.
pub(crate) fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::TRACE)
            .with_test_writer()
            .with_target(true)
            .with_ansi(false)
            .with_span_events(FmtSpan::CLOSE)
            .try_init();
    });
}

/// Standard test prologue: logging plus a phase banner.
pub(crate) fn init_test(name: &str) {
    init_test_logging();
    crate::test_phase!(name);
}

/// Log a test phase transition with a visual separator.
#[macro_export]
macro_rules! test_phase {
    ($name:expr) => {
        tracing::info!(phase = %$name, "========================================");
        tracing::info!(phase = %$name, "TEST PHASE: {}", $name);
        tracing::info!(phase = %$name, "========================================");
    };
}

/// Log test completion.
#[macro_export]
macro_rules! test_complete {
    ($name:expr) => {
        tracing::info!(test = %$name, "test completed successfully: {}", $name);
    };
}

/// Log before assertions for context.
#[macro_export]
macro_rules! assert_with_log {
    ($cond:expr, $msg:expr, $expected:expr, $actual:expr) => {
        tracing::debug!(
            expected = ?$expected,
            actual = ?$actual,
            "Asserting: {}",
            $msg
        );
        assert!($cond, "{}: expected {:?}, got {:?}", $msg, $expected, $actual);
    };
}

struct NoopWaker;

impl Wake for NoopWaker {
    fn wake(self: Arc<Self>) {}
}

pub(crate) fn noop_waker() -> Waker {
    Waker::from(Arc::new(NoopWaker))
}

/// Poll a future to completion without a runtime. Returns `None` when it
/// stays pending past the iteration bound.
pub(crate) fn poll_ready<F: Future>(fut: &mut Pin<&mut F>) -> Option<F::Output> {
    let waker = noop_waker();
    let mut cx = Context::from_waker(&waker);
    for _ in 0..1024 {
        if let Poll::Ready(output) = fut.as_mut().poll(&mut cx) {
            return Some(output);
        }
    }
    None
}

/// A reader that serves at most `max_per_read` bytes per call, regardless
/// of how much buffer space the caller offers.
pub(crate) struct FragmentingReader {
    data: Vec<u8>,
    pos: usize,
    max_per_read: usize,
}

impl FragmentingReader {
    pub(crate) fn new(data: &[u8], max_per_read: usize) -> Self {
        assert!(max_per_read > 0, "fragment size must be non-zero");
        Self {
            data: data.to_vec(),
            pos: 0,
            max_per_read,
        }
    }
}

impl AsyncRead for FragmentingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if this.pos >= this.data.len() {
            return Poll::Ready(Ok(()));
        }
        let n = this
            .max_per_read
            .min(this.data.len() - this.pos)
            .min(buf.remaining());
        buf.put_slice(&this.data[this.pos..this.pos + n]);
        this.pos += n;
        Poll::Ready(Ok(()))
    }
}

/// A writer that accepts at most `max_per_write` bytes per call and records
/// the size of every accepted chunk.
pub(crate) struct StingyWriter {
    pub(crate) written: Vec<u8>,
    pub(crate) chunks: Vec<usize>,
    max_per_write: usize,
}

impl StingyWriter {
    pub(crate) fn new(max_per_write: usize) -> Self {
        assert!(max_per_write > 0, "acceptance size must be non-zero");
        Self {
            written: Vec::new(),
            chunks: Vec::new(),
            max_per_write,
        }
    }
}

impl AsyncWrite for StingyWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let n = buf.len().min(this.max_per_write);
        this.written.extend_from_slice(&buf[..n]);
        this.chunks.push(n);
        Poll::Ready(Ok(n))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// A writer that accepts everything and records the size of every chunk.
pub(crate) struct ChunkLogWriter {
    pub(crate) written: Vec<u8>,
    pub(crate) chunks: Vec<usize>,
}

impl ChunkLogWriter {
    pub(crate) fn new() -> Self {
        Self {
            written: Vec::new(),
            chunks: Vec::new(),
        }
    }
}

impl AsyncWrite for ChunkLogWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        this.written.extend_from_slice(buf);
        this.chunks.push(buf.len());
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}

/// A reader wrapper that returns `Pending` once before every read.
pub(crate) struct PendingOnceReader<R> {
    inner: R,
    ready: bool,
}

impl<R> PendingOnceReader<R> {
    pub(crate) fn new(inner: R) -> Self {
        Self {
            inner,
            ready: false,
        }
    }
}

impl<R: AsyncRead + Unpin> AsyncRead for PendingOnceReader<R> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        if !this.ready {
            this.ready = true;
            cx.waker().wake_by_ref();
            return Poll::Pending;
        }
        this.ready = false;
        Pin::new(&mut this.inner).poll_read(cx, buf)
    }
}

/// A reader whose every read fails with `ConnectionReset`.
pub(crate) struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::from(io::ErrorKind::ConnectionReset)))
    }
}

/// A writer whose every write fails with `BrokenPipe`.
pub(crate) struct FailingWriter;

impl AsyncWrite for FailingWriter {
    fn poll_write(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        Poll::Ready(Err(io::Error::from(io::ErrorKind::BrokenPipe)))
    }

    fn poll_flush(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }

    fn poll_shutdown(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Poll::Ready(Ok(()))
    }
}
