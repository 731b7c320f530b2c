use crate::err::{AppliesTo, IoErrorExt};
use std::future::Future;
use std::io::{self, IoSlice};
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::{sleep, Instant, Sleep};

pub async fn accept(listener: &TcpListener) -> Result<TcpStream, io::Error> {
    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                log::trace!("Accepted connection from {}", addr);
                stream.set_nodelay(true)?;
                return Ok(stream);
            }
            Err(e) => match e.applies_to() {
                AppliesTo::Connection => log::debug!("Aborted connection dropped: {}", e),
                AppliesTo::Listener => return Err(e),
            },
        }
    }
}

/// Wraps a socket so it fails with `TimedOut` when it sits idle, or when a write stays blocked.
///
/// Any completed read or write counts as activity and pushes the idle deadline back.
pub struct TimeoutIo<S> {
    inner: S,
    idle: Duration,
    write: Duration,
    idle_deadline: Pin<Box<Sleep>>,
    write_deadline: Option<Pin<Box<Sleep>>>,
}

impl<S> TimeoutIo<S> {
    pub fn new(inner: S, idle: Duration, write: Duration) -> Self {
        Self {
            inner,
            idle,
            write,
            idle_deadline: Box::pin(sleep(idle)),
            write_deadline: None,
        }
    }

    fn touch(&mut self) {
        self.write_deadline = None;
        self.idle_deadline.as_mut().reset(Instant::now() + self.idle);
    }

    fn poll_write_deadline<T>(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<T>> {
        let write = self.write;
        let deadline = self
            .write_deadline
            .get_or_insert_with(|| Box::pin(sleep(write)));
        match deadline.as_mut().poll(cx) {
            Poll::Ready(()) => Poll::Ready(Err(io::Error::new(
                io::ErrorKind::TimedOut,
                format!("write blocked for {:?}", write),
            ))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<S> AsyncRead for TimeoutIo<S>
where
    S: AsyncRead + Unpin,
{
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_read(cx, buf) {
            Poll::Ready(result) => {
                this.touch();
                Poll::Ready(result)
            }
            Poll::Pending => match this.idle_deadline.as_mut().poll(cx) {
                Poll::Ready(()) => Poll::Ready(Err(io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connection idle for {:?}", this.idle),
                ))),
                Poll::Pending => Poll::Pending,
            },
        }
    }
}

impl<S> AsyncWrite for TimeoutIo<S>
where
    S: AsyncWrite + Unpin,
{
    fn poll_write(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<Result<usize, io::Error>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_write(cx, buf) {
            Poll::Ready(result) => {
                this.touch();
                Poll::Ready(result)
            }
            Poll::Pending => this.poll_write_deadline(cx),
        }
    }

    fn poll_write_vectored(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        bufs: &[IoSlice<'_>],
    ) -> Poll<Result<usize, io::Error>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_write_vectored(cx, bufs) {
            Poll::Ready(result) => {
                this.touch();
                Poll::Ready(result)
            }
            Poll::Pending => this.poll_write_deadline(cx),
        }
    }

    fn is_write_vectored(&self) -> bool {
        self.inner.is_write_vectored()
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Result<(), io::Error>> {
        let this = &mut *self;
        match Pin::new(&mut this.inner).poll_flush(cx) {
            Poll::Ready(result) => {
                this.write_deadline = None;
                Poll::Ready(result)
            }
            Poll::Pending => this.poll_write_deadline(cx),
        }
    }

    fn poll_shutdown(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Result<(), io::Error>> {
        Pin::new(&mut self.inner).poll_shutdown(cx)
    }
}
