//! Outgoing byte stream filter
//!
//! hyper answers requests it cannot parse on its own (400, 431, 505), before
//! any service runs, so those heads never pass through the handler.
//! [`FixedHeaderStream`] sits between hyper and the socket and adds the fixed
//! header lines to them. Handler responses are recognised by the body lengths
//! queued in [`ResponseQueue`] and pass through byte for byte.

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{ready, Context, Poll};

use hyper::body::Body as _;
use hyper::{Method, StatusCode};
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};

use crate::http::{fixed_header_lines, HttpResponse};

const HEAD_END: &[u8; 4] = b"\r\n\r\n";

/// Wire body lengths of handler responses not yet written, oldest first
#[derive(Debug, Clone, Default)]
pub struct ResponseQueue(Arc<Mutex<VecDeque<u64>>>);

impl ResponseQueue {
    /// Record a response the handler is about to hand to hyper
    pub fn push(&self, method: &Method, response: &HttpResponse) {
        let status = response.status();
        let body_len = if *method == Method::HEAD
            || status.is_informational()
            || status == StatusCode::NO_CONTENT
            || status == StatusCode::NOT_MODIFIED
        {
            0
        } else {
            response.body().size_hint().exact().unwrap_or(0)
        };

        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(body_len);
    }

    fn pop(&self) -> Option<u64> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }
}

/// Position in the outgoing response stream
#[derive(Debug, Clone, Copy)]
enum Framing {
    /// Next byte starts a response head
    Start,
    /// Inside the status line
    StatusLine { inject: bool, body_len: u64 },
    /// Inside header lines, `matched` bytes of the terminating CRLFCRLF seen
    Headers { matched: u8, body_len: u64 },
    Body { remaining: u64 },
}

/// Socket wrapper that completes response heads written by hyper itself
pub struct FixedHeaderStream<S> {
    inner: S,
    queue: ResponseQueue,
    framing: Framing,
    /// Accepted bytes not yet handed to `inner`
    pending: Vec<u8>,
    written: usize,
}

impl<S> FixedHeaderStream<S> {
    pub const fn new(inner: S, queue: ResponseQueue) -> Self {
        Self {
            inner,
            queue,
            framing: Framing::Start,
            pending: Vec::new(),
            written: 0,
        }
    }

    /// Copy `buf` into `pending`, inserting the fixed lines where needed
    fn accept(&mut self, buf: &[u8]) {
        let mut i = 0;
        while i < buf.len() {
            match self.framing {
                Framing::Start => {
                    // No queued length means hyper produced this response
                    let (inject, body_len) = match self.queue.pop() {
                        Some(len) => (false, len),
                        None => (true, 0),
                    };
                    self.framing = Framing::StatusLine { inject, body_len };
                }
                Framing::StatusLine { inject, body_len } => {
                    let byte = buf[i];
                    self.pending.push(byte);
                    i += 1;
                    if byte == b'\n' {
                        if inject {
                            self.pending
                                .extend_from_slice(fixed_header_lines().as_bytes());
                        }
                        self.framing = Framing::Headers {
                            matched: 2,
                            body_len,
                        };
                    }
                }
                Framing::Headers { matched, body_len } => {
                    let byte = buf[i];
                    self.pending.push(byte);
                    i += 1;

                    let matched = if byte == HEAD_END[usize::from(matched)] {
                        matched + 1
                    } else {
                        u8::from(byte == b'\r')
                    };
                    self.framing = if usize::from(matched) < HEAD_END.len() {
                        Framing::Headers { matched, body_len }
                    } else if body_len == 0 {
                        Framing::Start
                    } else {
                        Framing::Body {
                            remaining: body_len,
                        }
                    };
                }
                Framing::Body { remaining } => {
                    let available = buf.len() - i;
                    let take = usize::try_from(remaining).map_or(available, |r| r.min(available));
                    self.pending.extend_from_slice(&buf[i..i + take]);
                    i += take;

                    let remaining = remaining.saturating_sub(u64::try_from(take).unwrap_or(u64::MAX));
                    self.framing = if remaining == 0 {
                        Framing::Start
                    } else {
                        Framing::Body { remaining }
                    };
                }
            }
        }
    }
}

impl<S: AsyncWrite + Unpin> FixedHeaderStream<S> {
    /// Write out everything in `pending`
    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        while self.written < self.pending.len() {
            let n = ready!(Pin::new(&mut self.inner).poll_write(cx, &self.pending[self.written..]))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            self.written += n;
        }
        self.pending.clear();
        self.written = 0;
        Poll::Ready(Ok(()))
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for FixedHeaderStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_read(cx, buf)
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for FixedHeaderStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        this.accept(buf);

        // Whatever does not go out now is drained on the next write or flush
        if let Poll::Ready(Err(err)) = this.poll_drain(cx) {
            return Poll::Ready(Err(err));
        }
        Poll::Ready(Ok(buf.len()))
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        ready!(this.poll_drain(cx))?;
        Pin::new(&mut this.inner).poll_shutdown(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::Response;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    const HYPER_400: &str = "HTTP/1.1 400 Bad Request\r\nconnection: close\r\ncontent-length: 0\r\n\r\n";

    fn response(body: &'static str) -> HttpResponse {
        Response::new(Full::new(Bytes::from_static(body.as_bytes())))
    }

    /// Write `chunks` through the filter and return what reached the peer
    async fn filter(queue: ResponseQueue, chunks: &[&[u8]]) -> String {
        let (near, mut far) = tokio::io::duplex(64 * 1024);
        let mut stream = FixedHeaderStream::new(near, queue);
        for chunk in chunks {
            stream.write_all(chunk).await.unwrap();
        }
        stream.shutdown().await.unwrap();
        drop(stream);

        let mut out = String::new();
        far.read_to_string(&mut out).await.unwrap();
        out
    }

    #[tokio::test]
    async fn test_unqueued_head_gets_fixed_lines() {
        let out = filter(ResponseQueue::default(), &[HYPER_400.as_bytes()]).await;
        assert_eq!(
            out,
            format!(
                "HTTP/1.1 400 Bad Request\r\n{}connection: close\r\ncontent-length: 0\r\n\r\n",
                fixed_header_lines()
            )
        );
    }

    #[tokio::test]
    async fn test_handler_response_passes_through() {
        let queue = ResponseQueue::default();
        queue.push(&Method::GET, &response("HTTP/1.1 200 OK\r\n\r\n"));

        // The body looks like a head and is split across writes
        let head = "HTTP/1.1 200 OK\r\ncontent-length: 19\r\n\r\n";
        let out = filter(
            queue,
            &[head.as_bytes(), b"HTTP/1.1 2", b"00 OK\r\n\r\n", HYPER_400.as_bytes()],
        )
        .await;

        let expected_400 = format!(
            "HTTP/1.1 400 Bad Request\r\n{}connection: close\r\ncontent-length: 0\r\n\r\n",
            fixed_header_lines()
        );
        assert_eq!(out, format!("{head}HTTP/1.1 200 OK\r\n\r\n{expected_400}"));
    }

    #[tokio::test]
    async fn test_head_request_has_no_body_bytes() {
        let queue = ResponseQueue::default();
        queue.push(&Method::HEAD, &response("a,b\n1,2\n"));

        let head = "HTTP/1.1 200 OK\r\ncontent-length: 8\r\n\r\n";
        let out = filter(queue, &[head.as_bytes(), HYPER_400.as_bytes()]).await;
        assert!(out.starts_with(head));
        assert_eq!(out.matches("access-control-allow-origin").count(), 1);
        assert!(out[head.len()..].contains("access-control-allow-origin: *\r\n"));
    }
}
