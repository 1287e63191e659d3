// Connection handling module
// Serves a single accepted TCP connection on its own task

use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};

use super::stream::{FixedHeaderStream, ResponseQueue};
use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Serve an accepted connection in a spawned task.
///
/// 1. Wraps the TCP stream so heads hyper writes itself get the fixed headers
/// 2. Configures HTTP/1.1 keep-alive from the performance settings
/// 3. Serves every request on the connection with the static file handler
/// 4. Bounds the whole connection by `connection_timeout` (0 disables it)
pub fn accept_connection(
    stream: tokio::net::TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
) {
    let state = Arc::clone(state);

    tokio::spawn(async move {
        let queue = ResponseQueue::default();
        let io = TokioIo::new(FixedHeaderStream::new(stream, queue.clone()));
        let performance = state.config.performance.clone();

        let mut builder = http1::Builder::new();
        builder
            .timer(TokioTimer::new())
            .keep_alive(performance.keep_alive);

        let conn = builder.serve_connection(
            io,
            service_fn(move |req| {
                let state = Arc::clone(&state);
                let queue = queue.clone();
                async move {
                    let method = req.method().clone();
                    let response = handler::handle_request(req, state, peer_addr).await?;
                    queue.push(&method, &response);
                    Ok::<_, Infallible>(response)
                }
            }),
        );

        if performance.connection_timeout == 0 {
            if let Err(err) = conn.await {
                log_serve_error(&err, peer_addr);
            }
            return;
        }

        let timeout = Duration::from_secs(performance.connection_timeout);
        match tokio::time::timeout(timeout, conn).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => log_serve_error(&err, peer_addr),
            Err(_) => {
                logger::log_warning(&format!(
                    "Connection from {peer_addr} timed out after {} seconds",
                    timeout.as_secs()
                ));
            }
        }
    });
}

/// Malformed or truncated request, as opposed to a server-side failure
fn is_client_fault(err: &hyper::Error) -> bool {
    err.is_parse() || err.is_incomplete_message()
}

fn log_serve_error(err: &hyper::Error, peer_addr: SocketAddr) {
    if is_client_fault(err) {
        logger::log_warning(&format!("Malformed request from {peer_addr}: {err}"));
    } else {
        logger::log_connection_error(err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::Full;
    use hyper::body::Bytes;
    use hyper::Response;
    use tokio::io::AsyncWriteExt;

    async fn serve_bytes(request: &[u8]) -> Result<(), hyper::Error> {
        let (server_side, mut client_side) = tokio::io::duplex(4096);
        client_side.write_all(request).await.unwrap();

        http1::Builder::new()
            .serve_connection(
                TokioIo::new(server_side),
                service_fn(|_req| async {
                    Ok::<_, Infallible>(Response::new(Full::new(Bytes::new())))
                }),
            )
            .await
    }

    #[tokio::test]
    async fn test_garbage_request_is_client_fault() {
        let err = serve_bytes(b"GARBAGE\r\n\r\n").await.unwrap_err();
        assert!(is_client_fault(&err));
    }

    #[tokio::test]
    async fn test_bad_header_is_client_fault() {
        let err = serve_bytes(b"GET /x HTTP/1.1\r\nBad Header\r\n\r\n")
            .await
            .unwrap_err();
        assert!(is_client_fault(&err));
    }
}
