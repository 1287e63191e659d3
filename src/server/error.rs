//! Server error types

use std::io;
use std::net::SocketAddr;
use std::path::PathBuf;
use thiserror::Error;

/// Failures that stop the server from starting or running
///
/// Request-level problems never surface here; they become HTTP responses.
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("{0}")]
    InvalidAddress(String),

    #[error("cannot serve root '{path}': {source}")]
    Root {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("failed to register signal handlers: {0}")]
    Signal(#[source] io::Error),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
