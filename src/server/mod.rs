// Server module entry point
// Startup, connection handling and graceful shutdown

pub mod connection;
mod error;
pub mod listener;
pub mod signal;
pub mod stream;

// `loop` is a keyword, so the file is mounted under another name
#[path = "loop.rs"]
pub mod server_loop;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

use crate::config::{AppState, Config};
use crate::logger;

pub use error::ServerError;
pub use listener::create_listener;
pub use server_loop::start_server_loop;

/// Bind, announce, and serve until SIGINT/SIGTERM
pub async fn run(config: Config) -> Result<(), ServerError> {
    let addr = config
        .get_socket_addr()
        .map_err(ServerError::InvalidAddress)?;
    let root_path = PathBuf::from(&config.server.root);
    let state = Arc::new(AppState::new(config).map_err(|source| ServerError::Root {
        path: root_path,
        source,
    })?);

    let listener = create_listener(addr).map_err(|source| ServerError::Bind { addr, source })?;
    logger::log_server_start(&listener.local_addr()?, &state.config);

    let shutdown = Arc::new(Notify::new());
    signal::start_signal_handler(Arc::clone(&shutdown)).map_err(ServerError::Signal)?;

    start_server_loop(listener, state, shutdown).await
}
