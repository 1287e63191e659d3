// Signal handling module
//
// SIGINT (Ctrl+C) and SIGTERM both request a graceful stop of the serve loop.

use std::sync::Arc;
use tokio::sync::Notify;

/// Register shutdown signals and notify `shutdown` on the first one received
///
/// Registration happens before returning, so failures surface to the caller.
/// `notify_one` stores a permit, so a signal arriving while the loop is busy
/// accepting is not lost.
#[cfg(unix)]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::spawn(async move {
        tokio::select! {
            _ = sigint.recv() => {}
            _ = sigterm.recv() => {}
        }
        shutdown.notify_one();
    });
    Ok(())
}

/// Windows fallback - only handles Ctrl+C
#[cfg(not(unix))]
pub fn start_signal_handler(shutdown: Arc<Notify>) -> std::io::Result<()> {
    tokio::spawn(async move {
        if let Ok(()) = tokio::signal::ctrl_c().await {
            shutdown.notify_one();
        }
    });
    Ok(())
}
