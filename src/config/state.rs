// Application state module
// Immutable state shared by every connection task

use std::io;
use std::path::PathBuf;

use super::types::Config;

/// Application state
pub struct AppState {
    pub config: Config,
    /// Canonical form of `config.server.root`, resolved once at startup
    pub root: PathBuf,
}

impl AppState {
    /// Resolve the served root and wrap the configuration
    ///
    /// Fails when the root directory does not exist.
    pub fn new(config: Config) -> io::Result<Self> {
        let root = PathBuf::from(&config.server.root).canonicalize()?;
        if !root.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("Served root is not a directory: {}", root.display()),
            ));
        }
        Ok(Self { config, root })
    }
}
