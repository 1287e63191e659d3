// Configuration module entry point
// Layers defaults, an optional serve.toml, SERVE_* environment variables and the CLI port

mod state;
mod types;

use std::net::SocketAddr;

pub use state::AppState;
pub use types::{Config, HttpConfig, LoggingConfig, PerformanceConfig, ServerConfig};

/// Default configuration file, looked up in the working directory
pub const DEFAULT_CONFIG_PATH: &str = "serve.toml";

/// Port used when neither the CLI nor the configuration names one
pub const DEFAULT_PORT: u16 = 8000;

impl Config {
    /// Load configuration from `serve.toml`, applying an optional CLI port
    pub fn load(port_override: Option<u16>) -> Result<Self, config::ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH, port_override)
    }

    /// Load configuration from the specified file path
    ///
    /// A missing file is not an error: defaults and environment variables still apply.
    pub fn load_from(
        config_path: &str,
        port_override: Option<u16>,
    ) -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(
                config::File::new(config_path, config::FileFormat::Toml).required(false),
            )
            .add_source(
                config::Environment::with_prefix("SERVE")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", i64::from(DEFAULT_PORT))?
            .set_default("server.root", ".")?
            .set_default("logging.access_log", true)?
            .set_default("logging.access_log_format", "common")?
            .set_default(
                "http.server_name",
                format!("dataserve/{}", env!("CARGO_PKG_VERSION")),
            )?
            .set_default("http.index_files", vec!["index.html", "index.htm"])?
            .set_default("http.directory_listing", true)?
            .set_default("performance.keep_alive", true)?
            .set_default("performance.connection_timeout", 30)?
            .set_override_option("server.port", port_override.map(i64::from))?
            .build()?;

        settings.try_deserialize()
    }

    pub fn get_socket_addr(&self) -> Result<SocketAddr, String> {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .map_err(|e| format!("Invalid address: {e}"))
    }
}

/// Parse the optional positional port argument
///
/// `None` means no argument was given and the configured port stands.
pub fn parse_port_arg(arg: Option<&str>) -> Result<Option<u16>, String> {
    arg.map(|raw| {
        raw.trim()
            .parse::<u16>()
            .map_err(|e| format!("Invalid port '{raw}': {e}"))
    })
    .transpose()
}
