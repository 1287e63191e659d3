//! Request handler module
//!
//! Static file serving for the working directory, with directory listings
//! and the fixed CORS/no-cache headers on every response.

pub mod listing;
pub mod router;
pub mod static_files;

// Re-export main entry point
pub use router::handle_request;
