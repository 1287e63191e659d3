//! HTTP protocol layer module
//!
//! Provides HTTP protocol-related base functionality, decoupled from file lookup.

pub mod cache;
pub mod headers;
pub mod mime;
pub mod response;

// Re-export commonly used types
pub use headers::{apply_cors_headers, fixed_header_lines};
pub use response::{
    build_304_response, build_403_response, build_404_response, build_501_response,
    build_error_response, build_file_response, build_html_response, build_redirect_response,
    escape_html, HttpResponse,
};
