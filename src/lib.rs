//! dataserve
//!
//! Two small tools for publishing tabular data to browser visualisations:
//! a spreadsheet-to-CSV converter and a static file server that marks every
//! response as cross-origin readable and uncacheable.

pub mod config;
pub mod convert;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
