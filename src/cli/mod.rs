//! Command Line Interface module
//!
//! - `fetch`: Fetch and render a song page
//! - `cache`: Cache maintenance (stats, clear, cleanup, info)
//! - `config`: Configuration inspection

pub mod cache;
pub mod config;
pub mod fetch;
