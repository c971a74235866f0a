//! External services integration
//!
//! - Genius page client for song page retrieval
//! - Fetch-or-serve pipeline with caching support

pub mod genius;
