//! Core functionality modules
//!
//! This module contains all core business logic organized into logical layers:
//! - `document`: Queryable wrapper over parsed page markup
//! - `extract`: Extraction rules from markup to song records
//! - `song`: The structured song record
//! - `services`: External service clients and the fetch-or-serve pipeline
//! - `infrastructure`: Cross-cutting concerns (cache, templates)

pub mod document;
pub mod extract;
pub mod infrastructure;
pub mod services;
pub mod song;

// Re-export commonly used types for convenience
pub use song::SongRecord;
