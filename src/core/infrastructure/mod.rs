//! Infrastructure and cross-cutting concerns
//!
//! - Caching layer for extracted song records
//! - Template engine for output rendering

pub mod cache;
pub mod templates;

// Re-export main types
pub use cache::{SongCache, SongCacheInterface};
pub use templates::TemplateEngine;
