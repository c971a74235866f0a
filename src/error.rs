//! Error handling for the songpage-cli application
//!
//! This module provides a hierarchical error system with typed errors that can
//! be handled appropriately by different parts of the application. Extraction
//! itself has no error kind: missing markup fragments degrade to empty fields.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SongPageError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),

    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(Error, Debug)]
pub enum NetworkError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Song page not found: {id}")]
    PageNotFound { id: String },

    #[error("Unexpected upstream status: {status}")]
    UnexpectedStatus { status: reqwest::StatusCode },
}

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Response body is not valid UTF-8: {0}")]
    InvalidEncoding(#[from] std::str::Utf8Error),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Redis connection failed: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("File cache error: {0}")]
    FileCache(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Serialization(serde_json::Error),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config format: {0}")]
    InvalidFormat(#[from] toml::de::Error),

    #[error("Environment variable error: {0}")]
    Environment(#[from] std::env::VarError),
}

pub type Result<T> = std::result::Result<T, SongPageError>;

impl SongPageError {
    /// Whether the upstream explicitly reported the page as absent, as opposed
    /// to being unreachable or returning garbage.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            SongPageError::Network(NetworkError::PageNotFound { .. })
        )
    }
}

impl From<serde_json::Error> for CacheError {
    fn from(err: serde_json::Error) -> Self {
        CacheError::Serialization(err)
    }
}

impl From<std::io::Error> for SongPageError {
    fn from(err: std::io::Error) -> Self {
        SongPageError::Cache(CacheError::FileCache(err))
    }
}

impl From<serde_json::Error> for SongPageError {
    fn from(err: serde_json::Error) -> Self {
        SongPageError::Cache(CacheError::Serialization(err))
    }
}

impl From<toml::de::Error> for SongPageError {
    fn from(err: toml::de::Error) -> Self {
        SongPageError::Config(ConfigError::InvalidFormat(err))
    }
}
