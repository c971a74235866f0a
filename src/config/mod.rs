use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::core::infrastructure::cache::SongCache;
use crate::core::services::genius::GeniusClient;

fn default_request_timeout_seconds() -> u64 {
    10
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Genius instance URL the song pages are fetched from
    pub genius_instance: String,

    /// Directory the file cache lives in
    pub cache_path: PathBuf,

    /// Redis URL for cache (optional)
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Timeout for page fetches (seconds)
    #[serde(default = "default_request_timeout_seconds")]
    pub request_timeout_seconds: u64,
}

impl Default for Config {
    fn default() -> Self {
        // Use /data only when explicitly running under Docker (DOCKER env var)
        let default_data_path = if env::var("DOCKER").is_ok() {
            PathBuf::from("/data")
        } else {
            match ProjectDirs::from("io", "songpage", "songpage-cli") {
                Some(project_dirs) => project_dirs.data_dir().to_path_buf(),
                None => {
                    // Graceful fallback to current directory if project dirs unavailable
                    warn!("ProjectDirs unavailable; falling back to current directory for data path");
                    PathBuf::from(".")
                }
            }
        };

        Self {
            genius_instance: "https://genius.com".to_string(),
            cache_path: default_data_path.join("cache"),
            redis_url: None,
            request_timeout_seconds: 10,
        }
    }
}

impl Config {
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        // Try to load .env file if it exists (for Docker and development)
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        let config_file = if let Some(path) = config_path {
            PathBuf::from(path)
        } else {
            Self::default_config_path()?
        };

        if config_file.exists() {
            let content = fs::read_to_string(&config_file)?;
            let file_config: Config = toml::from_str(&content)?;
            config = file_config;
        }

        // Environment variables take the highest priority
        config.load_from_env();

        fs::create_dir_all(&config.cache_path)?;

        // Save config file if it doesn't exist
        if !config_file.exists() {
            if let Some(parent) = config_file.parent() {
                fs::create_dir_all(parent)?;
            }
            config.save(&config_file)?;
        }

        Ok(config)
    }

    /// Load configuration from environment variables
    fn load_from_env(&mut self) {
        if let Ok(instance) = env::var("SONGPAGE_GENIUS_INSTANCE") {
            self.genius_instance = instance;
        }

        if let Ok(cache_path) = env::var("SONGPAGE_CACHE_PATH") {
            self.cache_path = PathBuf::from(cache_path);
        }

        if let Ok(redis_url) = env::var("SONGPAGE_REDIS_URL") {
            let trimmed = redis_url.trim().to_string();
            if !trimmed.is_empty() {
                self.redis_url = Some(trimmed);
            } else {
                self.redis_url = None;
            }
        }

        if let Ok(timeout) = env::var("SONGPAGE_REQUEST_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse::<u64>() {
                self.request_timeout_seconds = value;
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn default_config_path() -> Result<PathBuf> {
        let project_dirs = ProjectDirs::from("io", "songpage", "songpage-cli")
            .ok_or_else(|| anyhow::anyhow!("Failed to determine project directories"))?;

        Ok(project_dirs.config_dir().join("config.toml"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Self::default_config_path()
    }

    pub fn create_genius_client(&self) -> GeniusClient {
        GeniusClient::new(&self.genius_instance, self.request_timeout_seconds)
    }

    pub fn create_cache(&self) -> Result<SongCache> {
        SongCache::new(self.cache_path.clone(), self.redis_url.as_deref())
    }
}
