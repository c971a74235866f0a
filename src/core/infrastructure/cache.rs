//! Cache layer for extracted song records.
//!
//! Keyed by the song identifier. A hit returns the stored record as-is with
//! no re-validation against the source; store-side expiry simply manifests as
//! a miss. Concurrent writers for the same identifier are allowed, last
//! writer wins, and each write is atomic from a reader's perspective.

use anyhow::Result;
use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tracing::{debug, info, warn};

use crate::core::song::SongRecord;

#[async_trait]
pub trait SongCacheInterface: Send + Sync {
    async fn get(&mut self, id: &str) -> Option<SongRecord>;
    async fn put(&mut self, id: &str, record: SongRecord) -> Result<()>;
    async fn clear(&mut self) -> Result<()>;
    fn get_stats(&self) -> CacheStats;
    async fn cleanup_old_entries(&mut self) -> Result<()>;
    async fn save_index(&self) -> Result<()>;
}

#[derive(Serialize, Deserialize, Clone)]
struct CacheEntry {
    record: SongRecord,
    cached_at: u64,
    access_count: u32,
    last_accessed: u64,
}

#[derive(Serialize, Deserialize)]
struct CacheIndex {
    entries: HashMap<String, CacheEntry>,
    total_requests: u64,
    cache_hits: u64,
    last_cleanup: u64,
}

impl CacheIndex {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            total_requests: 0,
            cache_hits: 0,
            last_cleanup: current_timestamp(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct CacheStats {
    pub total_entries: usize,
    pub total_requests: u64,
    pub cache_hits: u64,
    pub hit_rate_percent: f64,
    pub last_cleanup: u64,
}

pub struct FileCache {
    cache_dir: PathBuf,
    index: CacheIndex,
    max_age_hours: u64,
    max_entries: usize,
}

impl FileCache {
    pub fn new(cache_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&cache_dir)?;

        let index_path = cache_dir.join("song_index.json");
        let index = if index_path.exists() {
            let content = fs::read_to_string(&index_path)?;
            serde_json::from_str(&content).unwrap_or_else(|_| CacheIndex::new())
        } else {
            CacheIndex::new()
        };

        Ok(Self {
            cache_dir,
            index,
            max_age_hours: 24 * 7, // 1 week
            max_entries: 10000,
        })
    }
}

#[async_trait]
impl SongCacheInterface for FileCache {
    async fn get(&mut self, id: &str) -> Option<SongRecord> {
        self.index.total_requests += 1;

        if let Some(entry) = self.index.entries.get_mut(id) {
            let now = current_timestamp();

            if now - entry.cached_at > self.max_age_hours * 3600 {
                debug!("Cache entry expired for song: {}", id);
                self.index.entries.remove(id);
                return None;
            }

            entry.access_count += 1;
            entry.last_accessed = now;
            self.index.cache_hits += 1;

            debug!("Cache hit for song: {}", id);
            Some(entry.record.clone())
        } else {
            debug!("Cache miss for song: {}", id);
            None
        }
    }

    async fn put(&mut self, id: &str, record: SongRecord) -> Result<()> {
        let now = current_timestamp();

        let entry = CacheEntry {
            record,
            cached_at: now,
            access_count: 1,
            last_accessed: now,
        };

        self.index.entries.insert(id.to_string(), entry);

        if self.index.entries.len() > self.max_entries {
            self.cleanup_old_entries().await?;
        }

        debug!("Cached song record: {}", id);
        Ok(())
    }

    async fn clear(&mut self) -> Result<()> {
        self.index.entries.clear();
        self.index.total_requests = 0;
        self.index.cache_hits = 0;
        self.index.last_cleanup = current_timestamp();

        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
            fs::create_dir_all(&self.cache_dir)?;
        }

        info!("File cache cleared");
        Ok(())
    }

    fn get_stats(&self) -> CacheStats {
        let hit_rate = if self.index.total_requests > 0 {
            (self.index.cache_hits as f64 / self.index.total_requests as f64) * 100.0
        } else {
            0.0
        };

        CacheStats {
            total_entries: self.index.entries.len(),
            total_requests: self.index.total_requests,
            cache_hits: self.index.cache_hits,
            hit_rate_percent: hit_rate,
            last_cleanup: self.index.last_cleanup,
        }
    }

    async fn cleanup_old_entries(&mut self) -> Result<()> {
        let now = current_timestamp();
        let max_age = self.max_age_hours * 3600;

        let before_count = self.index.entries.len();
        self.index
            .entries
            .retain(|_, entry| now - entry.cached_at <= max_age);
        let after_expiry_count = self.index.entries.len();

        // If still over the cap, drop least recently used entries
        if self.index.entries.len() > self.max_entries {
            let mut entries: Vec<(String, u64)> = self
                .index
                .entries
                .iter()
                .map(|(id, entry)| (id.clone(), entry.last_accessed))
                .collect();
            entries.sort_by_key(|(_, last_accessed)| *last_accessed);

            let to_remove = self.index.entries.len() - self.max_entries;
            for (id, _) in entries.into_iter().take(to_remove) {
                self.index.entries.remove(&id);
            }
        }

        let final_count = self.index.entries.len();
        self.index.last_cleanup = now;

        info!(
            "File cache cleanup: {} -> {} -> {} entries",
            before_count, after_expiry_count, final_count
        );

        Ok(())
    }

    async fn save_index(&self) -> Result<()> {
        let index_path = self.cache_dir.join("song_index.json");
        let content = serde_json::to_string_pretty(&self.index)?;
        if let Some(parent) = index_path.parent() {
            fs::create_dir_all(parent)?;
        }
        // Write atomically: write to temp then rename
        let tmp_path = index_path.with_extension("json.tmp");
        fs::write(&tmp_path, &content)?;
        fs::rename(&tmp_path, &index_path)?;
        Ok(())
    }
}

pub struct RedisCache {
    client: RedisClient,
    key_prefix: String,
    ttl_seconds: u64,
    stats: CacheStats,
}

impl RedisCache {
    pub fn new(redis_url: &str) -> Result<Self> {
        let client = RedisClient::open(redis_url)?;

        Ok(Self {
            client,
            key_prefix: "songpage:song:".to_string(),
            ttl_seconds: 7 * 24 * 3600, // 7 days
            stats: CacheStats {
                total_entries: 0,
                total_requests: 0,
                cache_hits: 0,
                hit_rate_percent: 0.0,
                last_cleanup: current_timestamp(),
            },
        })
    }

    fn key_for(&self, id: &str) -> String {
        format!("{}{}", self.key_prefix, id)
    }
}

#[async_trait]
impl SongCacheInterface for RedisCache {
    async fn get(&mut self, id: &str) -> Option<SongRecord> {
        let key = self.key_for(id);
        self.stats.total_requests += 1;

        match self.client.get_async_connection().await {
            Ok(mut con) => match con.get::<_, Option<String>>(&key).await {
                Ok(Some(value)) => match serde_json::from_str::<SongRecord>(&value) {
                    Ok(record) => {
                        self.stats.cache_hits += 1;
                        debug!("Redis cache hit for song: {}", id);
                        Some(record)
                    }
                    Err(e) => {
                        warn!("Failed to deserialize cached song record: {}", e);
                        None
                    }
                },
                Ok(None) => {
                    debug!("Redis cache miss for song: {}", id);
                    None
                }
                Err(e) => {
                    warn!("Redis get error for {}: {}", key, e);
                    None
                }
            },
            Err(e) => {
                warn!("Failed to connect to Redis: {}", e);
                None
            }
        }
    }

    async fn put(&mut self, id: &str, record: SongRecord) -> Result<()> {
        let key = self.key_for(id);

        let value = serde_json::to_string(&record)
            .map_err(|e| anyhow::anyhow!("Serialization error: {}", e))?;

        match self.client.get_async_connection().await {
            Ok(mut con) => {
                let _: () = con
                    .set_ex(&key, &value, self.ttl_seconds)
                    .await
                    .map_err(|e| anyhow::anyhow!("Redis setex error: {}", e))?;

                debug!("Cached song record in Redis: {}", id);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to connect to Redis for put: {}", e);
                Err(anyhow::anyhow!("Redis connection error: {}", e))
            }
        }
    }

    async fn clear(&mut self) -> Result<()> {
        match self.client.get_async_connection().await {
            Ok(mut con) => {
                let pattern = format!("{}*", self.key_prefix);
                let keys: Vec<String> = con
                    .keys(&pattern)
                    .await
                    .map_err(|e| anyhow::anyhow!("Redis keys error: {}", e))?;

                if !keys.is_empty() {
                    let _: () = con
                        .del(&keys)
                        .await
                        .map_err(|e| anyhow::anyhow!("Redis del error: {}", e))?;
                }

                self.stats.total_requests = 0;
                self.stats.cache_hits = 0;
                self.stats.last_cleanup = current_timestamp();

                info!("Redis cache cleared, removed {} keys", keys.len());
                Ok(())
            }
            Err(e) => {
                warn!("Failed to connect to Redis for clear: {}", e);
                Err(anyhow::anyhow!("Redis connection error: {}", e))
            }
        }
    }

    fn get_stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.hit_rate_percent = if stats.total_requests > 0 {
            (stats.cache_hits as f64 / stats.total_requests as f64) * 100.0
        } else {
            0.0
        };
        stats
    }

    async fn cleanup_old_entries(&mut self) -> Result<()> {
        // Redis expires keys itself via TTL
        self.stats.last_cleanup = current_timestamp();
        debug!("Redis cache cleanup completed (automatic TTL)");
        Ok(())
    }

    async fn save_index(&self) -> Result<()> {
        Ok(())
    }
}

/// Redis in front of the file cache; a file hit backfills Redis, and a put
/// succeeds if either layer accepts it.
pub struct HybridCache {
    redis_cache: Option<RedisCache>,
    file_cache: FileCache,
}

impl HybridCache {
    pub fn new(file_cache_dir: PathBuf, redis_url: Option<&str>) -> Result<Self> {
        let file_cache = FileCache::new(file_cache_dir)?;

        let redis_cache = if let Some(url) = redis_url {
            match RedisCache::new(url) {
                Ok(cache) => {
                    info!("Redis cache initialized successfully");
                    Some(cache)
                }
                Err(e) => {
                    warn!("Failed to initialize Redis cache, falling back to file only: {}", e);
                    None
                }
            }
        } else {
            None
        };

        Ok(Self {
            redis_cache,
            file_cache,
        })
    }
}

#[async_trait]
impl SongCacheInterface for HybridCache {
    async fn get(&mut self, id: &str) -> Option<SongRecord> {
        if let Some(redis) = &mut self.redis_cache {
            if let Some(record) = redis.get(id).await {
                debug!("Hybrid cache: Redis hit for song {}", id);
                return Some(record);
            }
        }

        if let Some(record) = self.file_cache.get(id).await {
            debug!("Hybrid cache: File hit for song {}", id);

            if let Some(redis) = &mut self.redis_cache {
                if let Err(e) = redis.put(id, record.clone()).await {
                    debug!("Failed to update Redis cache from file cache: {}", e);
                }
            }

            return Some(record);
        }

        debug!("Hybrid cache: Miss for song {}", id);
        None
    }

    async fn put(&mut self, id: &str, record: SongRecord) -> Result<()> {
        let mut redis_error = None;
        let mut file_error = None;

        if let Some(redis) = &mut self.redis_cache {
            if let Err(e) = redis.put(id, record.clone()).await {
                redis_error = Some(e);
            }
        }

        if let Err(e) = self.file_cache.put(id, record).await {
            file_error = Some(e);
        }

        match (redis_error, file_error) {
            (Some(redis_err), Some(file_err)) => Err(anyhow::anyhow!(
                "Both caches failed - Redis: {}, File: {}",
                redis_err,
                file_err
            )),
            (Some(redis_err), None) => {
                debug!("Redis cache put failed, but file cache succeeded: {}", redis_err);
                Ok(())
            }
            (None, Some(file_err)) => {
                debug!("File cache put failed, but Redis cache succeeded: {}", file_err);
                Ok(())
            }
            (None, None) => Ok(()),
        }
    }

    async fn clear(&mut self) -> Result<()> {
        let mut errors = Vec::new();

        if let Some(redis) = &mut self.redis_cache {
            if let Err(e) = redis.clear().await {
                errors.push(format!("Redis: {}", e));
            }
        }

        if let Err(e) = self.file_cache.clear().await {
            errors.push(format!("File: {}", e));
        }

        if errors.is_empty() {
            info!("Hybrid cache cleared successfully");
            Ok(())
        } else {
            Err(anyhow::anyhow!("Cache clear errors: {}", errors.join(", ")))
        }
    }

    fn get_stats(&self) -> CacheStats {
        let file_stats = self.file_cache.get_stats();

        if let Some(redis) = &self.redis_cache {
            let redis_stats = redis.get_stats();
            let total_reqs = file_stats.total_requests + redis_stats.total_requests;
            let total_hits = file_stats.cache_hits + redis_stats.cache_hits;

            CacheStats {
                total_entries: file_stats.total_entries, // file cache tracks entries
                total_requests: total_reqs,
                cache_hits: total_hits,
                hit_rate_percent: if total_reqs > 0 {
                    (total_hits as f64 / total_reqs as f64) * 100.0
                } else {
                    0.0
                },
                last_cleanup: std::cmp::max(file_stats.last_cleanup, redis_stats.last_cleanup),
            }
        } else {
            file_stats
        }
    }

    async fn cleanup_old_entries(&mut self) -> Result<()> {
        let mut errors = Vec::new();

        if let Some(redis) = &mut self.redis_cache {
            if let Err(e) = redis.cleanup_old_entries().await {
                errors.push(format!("Redis: {}", e));
            }
        }

        if let Err(e) = self.file_cache.cleanup_old_entries().await {
            errors.push(format!("File: {}", e));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Cleanup errors: {}", errors.join(", ")))
        }
    }

    async fn save_index(&self) -> Result<()> {
        // Only the file cache persists an index
        self.file_cache.save_index().await
    }
}

pub type SongCache = HybridCache;

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or(Duration::from_secs(0))
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::song::About;

    fn temp_cache_dir(tag: &str) -> PathBuf {
        std::env::temp_dir().join(format!("songpage-cache-test-{}-{}", tag, std::process::id()))
    }

    fn sample_record() -> SongRecord {
        let mut credits = HashMap::new();
        credits.insert("Producer".to_string(), "B".to_string());
        credits.insert("Written By".to_string(), "Someone".to_string());

        SongRecord {
            artist: "Test Artist".to_string(),
            title: "Test Song".to_string(),
            image: "/images/photos/x.jpg".to_string(),
            lyrics: "<p>La la</p>".to_string(),
            credits,
            about: About {
                full: "b".repeat(300),
                short: format!("{}...", "b".repeat(250)),
            },
        }
    }

    #[tokio::test]
    async fn file_cache_round_trip_is_lossless() {
        let dir = temp_cache_dir("roundtrip");
        let _ = fs::remove_dir_all(&dir);

        let mut cache = FileCache::new(dir.clone()).unwrap();
        let record = sample_record();
        cache.put("abc-lyrics", record.clone()).await.unwrap();

        let got = cache.get("abc-lyrics").await.unwrap();
        assert_eq!(got, record);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn file_cache_round_trip_survives_reload() {
        let dir = temp_cache_dir("reload");
        let _ = fs::remove_dir_all(&dir);

        let record = sample_record();
        {
            let mut cache = FileCache::new(dir.clone()).unwrap();
            cache.put("abc-lyrics", record.clone()).await.unwrap();
            cache.save_index().await.unwrap();
        }

        let mut reopened = FileCache::new(dir.clone()).unwrap();
        let got = reopened.get("abc-lyrics").await.unwrap();
        assert_eq!(got, record);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unknown_identifier_is_a_miss() {
        let dir = temp_cache_dir("miss");
        let _ = fs::remove_dir_all(&dir);

        let mut cache = FileCache::new(dir.clone()).unwrap();
        assert!(cache.get("never-stored-lyrics").await.is_none());

        let stats = cache.get_stats();
        assert_eq!(stats.total_requests, 1);
        assert_eq!(stats.cache_hits, 0);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn put_overwrites_previous_record_for_same_identifier() {
        let dir = temp_cache_dir("overwrite");
        let _ = fs::remove_dir_all(&dir);

        let mut cache = FileCache::new(dir.clone()).unwrap();
        let mut first = sample_record();
        first.title = "First".to_string();
        let mut second = sample_record();
        second.title = "Second".to_string();

        cache.put("abc-lyrics", first).await.unwrap();
        cache.put("abc-lyrics", second.clone()).await.unwrap();

        assert_eq!(cache.get("abc-lyrics").await.unwrap(), second);
        assert_eq!(cache.get_stats().total_entries, 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn hybrid_cache_without_redis_falls_back_to_file() {
        let dir = temp_cache_dir("hybrid");
        let _ = fs::remove_dir_all(&dir);

        let mut cache = HybridCache::new(dir.clone(), None).unwrap();
        let record = sample_record();
        cache.put("abc-lyrics", record.clone()).await.unwrap();

        assert_eq!(cache.get("abc-lyrics").await.unwrap(), record);

        let _ = fs::remove_dir_all(&dir);
    }
}
