//! Genius page client and the fetch-or-serve orchestration.
//!
//! `GeniusClient` retrieves the raw page for a song identifier and maps the
//! upstream response onto the error taxonomy: an explicit 404 is a distinct
//! not-found signal, never conflated with a transport failure. The fetch side
//! sits behind [`PageFetcher`] so the orchestration is testable against stub
//! pages.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::core::document::SongDocument;
use crate::core::extract::extract;
use crate::core::infrastructure::cache::{SongCache, SongCacheInterface};
use crate::core::song::SongRecord;
use crate::error::{NetworkError, Result};

/// Appended to the identifier when building the page URL.
const PAGE_SUFFIX: &str = "-lyrics";

#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Raw page bytes for a song identifier. `NetworkError::PageNotFound`
    /// models an explicit upstream "this page does not exist".
    async fn fetch_page(&self, id: &str) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct GeniusClient {
    client: reqwest::Client,
    base_url: String,
}

impl GeniusClient {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Self {
        let version = env!("CARGO_PKG_VERSION");
        let user_agent = format!("songpage-cli v{}", version);

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .user_agent(user_agent)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Source URL for an identifier. The identifier is assumed URL-safe, so
    /// no escaping is applied.
    pub fn page_url(&self, id: &str) -> String {
        format!("{}/{}{}", self.base_url, id, PAGE_SUFFIX)
    }
}

#[async_trait]
impl PageFetcher for GeniusClient {
    async fn fetch_page(&self, id: &str) -> Result<Vec<u8>> {
        let url = self.page_url(id);
        debug!("Fetching song page: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(NetworkError::Http)?;

        let status = response.status();
        if status.is_success() {
            let body = response.bytes().await.map_err(NetworkError::Http)?;
            return Ok(body.to_vec());
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(NetworkError::PageNotFound { id: id.to_string() }.into());
        }

        Err(NetworkError::UnexpectedStatus { status }.into())
    }
}

/// Fetch-or-serve pipeline: cache lookup, then fetch, parse, extract and
/// store on a miss.
pub struct SongPageService<F = GeniusClient> {
    fetcher: F,
    cache: Option<Arc<RwLock<SongCache>>>,
}

impl SongPageService<GeniusClient> {
    pub fn new(base_url: &str, timeout_seconds: u64) -> Self {
        Self {
            fetcher: GeniusClient::new(base_url, timeout_seconds),
            cache: None,
        }
    }

    pub fn with_cache(
        base_url: &str,
        timeout_seconds: u64,
        cache: Arc<RwLock<SongCache>>,
    ) -> Self {
        Self {
            fetcher: GeniusClient::new(base_url, timeout_seconds),
            cache: Some(cache),
        }
    }
}

impl<F: PageFetcher> SongPageService<F> {
    pub fn from_fetcher(fetcher: F) -> Self {
        Self {
            fetcher,
            cache: None,
        }
    }

    pub fn from_fetcher_with_cache(fetcher: F, cache: Arc<RwLock<SongCache>>) -> Self {
        Self {
            fetcher,
            cache: Some(cache),
        }
    }

    /// Cache hit returns the stored record as-is; on a miss the page is
    /// fetched, parsed and extracted, and the complete record is stored
    /// exactly once before being returned. A cache store failure is logged
    /// and never fails the request; fetch and parse errors are terminal.
    pub async fn song_for(&self, id: &str) -> Result<SongRecord> {
        if let Some(cache) = &self.cache {
            // Scope the lock; get() needs write access for stats updates
            let cached = {
                let mut cache_guard = cache.write().await;
                cache_guard.get(id).await
            };

            if let Some(record) = cached {
                debug!("Serving song from cache: {}", id);
                return Ok(record);
            }
        }

        let body = self.fetcher.fetch_page(id).await?;

        // The parse tree is not Send; keep it scoped between awaits
        let record = {
            let doc = SongDocument::parse(&body)?;
            extract(&doc)
        };

        if let Some(cache) = &self.cache {
            let mut cache_guard = cache.write().await;
            if let Err(e) = cache_guard.put(id, record.clone()).await {
                warn!("Failed to cache song {}: {}", id, e);
            }
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::song::About;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct StubFetcher {
        body: Option<&'static str>,
        calls: AtomicUsize,
    }

    impl StubFetcher {
        fn returning(body: &'static str) -> Self {
            Self {
                body: Some(body),
                calls: AtomicUsize::new(0),
            }
        }

        fn not_found() -> Self {
            Self {
                body: None,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl PageFetcher for StubFetcher {
        async fn fetch_page(&self, id: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.body {
                Some(body) => Ok(body.as_bytes().to_vec()),
                None => Err(NetworkError::PageNotFound { id: id.to_string() }.into()),
            }
        }
    }

    fn temp_cache(tag: &str) -> (Arc<RwLock<SongCache>>, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!(
            "songpage-service-test-{}-{}",
            tag,
            std::process::id()
        ));
        let _ = std::fs::remove_dir_all(&dir);
        let cache = SongCache::new(dir.clone(), None).unwrap();
        (Arc::new(RwLock::new(cache)), dir)
    }

    const MINIMAL_PAGE: &str = "<html><body>\
        <a class=\"HeaderArtist\">Test Artist</a>\
        <div data-lyrics-container=\"true\"><p>La la</p></div>\
        <div class=\"SongDescription__Content\">ten chars!</div>\
        </body></html>";

    #[test]
    fn page_url_appends_the_lyrics_suffix() {
        let client = GeniusClient::new("https://genius.com/", 10);
        assert_eq!(client.page_url("abc"), "https://genius.com/abc-lyrics");
    }

    #[tokio::test]
    async fn miss_fetches_extracts_and_stores() {
        let (cache, dir) = temp_cache("miss");
        let service =
            SongPageService::from_fetcher_with_cache(StubFetcher::returning(MINIMAL_PAGE), cache.clone());

        let record = service.song_for("abc-lyrics").await.unwrap();

        assert_eq!(record.artist, "Test Artist");
        assert_eq!(record.title, "");
        assert_eq!(record.lyrics, "<p>La la</p>");
        assert_eq!(record.image, "");
        assert!(record.credits.is_empty());
        assert_eq!(
            record.about,
            About {
                full: "ten chars!".to_string(),
                short: String::new(),
            }
        );

        let stats = cache.read().await.get_stats();
        assert_eq!(stats.total_entries, 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn repeat_request_is_served_from_cache() {
        let (cache, dir) = temp_cache("hit");
        let fetcher = StubFetcher::returning(MINIMAL_PAGE);
        let service = SongPageService::from_fetcher_with_cache(fetcher, cache.clone());

        let first = service.song_for("abc-lyrics").await.unwrap();
        let second = service.song_for("abc-lyrics").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(service.fetcher.calls.load(Ordering::SeqCst), 1);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn not_found_is_terminal_and_stores_nothing() {
        let (cache, dir) = temp_cache("notfound");
        let service =
            SongPageService::from_fetcher_with_cache(StubFetcher::not_found(), cache.clone());

        let err = service.song_for("missing-lyrics").await.unwrap_err();
        assert!(err.is_not_found());

        let stats = cache.read().await.get_stats();
        assert_eq!(stats.total_entries, 0);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn unparseable_body_is_terminal() {
        struct BadBytes;

        #[async_trait]
        impl PageFetcher for BadBytes {
            async fn fetch_page(&self, _id: &str) -> Result<Vec<u8>> {
                Ok(vec![0xff, 0xfe, 0x00])
            }
        }

        let service = SongPageService::from_fetcher(BadBytes);
        let err = service.song_for("abc-lyrics").await.unwrap_err();
        assert!(matches!(err, crate::error::SongPageError::Document(_)));
    }

    #[tokio::test]
    async fn no_cache_always_fetches() {
        let service = SongPageService::from_fetcher(StubFetcher::returning(MINIMAL_PAGE));

        service.song_for("abc-lyrics").await.unwrap();
        service.song_for("abc-lyrics").await.unwrap();

        assert_eq!(service.fetcher.calls.load(Ordering::SeqCst), 2);
    }
}
