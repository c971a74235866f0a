use anyhow::Result;
use clap::{Args, Subcommand};
use tracing::info;

use crate::config::Config;
use crate::core::infrastructure::cache::{SongCache, SongCacheInterface};

#[derive(Args)]
pub struct CacheArgs {
    #[command(subcommand)]
    command: CacheCommands,
}

#[derive(Subcommand)]
enum CacheCommands {
    /// Show cache statistics
    Stats,

    /// Clear all cached song records
    Clear,

    /// Cleanup expired entries
    Cleanup,

    /// Show cache configuration
    Info,
}

pub async fn execute(args: CacheArgs, config: &Config) -> Result<()> {
    let mut cache = SongCache::new(config.cache_path.clone(), config.redis_url.as_deref())?;

    match args.command {
        CacheCommands::Stats => {
            let stats = cache.get_stats();

            println!("📊 Cache Statistics");
            println!("══════════════════");
            println!("🗂️  Total Entries: {}", stats.total_entries);
            println!("📈 Total Requests: {}", stats.total_requests);
            println!("✅ Cache Hits: {}", stats.cache_hits);
            println!("📊 Hit Rate: {:.1}%", stats.hit_rate_percent);

            if stats.last_cleanup > 0 {
                let now = std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .unwrap_or_else(|_| std::time::Duration::from_secs(0))
                    .as_secs();
                let seconds_ago = now.saturating_sub(stats.last_cleanup);
                println!("🧹 Last Cleanup: {} seconds ago", seconds_ago);
            }
        }

        CacheCommands::Clear => {
            info!("🗑️ Clearing cache...");
            cache.clear().await?;
            cache.save_index().await?;

            println!("✅ Cache cleared successfully!");
            println!("💡 Next fetches will rebuild the cache");
        }

        CacheCommands::Cleanup => {
            info!("🧹 Cleaning up expired cache entries...");
            let stats_before = cache.get_stats();

            cache.cleanup_old_entries().await?;
            cache.save_index().await?;

            let stats_after = cache.get_stats();
            let removed = stats_before
                .total_entries
                .saturating_sub(stats_after.total_entries);

            println!("✅ Cache cleanup completed!");
            println!("🗑️ Removed {} expired entries", removed);
            println!("📊 Cache now contains {} entries", stats_after.total_entries);
        }

        CacheCommands::Info => {
            println!("ℹ️  Cache Configuration");
            println!("═════════════════════");
            println!("📁 Cache Directory: {}", config.cache_path.display());
            println!("🔗 Redis URL: {:?}", config.redis_url);
            println!("⏰ Max Age: 7 days");
            println!("📊 Max Entries: 10,000");

            if !config.cache_path.exists() {
                println!("📝 Status: Not initialized (will be created on first use)");
            }
        }
    }

    Ok(())
}
