use anyhow::Result;
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::config::Config;
use crate::core::infrastructure::cache::SongCacheInterface;
use crate::core::infrastructure::templates::{TemplateEngine, PAGE_TEMPLATE, TEXT_TEMPLATE};
use crate::core::services::genius::SongPageService;

#[derive(Args)]
pub struct FetchArgs {
    /// Song identifier, e.g. "kendrick-lamar-humble"
    #[arg(value_name = "SONG_ID")]
    id: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Write output to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Bypass the cache for this request
    #[arg(long)]
    no_cache: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Html,
    Text,
    Json,
}

pub async fn execute(args: FetchArgs, config: &Config) -> Result<()> {
    let cache = if args.no_cache {
        None
    } else {
        Some(Arc::new(RwLock::new(config.create_cache()?)))
    };

    let service = match &cache {
        Some(cache) => SongPageService::from_fetcher_with_cache(
            config.create_genius_client(),
            cache.clone(),
        ),
        None => SongPageService::from_fetcher(config.create_genius_client()),
    };

    info!("🎵 Fetching song page: {}", args.id);

    let record = match service.song_for(&args.id).await {
        Ok(record) => record,
        Err(e) if e.is_not_found() => {
            anyhow::bail!("Song page not found: {}", args.id);
        }
        Err(e) => return Err(e.into()),
    };

    // Persist the file cache index so repeat invocations get the hit
    if let Some(cache) = &cache {
        if let Err(e) = cache.read().await.save_index().await {
            warn!("Failed to persist cache index: {}", e);
        }
    }

    let rendered = match args.format {
        OutputFormat::Html => TemplateEngine::new()?.render(PAGE_TEMPLATE, &record)?,
        OutputFormat::Text => TemplateEngine::new()?.render(TEXT_TEMPLATE, &record)?,
        OutputFormat::Json => serde_json::to_string_pretty(&record)?,
    };

    match args.output {
        Some(path) => {
            std::fs::write(&path, rendered)?;
            println!("✅ Wrote {} - {} to {}", record.artist, record.title, path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
