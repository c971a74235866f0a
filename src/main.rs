use clap::{Parser, Subcommand};

mod cli;
mod config;
mod core;
mod error;
mod utils;

use config::Config;
use error::Result;

#[derive(Parser)]
#[command(name = "songpage")]
#[command(about = "Fetch, extract and render Genius song pages")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Config file path (optional)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch a song page and render it
    Fetch(cli::fetch::FetchArgs),

    /// Manage cache operations
    Cache(cli::cache::CacheArgs),

    /// Show configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::init_logging(cli.verbose).map_err(error::SongPageError::Internal)?;

    let config = Config::load(cli.config.as_deref())
        .map_err(error::SongPageError::Internal)?;

    match cli.command {
        Commands::Fetch(args) => cli::fetch::execute(args, &config)
            .await
            .map_err(error::SongPageError::Internal),
        Commands::Cache(args) => cli::cache::execute(args, &config)
            .await
            .map_err(error::SongPageError::Internal),
        Commands::Config(args) => cli::config::execute(args, &config)
            .await
            .map_err(error::SongPageError::Internal),
    }
}
