use anyhow::Result;
use clap::{Args, Subcommand};

use crate::config::Config as AppConfig;

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Show configuration file path
    Path,
}

pub async fn execute(args: ConfigArgs, config: &AppConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show => {
            println!("🔧 Current configuration:");
            println!("  🌐 genius_instance: {}", config.genius_instance);
            println!("  📁 cache_path: {}", config.cache_path.display());
            println!("  🔗 redis_url: {:?}", config.redis_url);
            println!("  ⏱️  request_timeout_seconds: {}", config.request_timeout_seconds);
        }

        ConfigCommands::Path => {
            println!("{}", AppConfig::config_path()?.display());
        }
    }

    Ok(())
}
