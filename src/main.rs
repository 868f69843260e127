//! Market pulse CLI application.

mod app;
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{commands, Cli, Commands};
use pulse_config::{load_config, AppConfig, ConfigError};
use pulse_monitor::{setup_logging, LogFormat};
use std::path::Path;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli.config);

    // Setup logging
    let (level, format, file) = match &config {
        Ok(c) => (
            c.logging.level.clone(),
            LogFormat::from_name(&c.logging.format),
            c.logging.file.clone(),
        ),
        Err(_) => ("info".to_string(), LogFormat::Pretty, None),
    };
    let level = cli.log_level.map(|l| l.as_str().to_string()).unwrap_or(level);
    let format = if cli.json_logs { LogFormat::Json } else { format };
    let _log_guard = setup_logging(&level, format, file.as_deref().map(Path::new));

    // Execute command
    match cli.command {
        Commands::ValidateConfig(args) => commands::validate::run(&cli.config, &args).await,
        Commands::Snapshot(args) => {
            commands::snapshot::run(args, loaded(config, &cli.config)?).await
        }
        Commands::Watch(args) => commands::watch::run(args, loaded(config, &cli.config)?).await,
        Commands::Sentiment(args) => {
            commands::sentiment::run(args, loaded(config, &cli.config)?).await
        }
        Commands::Assets => commands::assets::run(loaded(config, &cli.config)?).await,
    }
}

fn loaded(config: Result<AppConfig, ConfigError>, path: &Path) -> Result<AppConfig> {
    config.with_context(|| format!("Failed to load configuration from {}", path.display()))
}
