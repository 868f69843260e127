//! Validate configuration command.

use anyhow::Result;
use pulse_config::{load_config, AppConfig};
use std::path::Path;

use crate::cli::ValidateArgs;

pub async fn run(config_path: &Path, args: &ValidateArgs) -> Result<()> {
    if args.print_default {
        print!("{}", AppConfig::default().to_toml()?);
        return Ok(());
    }

    println!("Validating configuration: {:?}", config_path);
    if !config_path.exists() {
        println!("File not found, checking built-in defaults and PULSE__ environment");
    }

    match load_config(config_path) {
        Ok(config) => {
            let intervals: Vec<String> =
                config.intervals.available.iter().map(|i| i.to_string()).collect();
            println!("Configuration is valid!");
            println!();
            println!("App: {}", config.app.name);
            println!("Environment: {}", config.app.environment);
            println!("Log level: {}", config.logging.level);
            println!("Provider: {:?}", config.provider.kind);
            println!("Cache TTL: {}s", config.cache.ttl_seconds);
            println!("Assets: {}", config.assets.len());
            println!("Intervals: {} (default {})", intervals.join(", "), config.intervals.default);
        }
        Err(e) => {
            println!("Configuration error: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
