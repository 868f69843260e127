//! List configured assets.

use anyhow::Result;
use pulse_config::AppConfig;

pub async fn run(config: AppConfig) -> Result<()> {
    println!("{:<16} {:<12} {:<16}", "ASSET", "SYMBOL", "COINGECKO ID");
    for asset in &config.assets {
        let coin_id = asset.coin_id.as_deref().unwrap_or("-");
        println!("{:<16} {:<12} {:<16}", asset.name, asset.symbol, coin_id);
    }

    let intervals: Vec<String> =
        config.intervals.available.iter().map(|i| i.to_string()).collect();
    println!();
    println!("Intervals: {} (default {})", intervals.join(", "), config.intervals.default);
    println!("Provider: {:?}", config.provider.kind);
    Ok(())
}
