//! Sentiment command.

use anyhow::{Context, Result};
use pulse_config::AppConfig;
use pulse_sentiment::SentimentEngine;

use crate::app::headline_source;
use crate::cli::{OutputFormat, SentimentArgs};

pub async fn run(args: SentimentArgs, config: AppConfig) -> Result<()> {
    let headlines = if args.headlines.is_empty() {
        headline_source(&config).headlines()
    } else {
        args.headlines
    };

    let engine = SentimentEngine::default();
    let summary = engine
        .score(&headlines)
        .context("Failed to score headlines")?;

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Text => {
            println!("Market sentiment: {} ({}/100)", summary.label, summary.score);
            println!("Mean polarity: {:+.3} ({})", summary.mean_polarity, engine.analyzer_name());
            println!();
            for sample in &summary.samples {
                println!("{:+.3}  {}", sample.polarity, sample.text);
            }
        }
    }

    Ok(())
}
