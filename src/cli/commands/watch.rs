//! Watch command: pull a series on a fixed period and report cache behaviour.

use anyhow::Result;
use pulse_config::AppConfig;
use pulse_core::types::Interval;
use pulse_metrics::derive;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::app::App;
use crate::cli::WatchArgs;

pub async fn run(args: WatchArgs, config: AppConfig) -> Result<()> {
    let app = App::from_config(config)?;
    let (asset, interval) = app.select(args.asset.as_deref(), args.interval.as_deref())?;
    let period = Duration::from_secs(args.every.max(1));

    info!(
        symbol = %asset.symbol,
        %interval,
        every_secs = period.as_secs(),
        count = args.count,
        "watching"
    );

    for tick in 1..=args.count {
        let label = format!("[{}/{}] {} {}", tick, args.count, asset.symbol, interval);
        let before = fetched_at(&app, &asset.symbol, interval).await;

        let result = if args.force {
            app.series.refresh(&asset.symbol, interval).await
        } else {
            app.series.series(&asset.symbol, interval).await
        };

        match result {
            Ok(series) => {
                let after = fetched_at(&app, &asset.symbol, interval).await;
                let origin = if before.is_some() && before == after {
                    "cache"
                } else {
                    "fetched"
                };
                match derive(&series) {
                    Ok(m) => println!(
                        "{} last={:.2} change={:+.2}% rows={} ({})",
                        label,
                        m.last_price,
                        m.change_pct,
                        series.len(),
                        origin
                    ),
                    Err(e) => println!("{}: {} ({})", label, e, origin),
                }
            }
            Err(e) => {
                warn!(error = %e, kind = e.data_error().kind(), "pull failed");
                println!("{}: {}", label, e);
            }
        }

        if tick < args.count {
            tokio::select! {
                _ = tokio::time::sleep(period) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupted");
                    break;
                }
            }
        }
    }

    Ok(())
}

async fn fetched_at(app: &App, symbol: &str, interval: Interval) -> Option<Instant> {
    app.series.cached(symbol, interval).await.map(|e| e.fetched_at)
}
