//! Snapshot command: one series, its metrics and its latest rows.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use pulse_config::AppConfig;
use pulse_core::types::{Asset, Bar, Interval};
use pulse_metrics::{derive, DerivedMetrics};
use serde::Serialize;
use tracing::info;

use crate::app::App;
use crate::cli::{OutputFormat, SnapshotArgs};

#[derive(Serialize)]
struct SnapshotReport<'a> {
    asset: &'a Asset,
    interval: Interval,
    source: &'a str,
    fetched_at: Option<DateTime<Utc>>,
    rows: usize,
    metrics: DerivedMetrics,
    recent: &'a [Bar],
}

pub async fn run(args: SnapshotArgs, config: AppConfig) -> Result<()> {
    let app = App::from_config(config)?;
    let (asset, interval) = app.select(args.asset.as_deref(), args.interval.as_deref())?;

    info!(asset = %asset.name, symbol = %asset.symbol, %interval, "loading snapshot");

    let series = app
        .series
        .series(&asset.symbol, interval)
        .await
        .with_context(|| {
            format!(
                "Failed to load {} ({}) at {}",
                asset.name, asset.symbol, interval
            )
        })?;
    let metrics = derive(&series).context("Failed to derive metrics")?;
    let fetched_at = app
        .series
        .cached(&asset.symbol, interval)
        .await
        .map(|entry| entry.fetched_at_utc);

    let report = SnapshotReport {
        asset: &asset,
        interval,
        source: app.series.source_name(),
        fetched_at,
        rows: series.len(),
        metrics,
        recent: series.tail(args.rows),
    };

    match args.output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => print_text(&report),
    }

    Ok(())
}

fn print_text(report: &SnapshotReport<'_>) {
    let m = &report.metrics;

    println!(
        "{} ({}) @ {} via {}",
        report.asset.name, report.asset.symbol, report.interval, report.source
    );
    if let Some(at) = report.fetched_at {
        println!("Fetched: {}", at.to_rfc3339());
    }
    println!();
    println!("Last price:  {:.2}", m.last_price);
    println!("Change:      {:+.2}%", m.change_pct);
    println!("High:        {:.2}", m.high);
    println!("Low:         {:.2}", m.low);
    println!("Volume:      {:.0}", m.volume);
    println!(
        "Window:      {} rows from {} to {}",
        m.window_rows,
        format_ts(m.window_start),
        format_ts(m.as_of)
    );
    println!();
    println!(
        "{:<25} {:>12} {:>12} {:>12} {:>12} {:>16}",
        "TIME", "OPEN", "HIGH", "LOW", "CLOSE", "VOLUME"
    );
    for bar in report.recent {
        println!(
            "{:<25} {:>12.2} {:>12.2} {:>12.2} {:>12.2} {:>16.0}",
            format_ts(bar.timestamp),
            bar.open,
            bar.high,
            bar.low,
            bar.close,
            bar.volume
        );
    }
}

fn format_ts(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| millis.to_string())
}
