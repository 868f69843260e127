//! CLI definitions.

pub mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pulse")]
#[command(author, version, about = "Cached crypto price metrics and headline sentiment")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml", env = "PULSE_CONFIG")]
    pub config: PathBuf,

    /// Log level (overrides the configured level)
    #[arg(short, long)]
    pub log_level: Option<LogLevel>,

    /// Enable JSON log format
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

#[derive(Clone, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch (or reuse) a series and show its metrics
    Snapshot(SnapshotArgs),
    /// Pull a series repeatedly and report cache hits
    Watch(WatchArgs),
    /// Score headline sentiment
    Sentiment(SentimentArgs),
    /// List configured assets and intervals
    Assets,
    /// Validate configuration
    ValidateConfig(ValidateArgs),
}

#[derive(clap::Args)]
pub struct SnapshotArgs {
    /// Asset name or symbol (defaults to the first configured asset)
    #[arg(short, long)]
    pub asset: Option<String>,

    /// Interval: 1m, 5m, 1h, 1d (defaults to the configured default)
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Number of recent rows to show
    #[arg(long, default_value = "10")]
    pub rows: usize,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct WatchArgs {
    /// Asset name or symbol (defaults to the first configured asset)
    #[arg(short, long)]
    pub asset: Option<String>,

    /// Interval: 1m, 5m, 1h, 1d (defaults to the configured default)
    #[arg(short, long)]
    pub interval: Option<String>,

    /// Seconds between pulls
    #[arg(long, default_value = "60")]
    pub every: u64,

    /// Number of pulls
    #[arg(long, default_value = "5")]
    pub count: u32,

    /// Invalidate the cached series before every pull
    #[arg(long)]
    pub force: bool,
}

#[derive(clap::Args)]
pub struct SentimentArgs {
    /// Headline to score (repeatable). Defaults to the configured headlines.
    #[arg(long = "headline")]
    pub headlines: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub output: OutputFormat,
}

#[derive(clap::Args)]
pub struct ValidateArgs {
    /// Print the built-in default configuration as TOML and exit
    #[arg(long)]
    pub print_default: bool,
}
