//! Configuration management.

mod settings;

pub use settings::{
    AppConfig, AppSettings, AssetSettings, CacheSettings, IntervalSettings, LoggingConfig,
    ProviderKind, ProviderSettings, SentimentSettings,
};

pub use config::ConfigError;

use config::{Config, Environment, File};
use std::path::Path;

/// Load configuration from an optional file and the environment.
///
/// A missing file yields the defaults. Environment variables use the
/// `PULSE__` prefix with `__` between levels, e.g.
/// `PULSE__CACHE__TTL_SECONDS=60`. The result is validated.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("PULSE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let app: AppConfig = config.try_deserialize()?;
    app.validate()?;
    Ok(app)
}
