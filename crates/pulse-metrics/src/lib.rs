//! Display metrics derived from a price series.

mod derive;

pub use derive::{derive, DerivedMetrics, MetricsDeriver};
