//! CLI command implementations.

pub mod assets;
pub mod sentiment;
pub mod snapshot;
pub mod validate;
pub mod watch;
