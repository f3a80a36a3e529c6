//! Parsing and validation of `spicetb.toml` testbench configuration files.
//!
//! This crate reads the testbench configuration and produces a strongly-typed
//! [`BenchConfig`] carrying the supply and digitization threshold, the
//! debounce band shared by all debounce watches, and report options.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE_NAME};
pub use types::*;
