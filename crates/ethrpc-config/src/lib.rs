//! Configuration for ethrpc adapters.
//!
//! A config file names the chains to connect to, the endpoint for each, the
//! factory's unknown-chain policy and the logging setup. Files can be TOML,
//! JSON or YAML; a few settings can be overridden from the environment.

pub mod loader;
pub mod serde_helpers;
pub mod types;

use thiserror::Error;

pub use loader::{load_config, ConfigLoader};
pub use types::{AdapterConfig, ChainEndpoint, LoggingConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
	#[error("File not found: {0}")]
	FileNotFound(String),

	#[error("Parse error: {0}")]
	ParseError(String),

	#[error("Validation error: {0}")]
	ValidationError(String),

	#[error("Unsupported config format: {0}")]
	UnsupportedFormat(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),
}
