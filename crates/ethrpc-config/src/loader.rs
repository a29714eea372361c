//! Configuration loading from files and environment.

use crate::{types::*, ConfigError};
use ethrpc_types::{ChainId, UnknownChainPolicy};
use std::path::Path;
use tracing::{debug, info};

type Result<T> = std::result::Result<T, ConfigError>;

/// Environment variable naming a config file to load.
pub const CONFIG_PATH_VAR: &str = "ETHRPC_CONFIG";
/// Prefix of per-chain RPC URL overrides, e.g. `RPC_URL_1`.
pub const RPC_URL_PREFIX: &str = "RPC_URL_";
pub const LOG_LEVEL_VAR: &str = "ETHRPC_LOG_LEVEL";
pub const UNKNOWN_CHAIN_VAR: &str = "ETHRPC_UNKNOWN_CHAIN";

const ENDPOINT_SCHEMES: [&str; 4] = ["http://", "https://", "ws://", "wss://"];

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
	/// Load configuration from file
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<AdapterConfig> {
		let path = path.as_ref();
		info!("Loading configuration from {:?}", path);

		if !path.exists() {
			return Err(ConfigError::FileNotFound(path.display().to_string()));
		}

		let contents = std::fs::read_to_string(path)?;

		let config = match path.extension().and_then(|s| s.to_str()) {
			Some("toml") => Self::from_toml(&contents)?,
			Some("json") => Self::from_json(&contents)?,
			Some("yaml") | Some("yml") => Self::from_yaml(&contents)?,
			_ => return Err(ConfigError::UnsupportedFormat(path.display().to_string())),
		};

		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Load from TOML string
	pub fn from_toml(contents: &str) -> Result<AdapterConfig> {
		toml::from_str(contents)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse TOML: {}", e)))
	}

	/// Load from JSON string
	pub fn from_json(contents: &str) -> Result<AdapterConfig> {
		serde_json::from_str(contents)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse JSON: {}", e)))
	}

	/// Load from YAML string
	pub fn from_yaml(contents: &str) -> Result<AdapterConfig> {
		serde_yaml::from_str(contents)
			.map_err(|e| ConfigError::ParseError(format!("Failed to parse YAML: {}", e)))
	}

	/// Load from environment variables with optional file override
	pub fn from_env_and_file(file_path: Option<&Path>) -> Result<AdapterConfig> {
		// Start with default config
		let mut config = if let Some(path) = file_path {
			Self::from_file(path)?
		} else {
			AdapterConfig::default()
		};

		// Override with environment variables
		Self::apply_env_overrides(&mut config)?;

		Self::validate_config(&config)?;
		Ok(config)
	}

	/// Apply overrides from the process environment
	pub fn apply_env_overrides(config: &mut AdapterConfig) -> Result<()> {
		Self::apply_overrides(config, std::env::vars())
	}

	/// Apply overrides from `vars`.
	///
	/// `RPC_URL_<chain_id>` only replaces the URL of a chain that is already
	/// configured; it never adds a chain.
	pub fn apply_overrides<I>(config: &mut AdapterConfig, vars: I) -> Result<()>
	where
		I: IntoIterator<Item = (String, String)>,
	{
		for (key, value) in vars {
			if let Some(chain_id) = key.strip_prefix(RPC_URL_PREFIX) {
				let Ok(chain_id) = chain_id.parse::<ChainId>() else {
					continue;
				};
				if let Some(chain) = config.chains.get_mut(&chain_id) {
					debug!("Overriding RPC URL for chain {} from environment", chain_id);
					chain.rpc_url = value;
				}
			} else if key == LOG_LEVEL_VAR {
				debug!("Overriding log level from environment");
				config.logging.level = value;
			} else if key == UNKNOWN_CHAIN_VAR {
				debug!("Overriding unknown chain policy from environment");
				config.unknown_chain = value
					.parse::<UnknownChainPolicy>()
					.map_err(|e| ConfigError::ValidationError(format!("{}: {}", key, e)))?;
			}
		}

		Ok(())
	}

	/// Validate configuration
	pub fn validate_config(config: &AdapterConfig) -> Result<()> {
		for (chain_id, chain) in &config.chains {
			if !is_supported_endpoint(&chain.rpc_url) {
				return Err(ConfigError::ValidationError(format!(
					"Chain {} has unsupported RPC URL '{}': expected http(s)://, ws(s):// or an .ipc path",
					chain_id, chain.rpc_url
				)));
			}
		}

		if config.logging.level.parse::<tracing::Level>().is_err() {
			return Err(ConfigError::ValidationError(format!(
				"Invalid log level '{}'",
				config.logging.level
			)));
		}

		Ok(())
	}
}

fn is_supported_endpoint(url: &str) -> bool {
	let lower = url.to_ascii_lowercase();
	ENDPOINT_SCHEMES
		.iter()
		.any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
		|| lower.ends_with(".ipc")
}

/// Load configuration from standard locations
pub fn load_config() -> Result<AdapterConfig> {
	// Check for config file in order:
	// 1. Environment variable ETHRPC_CONFIG
	// 2. ./ethrpc.toml
	// 3. ./config/ethrpc.toml
	// 4. Default config with env overrides

	if let Ok(path) = std::env::var(CONFIG_PATH_VAR) {
		return ConfigLoader::from_env_and_file(Some(Path::new(&path)));
	}

	let paths = ["./ethrpc.toml", "./config/ethrpc.toml"];

	for path in &paths {
		if Path::new(path).exists() {
			return ConfigLoader::from_env_and_file(Some(Path::new(path)));
		}
	}

	// No config file found, use defaults with env overrides
	ConfigLoader::from_env_and_file(None)
}
