//! Configuration types for ethrpc adapters.

use crate::serde_helpers::{deserialize_chain_id_map, serialize_chain_id_map};
use ethrpc_types::{ChainId, UnknownChainPolicy};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Complete adapter configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct AdapterConfig {
	/// What to do with chains that have no registered adapter
	#[serde(default)]
	pub unknown_chain: UnknownChainPolicy,
	/// Check `eth_chainId` after connecting to each endpoint
	#[serde(default)]
	pub verify_chain_id: bool,
	/// Endpoints by chain id
	#[serde(
		default,
		deserialize_with = "deserialize_chain_id_map",
		serialize_with = "serialize_chain_id_map"
	)]
	pub chains: HashMap<ChainId, ChainEndpoint>,
	#[serde(default)]
	pub logging: LoggingConfig,
}

impl AdapterConfig {
	/// RPC URL configured for `chain_id`.
	pub fn rpc_url(&self, chain_id: ChainId) -> Option<&str> {
		self.chains.get(&chain_id).map(|chain| chain.rpc_url.as_str())
	}
}

/// Chain-specific endpoint
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChainEndpoint {
	/// Chain name for logging
	#[serde(default)]
	pub name: String,
	/// `http(s)://` or `ws(s)://` URL, or a path to an IPC socket
	pub rpc_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LoggingConfig {
	#[serde(default = "default_log_level")]
	pub level: String,
	/// Emit JSON lines instead of human-readable output
	#[serde(default)]
	pub json: bool,
}

impl Default for LoggingConfig {
	fn default() -> Self {
		Self {
			level: default_log_level(),
			json: false,
		}
	}
}

fn default_log_level() -> String {
	"info".to_string()
}
