//! Registry for managing chain adapters.
//!
//! The `ChainRegistry` provides a centralized place to register and retrieve
//! connected adapters by chain id, so a service talking to several chains can
//! build every adapter once at startup and hand them out as shared handles.
//!
//! # Thread Safety
//!
//! The registry itself is not thread-safe. If you need to share it across
//! threads, wrap it in an appropriate synchronization primitive (e.g., `Arc<Mutex<_>>`).
//! The adapters stored in the registry are already wrapped in `Arc` for safe sharing.

use crate::factory::AdapterFactory;
use ethrpc_config::AdapterConfig;
use ethrpc_types::{AdapterError, ChainAdapter, ChainId, Result};
use std::{collections::HashMap, fmt, sync::Arc};
use tracing::{debug, info};

/// Registry for managing connected chain adapters.
///
/// Each adapter is stored as an `Arc<dyn ChainAdapter>` so that callers can
/// hold on to it independently of the registry.
pub struct ChainRegistry {
	adapters: HashMap<ChainId, Arc<dyn ChainAdapter>>,
}

impl ChainRegistry {
	/// Creates a new empty registry.
	pub fn new() -> Self {
		Self {
			adapters: HashMap::new(),
		}
	}

	/// Registers the adapter for `chain_id`.
	///
	/// # Errors
	///
	/// Returns `AdapterError::AlreadyRegistered` if an adapter for the same
	/// chain ID is already registered.
	pub fn register(&mut self, chain_id: ChainId, adapter: Arc<dyn ChainAdapter>) -> Result<()> {
		info!("Registering chain adapter for chain {}", chain_id);

		if self.adapters.contains_key(&chain_id) {
			return Err(AdapterError::AlreadyRegistered(chain_id));
		}

		self.adapters.insert(chain_id, adapter);
		Ok(())
	}

	/// Retrieves the adapter for a specific chain, if registered.
	pub fn get(&self, chain_id: &ChainId) -> Option<Arc<dyn ChainAdapter>> {
		self.adapters.get(chain_id).cloned()
	}

	/// Retrieves an adapter for a specific chain, returning an error if not found.
	///
	/// # Errors
	///
	/// Returns `AdapterError::UnsupportedChain` if the chain is not registered.
	pub fn get_required(&self, chain_id: &ChainId) -> Result<Arc<dyn ChainAdapter>> {
		self.get(chain_id)
			.ok_or(AdapterError::UnsupportedChain(*chain_id))
	}

	/// Returns all registered chain IDs in ascending order.
	pub fn chains(&self) -> Vec<ChainId> {
		let mut chains: Vec<_> = self.adapters.keys().copied().collect();
		chains.sort();
		chains
	}

	pub fn len(&self) -> usize {
		self.adapters.len()
	}

	pub fn is_empty(&self) -> bool {
		self.adapters.is_empty()
	}

	/// Connects to every chain in `config` with the default adapter set.
	///
	/// The factory honours the config's unknown-chain policy and chain ID
	/// verification flag.
	///
	/// # Errors
	///
	/// Returns an error if:
	/// - A configured chain has no adapter and the policy rejects it
	/// - Any adapter fails to connect to its RPC endpoint
	/// - The connected chain ID doesn't match the configured one
	pub async fn from_config(config: &AdapterConfig) -> Result<Self> {
		let factory = AdapterFactory::with_defaults()
			.with_unknown_chain_policy(config.unknown_chain)
			.with_chain_id_verification(config.verify_chain_id);

		Self::from_config_with_factory(config, &factory).await
	}

	/// Connects to every chain in `config` through `factory`.
	///
	/// Chains are connected one at a time in ascending chain ID order and the
	/// first failure aborts the whole build.
	pub async fn from_config_with_factory(
		config: &AdapterConfig,
		factory: &AdapterFactory,
	) -> Result<Self> {
		let mut registry = Self::new();
		let mut chains: Vec<_> = config.chains.iter().collect();
		chains.sort_by_key(|(chain_id, _)| **chain_id);

		for (&chain_id, chain) in chains {
			debug!(
				"Connecting to chain {} ({}) at {}",
				chain_id, chain.name, chain.rpc_url
			);

			let adapter = factory.new_adapter(chain_id, &chain.rpc_url).await?;
			registry.register(chain_id, adapter)?;
		}

		info!("Chain registry ready with {} chains", registry.len());
		Ok(registry)
	}
}

impl Default for ChainRegistry {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for ChainRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChainRegistry")
			.field("adapters", &self.chains())
			.finish()
	}
}
