//! Adapter factory keyed by chain id.
//!
//! The factory owns a map from chain id to an async constructor. Supporting a
//! new chain means registering a constructor for it; the dispatch code never
//! changes. Chains without a constructor are handled by the factory's
//! [`UnknownChainPolicy`].

use crate::implementations::evm::AlloyAdapter;
use ethrpc_types::{AdapterError, ChainAdapter, ChainId, Result, UnknownChainPolicy};
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

static DEFAULT_FACTORY: OnceLock<AdapterFactory> = OnceLock::new();

/// Get the process-wide default factory.
///
/// Unless [`init_default_factory`] ran first, this is
/// [`AdapterFactory::with_defaults`].
pub fn default_factory() -> &'static AdapterFactory {
	DEFAULT_FACTORY.get_or_init(AdapterFactory::with_defaults)
}

/// Install a custom default factory. Has no effect once the default factory
/// has been used or installed.
pub fn init_default_factory(factory: AdapterFactory) {
	if DEFAULT_FACTORY.set(factory).is_err() {
		warn!("Default adapter factory already initialized, ignoring replacement");
	}
}

/// Build a connected adapter for `chain_id` at `url` through the default factory.
pub async fn new_adapter(chain_id: ChainId, url: &str) -> Result<Arc<dyn ChainAdapter>> {
	default_factory().new_adapter(chain_id, url).await
}

/// Everything a constructor needs to open a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectParams {
	pub chain_id: ChainId,
	pub url: String,
	pub verify_chain_id: bool,
}

/// Shared async constructor for one family of adapters.
pub type AdapterConstructor =
	Arc<dyn Fn(ConnectParams) -> BoxFuture<'static, Result<Arc<dyn ChainAdapter>>> + Send + Sync>;

/// Wrap an async closure into an [`AdapterConstructor`].
pub fn adapter_constructor<F, Fut>(constructor: F) -> AdapterConstructor
where
	F: Fn(ConnectParams) -> Fut + Send + Sync + 'static,
	Fut: Future<Output = Result<Arc<dyn ChainAdapter>>> + Send + 'static,
{
	Arc::new(move |params| constructor(params).boxed())
}

/// Constructor for the alloy-backed EVM adapter.
pub fn evm_constructor() -> AdapterConstructor {
	adapter_constructor(|params: ConnectParams| async move {
		let adapter = AlloyAdapter::builder(params.chain_id, &params.url)
			.verify_chain_id(params.verify_chain_id)
			.connect()
			.await?;
		Ok(Arc::new(adapter) as Arc<dyn ChainAdapter>)
	})
}

/// Registry of adapter constructors.
pub struct AdapterFactory {
	constructors: HashMap<ChainId, AdapterConstructor>,
	fallback: Option<AdapterConstructor>,
	unknown_chain: UnknownChainPolicy,
	verify_chain_id: bool,
}

impl AdapterFactory {
	/// Creates an empty factory that rejects every chain.
	pub fn new() -> Self {
		Self {
			constructors: HashMap::new(),
			fallback: None,
			unknown_chain: UnknownChainPolicy::Reject,
			verify_chain_id: false,
		}
	}

	/// Creates a factory with the EVM adapter registered for every known chain.
	///
	/// The EVM constructor is also set as the fallback, so switching the
	/// policy to [`UnknownChainPolicy::Fallback`] treats any chain as EVM.
	pub fn with_defaults() -> Self {
		let evm = evm_constructor();
		let mut factory = Self::new().with_fallback(evm.clone());

		for chain_id in ChainId::KNOWN {
			factory.register(chain_id, evm.clone());
		}

		factory
	}

	/// Register the constructor for `chain_id`, replacing any previous one.
	pub fn register(&mut self, chain_id: ChainId, constructor: AdapterConstructor) {
		debug!("Registering adapter constructor for chain {}", chain_id);
		self.constructors.insert(chain_id, constructor);
	}

	/// Set the constructor used for unknown chains under the fallback policy.
	pub fn with_fallback(mut self, constructor: AdapterConstructor) -> Self {
		self.fallback = Some(constructor);
		self
	}

	pub fn with_unknown_chain_policy(mut self, policy: UnknownChainPolicy) -> Self {
		self.unknown_chain = policy;
		self
	}

	/// Check `eth_chainId` against the requested chain after connecting.
	pub fn with_chain_id_verification(mut self, verify: bool) -> Self {
		self.verify_chain_id = verify;
		self
	}

	/// Chains with a registered constructor, in ascending order.
	pub fn supported_chains(&self) -> Vec<ChainId> {
		let mut chains: Vec<_> = self.constructors.keys().copied().collect();
		chains.sort();
		chains
	}

	pub fn supports(&self, chain_id: ChainId) -> bool {
		self.constructors.contains_key(&chain_id)
	}

	pub fn unknown_chain_policy(&self) -> UnknownChainPolicy {
		self.unknown_chain
	}

	fn constructor_for(&self, chain_id: ChainId) -> Result<&AdapterConstructor> {
		if let Some(constructor) = self.constructors.get(&chain_id) {
			return Ok(constructor);
		}

		match (self.unknown_chain, &self.fallback) {
			(UnknownChainPolicy::Fallback, Some(fallback)) => {
				warn!(
					"No adapter registered for chain {}, using fallback constructor",
					chain_id
				);
				Ok(fallback)
			}
			_ => Err(AdapterError::UnsupportedChain(chain_id)),
		}
	}

	/// Build a connected adapter for `chain_id` at `url`.
	///
	/// # Errors
	///
	/// Returns `AdapterError::UnsupportedChain` if no constructor applies to
	/// `chain_id`, and `AdapterError::Connection` if the connection cannot be
	/// established. Failures are not retried.
	pub async fn new_adapter(&self, chain_id: ChainId, url: &str) -> Result<Arc<dyn ChainAdapter>> {
		let constructor = self.constructor_for(chain_id)?;

		info!("Creating adapter for chain {}", chain_id);
		constructor(ConnectParams {
			chain_id,
			url: url.to_string(),
			verify_chain_id: self.verify_chain_id,
		})
		.await
	}
}

impl Default for AdapterFactory {
	fn default() -> Self {
		Self::new()
	}
}

impl fmt::Debug for AdapterFactory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AdapterFactory")
			.field("chains", &self.supported_chains())
			.field("has_fallback", &self.fallback.is_some())
			.field("unknown_chain", &self.unknown_chain)
			.field("verify_chain_id", &self.verify_chain_id)
			.finish()
	}
}
