//! Chain identifiers and the capability trait every chain adapter implements.

use crate::{
	call::CallMsg,
	common::{BlockHash, BlockNumber, Bytes},
	errors::Result,
	filter::FilterQuery,
	header::Header,
	log::Log,
	subscription::Subscription,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Chain identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub u64);

impl ChainId {
	pub const ETHEREUM: Self = Self(1);
	pub const OPTIMISM: Self = Self(10);
	pub const POLYGON: Self = Self(137);
	pub const BASE: Self = Self(8453);
	pub const ARBITRUM: Self = Self(42161);
	pub const SEPOLIA: Self = Self(11155111);

	/// Every chain id with a named constant.
	pub const KNOWN: [Self; 6] = [
		Self::ETHEREUM,
		Self::OPTIMISM,
		Self::POLYGON,
		Self::BASE,
		Self::ARBITRUM,
		Self::SEPOLIA,
	];
}

impl fmt::Display for ChainId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

impl FromStr for ChainId {
	type Err = std::num::ParseIntError;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		Ok(ChainId(s.parse()?))
	}
}

impl From<u64> for ChainId {
	fn from(id: u64) -> Self {
		ChainId(id)
	}
}

/// What a factory does with a chain id it has no constructor for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownChainPolicy {
	/// Fail with `AdapterError::UnsupportedChain`.
	#[default]
	Reject,
	/// Build the factory's fallback adapter for the unknown chain.
	Fallback,
}

impl FromStr for UnknownChainPolicy {
	type Err = String;

	fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
		match s.to_ascii_lowercase().as_str() {
			"reject" => Ok(Self::Reject),
			"fallback" => Ok(Self::Fallback),
			other => Err(format!("unknown chain policy '{}'", other)),
		}
	}
}

/// Capability set exposed over a concrete chain client.
///
/// Implementations translate the neutral types of this crate into the client's
/// native types and back. They add no retries and no local recovery: every
/// client failure is wrapped into an [`AdapterError`](crate::AdapterError) and
/// returned to the caller.
#[async_trait]
pub trait ChainAdapter: Send + Sync {
	/// Execute a read-only contract call against the state at `block_number`
	/// (`None` means the latest block).
	async fn call_contract(&self, msg: &CallMsg, block_number: Option<BlockNumber>)
		-> Result<Bytes>;

	/// Execute a read-only contract call pinned to the block with `block_hash`.
	async fn call_contract_at_hash(&self, msg: &CallMsg, block_hash: BlockHash) -> Result<Bytes>;

	/// Return all logs matching `query`, in the order the client reports them.
	async fn filter_logs(&self, query: &FilterQuery) -> Result<Vec<Log>>;

	/// Latest block height known to the client.
	async fn block_number(&self) -> Result<BlockNumber>;

	/// Header of the block with the given hash.
	async fn header_by_hash(&self, hash: BlockHash) -> Result<Header>;

	/// Header of the block with the given number (`None` means the latest block).
	async fn header_by_number(&self, number: Option<BlockNumber>) -> Result<Header>;

	/// Relay new block headers into `headers` until `cancel` fires.
	///
	/// The relay hands each header off with an awaited send, so a full
	/// `headers` channel stalls the relay; it never skips a header itself. If
	/// the stall outlasts the client's own buffer and the client discards
	/// headers, the subscription ends instead of continuing past the gap. That
	/// case and a transport-level failure of the upstream subscription are
	/// reported once on [`Subscription::err`].
	async fn subscribe_new_head(
		&self,
		cancel: CancellationToken,
		headers: mpsc::Sender<Header>,
	) -> Result<Subscription>;
}
