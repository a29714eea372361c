//! Event logs.

use crate::common::{Address, BlockHash, BlockNumber, Bytes, TxHash, B256};
use serde::{Deserialize, Serialize};

/// Event log emitted by a contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Log {
	/// Emitting contract.
	pub address: Address,
	/// Indexed topics, in emission order.
	pub topics: Vec<B256>,
	pub data: Bytes,
	pub block_number: BlockNumber,
	pub tx_hash: TxHash,
	pub tx_index: u64,
	pub block_hash: BlockHash,
	/// Position of the log within its block.
	pub index: u64,
	/// Set when a chain reorganization invalidated the log after it was first
	/// reported.
	pub removed: bool,
}
