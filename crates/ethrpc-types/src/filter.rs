//! Log filter queries.

use crate::{
	common::{Address, BlockHash, BlockNumber, B256},
	errors::{AdapterError, Result},
};
use serde::{Deserialize, Serialize};

/// Maximum number of topic positions an EVM log can carry.
pub const MAX_TOPIC_POSITIONS: usize = 4;

/// Log filter.
///
/// Selects either a single block by hash or a closed block range. A `None`
/// range endpoint is open-ended: the lower bound defaults to genesis and the
/// upper bound to the latest block. `topics` is positional; each position
/// matches any hash in its set, and an empty set matches anything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterQuery {
	pub block_hash: Option<BlockHash>,
	pub from_block: Option<BlockNumber>,
	pub to_block: Option<BlockNumber>,
	pub addresses: Vec<Address>,
	pub topics: Vec<Vec<B256>>,
}

impl FilterQuery {
	pub fn new() -> Self {
		Self::default()
	}

	/// Restrict the query to the block with `hash`.
	pub fn at_block_hash(mut self, hash: BlockHash) -> Self {
		self.block_hash = Some(hash);
		self
	}

	/// Restrict the query to blocks `from..=to`.
	pub fn with_range(mut self, from: Option<BlockNumber>, to: Option<BlockNumber>) -> Self {
		self.from_block = from;
		self.to_block = to;
		self
	}

	pub fn with_address(mut self, address: Address) -> Self {
		self.addresses.push(address);
		self
	}

	/// Set the alternatives accepted at topic `position`, padding earlier
	/// positions with wildcards.
	pub fn with_topic(mut self, position: usize, alternatives: Vec<B256>) -> Self {
		if self.topics.len() <= position {
			self.topics.resize(position + 1, Vec::new());
		}
		self.topics[position] = alternatives;
		self
	}

	/// Whether any range endpoint is set.
	pub fn has_range(&self) -> bool {
		self.from_block.is_some() || self.to_block.is_some()
	}

	/// Check the query can be expressed to an EVM node.
	///
	/// # Errors
	///
	/// Returns `AdapterError::InvalidFilter` if both a block hash and a range
	/// endpoint are set, if the range is inverted, or if more than
	/// [`MAX_TOPIC_POSITIONS`] topic positions are given.
	pub fn validate(&self) -> Result<()> {
		if self.block_hash.is_some() && self.has_range() {
			return Err(AdapterError::InvalidFilter(
				"block hash and block range are mutually exclusive".to_string(),
			));
		}

		if let (Some(from), Some(to)) = (self.from_block, self.to_block) {
			if from > to {
				return Err(AdapterError::InvalidFilter(format!(
					"from block {} is after to block {}",
					from, to
				)));
			}
		}

		if self.topics.len() > MAX_TOPIC_POSITIONS {
			return Err(AdapterError::InvalidFilter(format!(
				"{} topic positions given, at most {} supported",
				self.topics.len(),
				MAX_TOPIC_POSITIONS
			)));
		}

		Ok(())
	}
}
