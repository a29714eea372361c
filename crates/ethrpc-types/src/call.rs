//! Contract call messages.

use crate::common::{Address, Bytes, B256, U256};
use serde::{Deserialize, Serialize};

/// A storage pre-declaration for one contract.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessListEntry {
	pub address: Address,
	pub storage_keys: Vec<B256>,
}

/// Ordered list of storage pre-declarations.
pub type AccessList = Vec<AccessListEntry>;

/// Read-only contract call request.
///
/// `gas_price` and the `gas_fee_cap`/`gas_tip_cap` pair are mutually exclusive
/// by protocol convention; the adapter forwards whatever is set and leaves the
/// decision to the node.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallMsg {
	/// Sender of the call.
	pub from: Option<Address>,
	/// Contract to call.
	pub to: Option<Address>,
	/// Gas limit, 0 leaves it to the node.
	pub gas: u64,
	/// Legacy gas price in wei.
	pub gas_price: Option<u128>,
	/// EIP-1559 max fee per gas in wei.
	pub gas_fee_cap: Option<u128>,
	/// EIP-1559 max priority fee per gas in wei.
	pub gas_tip_cap: Option<u128>,
	/// Value sent along with the call.
	pub value: Option<U256>,
	/// ABI-encoded call data.
	pub data: Bytes,
	pub access_list: AccessList,
}

impl CallMsg {
	/// Call to `to` with no data.
	pub fn to(to: Address) -> Self {
		Self {
			to: Some(to),
			..Default::default()
		}
	}

	pub fn with_from(mut self, from: Address) -> Self {
		self.from = Some(from);
		self
	}

	pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
		self.data = data.into();
		self
	}

	pub fn with_access_list(mut self, access_list: AccessList) -> Self {
		self.access_list = access_list;
		self
	}
}
