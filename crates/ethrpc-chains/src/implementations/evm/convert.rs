//! Conversions between the neutral types and alloy's RPC types.
//!
//! Every function here is total: it maps the declared fields one to one and
//! drops whatever else the native type carries. Filter validation happens
//! before [`to_filter`] is called.

use alloy::eips::BlockNumberOrTag;
use alloy::primitives::TxKind;
use alloy::rpc::types::{
	AccessList as NativeAccessList, AccessListItem, Filter, FilterBlockOption, FilterSet,
	Header as RpcHeader, Log as RpcLog, TransactionInput, TransactionRequest,
};
use ethrpc_types::{AccessList, AccessListEntry, CallMsg, FilterQuery, Header, Log};

/// Converts a call message into an alloy transaction request.
///
/// A zero gas limit and an empty access list are left unset so the node
/// applies its own defaults.
pub fn to_transaction_request(msg: &CallMsg) -> TransactionRequest {
	TransactionRequest {
		from: msg.from,
		to: msg.to.map(TxKind::Call),
		gas: (msg.gas != 0).then_some(msg.gas),
		gas_price: msg.gas_price,
		max_fee_per_gas: msg.gas_fee_cap,
		max_priority_fee_per_gas: msg.gas_tip_cap,
		value: msg.value,
		input: if msg.data.is_empty() {
			TransactionInput::default()
		} else {
			TransactionInput::new(msg.data.clone())
		},
		access_list: to_access_list(&msg.access_list),
		..Default::default()
	}
}

/// Converts an alloy transaction request back into a call message.
pub fn from_transaction_request(request: &TransactionRequest) -> CallMsg {
	CallMsg {
		from: request.from,
		to: request.to.and_then(|kind| kind.to().copied()),
		gas: request.gas.unwrap_or_default(),
		gas_price: request.gas_price,
		gas_fee_cap: request.max_fee_per_gas,
		gas_tip_cap: request.max_priority_fee_per_gas,
		value: request.value,
		data: request.input.input().cloned().unwrap_or_default(),
		access_list: request
			.access_list
			.as_ref()
			.map(from_access_list)
			.unwrap_or_default(),
	}
}

fn to_access_list(access_list: &AccessList) -> Option<NativeAccessList> {
	if access_list.is_empty() {
		return None;
	}

	let items = access_list
		.iter()
		.map(|entry| AccessListItem {
			address: entry.address,
			storage_keys: entry.storage_keys.clone(),
		})
		.collect::<Vec<_>>();

	Some(NativeAccessList(items))
}

fn from_access_list(access_list: &NativeAccessList) -> AccessList {
	access_list
		.0
		.iter()
		.map(|item| AccessListEntry {
			address: item.address,
			storage_keys: item.storage_keys.clone(),
		})
		.collect()
}

/// Converts a filter query into an alloy log filter.
///
/// An open lower bound starts at genesis and an open upper bound ends at the
/// latest block.
pub fn to_filter(query: &FilterQuery) -> Filter {
	let block_option = match query.block_hash {
		Some(hash) => FilterBlockOption::AtBlockHash(hash),
		None => FilterBlockOption::Range {
			from_block: Some(
				query
					.from_block
					.map_or(BlockNumberOrTag::Number(0), BlockNumberOrTag::Number),
			),
			to_block: Some(
				query
					.to_block
					.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number),
			),
		},
	};

	let mut filter = Filter {
		block_option,
		address: FilterSet::from(query.addresses.clone()),
		..Default::default()
	};

	for (slot, alternatives) in filter.topics.iter_mut().zip(&query.topics) {
		*slot = FilterSet::from(alternatives.clone());
	}

	filter
}

/// Converts an alloy log, copying its topics into a new vector.
///
/// Missing positional fields (pending logs) become zero values.
pub fn from_log(log: &RpcLog) -> Log {
	Log {
		address: log.address(),
		topics: log.topics().to_vec(),
		data: log.data().data.clone(),
		block_number: log.block_number.unwrap_or_default(),
		tx_hash: log.transaction_hash.unwrap_or_default(),
		tx_index: log.transaction_index.unwrap_or_default(),
		block_hash: log.block_hash.unwrap_or_default(),
		index: log.log_index.unwrap_or_default(),
		removed: log.removed,
	}
}

pub fn from_logs(logs: &[RpcLog]) -> Vec<Log> {
	logs.iter().map(from_log).collect()
}

/// Converts an alloy header.
///
/// The hash is recomputed from the consensus header instead of trusting the
/// hash field the node reported alongside it.
pub fn from_header(header: &RpcHeader) -> Header {
	Header {
		hash: header.inner.hash_slow(),
		parent_hash: header.inner.parent_hash,
		number: header.inner.number,
		time: header.inner.timestamp,
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::consensus::Header as ConsensusHeader;
	use alloy::primitives::{Address, Bytes, LogData, B256, U256};

	fn sample_call_msg() -> CallMsg {
		CallMsg {
			from: Some(Address::repeat_byte(0x01)),
			to: Some(Address::repeat_byte(0x02)),
			gas: 100_000,
			gas_price: None,
			gas_fee_cap: Some(30_000_000_000),
			gas_tip_cap: Some(1_500_000_000),
			value: Some(U256::from(42u64)),
			data: Bytes::from(vec![0xde, 0xad, 0xbe, 0xef]),
			access_list: vec![
				AccessListEntry {
					address: Address::repeat_byte(0x0a),
					storage_keys: vec![B256::repeat_byte(3), B256::repeat_byte(1)],
				},
				AccessListEntry {
					address: Address::repeat_byte(0x0b),
					storage_keys: vec![],
				},
				AccessListEntry {
					address: Address::repeat_byte(0x09),
					storage_keys: vec![B256::repeat_byte(2)],
				},
			],
		}
	}

	#[test]
	fn test_call_msg_maps_fields_to_request() {
		let msg = sample_call_msg();
		let request = to_transaction_request(&msg);

		assert_eq!(request.from, msg.from);
		assert_eq!(request.to, Some(TxKind::Call(Address::repeat_byte(0x02))));
		assert_eq!(request.gas, Some(100_000));
		assert_eq!(request.gas_price, None);
		assert_eq!(request.max_fee_per_gas, Some(30_000_000_000));
		assert_eq!(request.max_priority_fee_per_gas, Some(1_500_000_000));
		assert_eq!(request.value, Some(U256::from(42u64)));
		assert_eq!(request.input.input(), Some(&msg.data));

		let access_list = request.access_list.expect("access list is set");
		let addresses: Vec<_> = access_list.0.iter().map(|item| item.address).collect();
		assert_eq!(
			addresses,
			vec![
				Address::repeat_byte(0x0a),
				Address::repeat_byte(0x0b),
				Address::repeat_byte(0x09)
			]
		);
		assert_eq!(
			access_list.0[0].storage_keys,
			vec![B256::repeat_byte(3), B256::repeat_byte(1)]
		);
	}

	#[test]
	fn test_call_msg_round_trip() {
		let msg = sample_call_msg();
		assert_eq!(from_transaction_request(&to_transaction_request(&msg)), msg);

		let legacy = CallMsg {
			gas_price: Some(20_000_000_000),
			gas_fee_cap: None,
			gas_tip_cap: None,
			..sample_call_msg()
		};
		assert_eq!(
			from_transaction_request(&to_transaction_request(&legacy)),
			legacy
		);
	}

	#[test]
	fn test_empty_call_msg_leaves_request_unset() {
		let msg = CallMsg::default();
		let request = to_transaction_request(&msg);

		assert!(request.to.is_none());
		assert!(request.gas.is_none());
		assert!(request.value.is_none());
		assert!(request.input.input().is_none());
		assert!(request.access_list.is_none());
		assert_eq!(from_transaction_request(&request), msg);
	}

	#[test]
	fn test_filter_with_block_hash() {
		let hash = B256::repeat_byte(0xaa);
		let filter = to_filter(&FilterQuery::new().at_block_hash(hash));

		assert_eq!(filter.block_option, FilterBlockOption::AtBlockHash(hash));
	}

	#[test]
	fn test_filter_open_range_defaults() {
		let filter = to_filter(&FilterQuery::new());

		assert_eq!(
			filter.block_option,
			FilterBlockOption::Range {
				from_block: Some(BlockNumberOrTag::Number(0)),
				to_block: Some(BlockNumberOrTag::Latest),
			}
		);
	}

	#[test]
	fn test_filter_range_addresses_and_topics() {
		let transfer = B256::repeat_byte(0xdd);
		let approval = B256::repeat_byte(0x8c);
		let holder = B256::repeat_byte(0x01);
		let token = Address::repeat_byte(0x77);

		let query = FilterQuery::new()
			.with_range(Some(100), Some(200))
			.with_address(token)
			.with_topic(0, vec![transfer, approval])
			.with_topic(2, vec![holder]);
		let filter = to_filter(&query);

		assert_eq!(
			filter.block_option,
			FilterBlockOption::Range {
				from_block: Some(BlockNumberOrTag::Number(100)),
				to_block: Some(BlockNumberOrTag::Number(200)),
			}
		);
		assert!(filter.address.matches(&token));
		assert!(!filter.address.matches(&Address::repeat_byte(0x78)));
		assert!(filter.topics[0].matches(&transfer));
		assert!(filter.topics[0].matches(&approval));
		assert!(!filter.topics[0].matches(&holder));
		assert!(filter.topics[1].is_empty());
		assert!(filter.topics[2].matches(&holder));
		assert!(!filter.topics[2].matches(&transfer));
		assert!(filter.topics[3].is_empty());
	}

	fn rpc_log(index: u64, topics: Vec<B256>) -> RpcLog {
		RpcLog {
			inner: alloy::primitives::Log {
				address: Address::repeat_byte(0x55),
				data: LogData::new_unchecked(topics, Bytes::from(vec![index as u8; 4])),
			},
			block_hash: Some(B256::repeat_byte(0xbb)),
			block_number: Some(1_000),
			block_timestamp: None,
			transaction_hash: Some(B256::repeat_byte(index as u8)),
			transaction_index: Some(index),
			log_index: Some(index),
			removed: index % 2 == 1,
		}
	}

	#[test]
	fn test_logs_preserve_order_and_fields() {
		let native = vec![
			rpc_log(0, vec![B256::repeat_byte(1)]),
			rpc_log(1, vec![B256::repeat_byte(2), B256::repeat_byte(3)]),
			rpc_log(2, vec![]),
		];
		let logs = from_logs(&native);

		assert_eq!(logs.len(), native.len());
		for (log, origin) in logs.iter().zip(&native) {
			assert_eq!(log.address, origin.address());
			assert_eq!(log.topics, origin.topics());
			assert_eq!(log.data, origin.data().data);
			assert_eq!(log.block_number, 1_000);
			assert_eq!(log.block_hash, B256::repeat_byte(0xbb));
			assert_eq!(Some(log.tx_hash), origin.transaction_hash);
			assert_eq!(Some(log.tx_index), origin.transaction_index);
			assert_eq!(Some(log.index), origin.log_index);
			assert_eq!(log.removed, origin.removed);
		}
	}

	#[test]
	fn test_log_topics_are_owned_copies() {
		let native = vec![rpc_log(0, vec![B256::repeat_byte(1), B256::repeat_byte(2)])];
		let mut logs = from_logs(&native);

		logs[0].topics[0] = B256::ZERO;
		logs[0].topics.push(B256::repeat_byte(9));

		assert_eq!(
			native[0].topics(),
			&[B256::repeat_byte(1), B256::repeat_byte(2)]
		);
	}

	#[test]
	fn test_pending_log_defaults_to_zero_values() {
		let native = RpcLog {
			removed: false,
			..rpc_log(0, vec![])
		};
		let pending = RpcLog {
			block_hash: None,
			block_number: None,
			transaction_hash: None,
			transaction_index: None,
			log_index: None,
			..native
		};
		let log = from_log(&pending);

		assert_eq!(log.block_number, 0);
		assert_eq!(log.block_hash, B256::ZERO);
		assert_eq!(log.tx_hash, B256::ZERO);
		assert_eq!(log.index, 0);
	}

	#[test]
	fn test_header_hash_is_recomputed() {
		let inner = ConsensusHeader {
			parent_hash: B256::repeat_byte(0x11),
			number: 19_000_000,
			timestamp: 1_705_000_000,
			gas_limit: 30_000_000,
			..Default::default()
		};
		let stale = B256::repeat_byte(0xee);
		let native = RpcHeader {
			hash: stale,
			inner: inner.clone(),
			total_difficulty: None,
			size: None,
		};

		let header = from_header(&native);

		assert_eq!(header.hash, inner.hash_slow());
		assert_ne!(header.hash, stale);
		assert_eq!(header.parent_hash, B256::repeat_byte(0x11));
		assert_eq!(header.number, 19_000_000);
		assert_eq!(header.time, 1_705_000_000);
	}

	#[test]
	fn test_header_hash_tracks_content() {
		let first = RpcHeader::new(ConsensusHeader {
			number: 1,
			..Default::default()
		});
		let mut second = first.clone();
		second.inner.number = 2;

		assert_ne!(from_header(&first).hash, from_header(&second).hash);
		assert_eq!(from_header(&second).hash, second.inner.hash_slow());
	}
}
