//! Alloy-based EVM chain adapter implementation.
//!
//! This module provides an adapter for interacting with EVM-compatible blockchains
//! using the alloy library. The transport is picked from the endpoint URL:
//! `http(s)://` for request/response, `ws(s)://` or an `.ipc` path for
//! connections that also support new-head subscriptions.
//!
//! The adapter converts between the neutral types of `ethrpc-types` and alloy's
//! RPC types and wraps every client failure without retrying it.

use super::convert::{from_header, from_logs, to_filter, to_transaction_request};
use crate::relay::{finish_relay, head_stream, spawn_relay, HeadReceiver};
use alloy::eips::{BlockId, BlockNumberOrTag};
use alloy::providers::{DynProvider, Provider, ProviderBuilder};
use alloy::pubsub::Subscription as NativeSubscription;
use alloy::rpc::types::Header as RpcHeader;
use alloy::transports::TransportError;
use async_trait::async_trait;
use ethrpc_types::{
	AdapterError, BlockHash, BlockNumber, Bytes, CallMsg, ChainAdapter, ChainId, FilterQuery,
	Header, Log, Result, Subscription,
};
use std::fmt;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// JSON-RPC error code for invalid method parameters.
const INVALID_PARAMS: i64 = -32602;

/// Headers the client buffers per new-head subscription before it starts
/// discarding the oldest ones.
const NEW_HEAD_BUFFER: usize = 256;

/// EVM chain adapter using the alloy library.
///
/// The provider is shared by every call made through the adapter and is safe
/// for concurrent use; the adapter adds no locking of its own.
#[derive(Clone)]
pub struct AlloyAdapter {
	chain_id: ChainId,
	provider: DynProvider,
}

/// Builder for creating AlloyAdapter instances.
pub struct AlloyAdapterBuilder {
	chain_id: ChainId,
	endpoint: String,
	verify_chain_id: bool,
}

impl AlloyAdapter {
	/// Creates a new AlloyAdapter builder.
	pub fn builder(chain_id: ChainId, endpoint: &str) -> AlloyAdapterBuilder {
		AlloyAdapterBuilder {
			chain_id,
			endpoint: endpoint.to_string(),
			verify_chain_id: false,
		}
	}

	/// Connects to `endpoint` with default settings.
	pub async fn connect(chain_id: ChainId, endpoint: &str) -> Result<Self> {
		Self::builder(chain_id, endpoint).connect().await
	}

	/// Wraps an already-built provider.
	pub fn from_provider(chain_id: ChainId, provider: DynProvider) -> Self {
		Self { chain_id, provider }
	}

	/// The chain this adapter was created for.
	pub fn chain_id(&self) -> ChainId {
		self.chain_id
	}

	async fn create_adapter(
		chain_id: ChainId,
		endpoint: &str,
		verify_chain_id: bool,
	) -> Result<Self> {
		info!(
			"Creating alloy adapter for chain {} at {} (verify_chain_id={})",
			chain_id, endpoint, verify_chain_id
		);

		let provider = ProviderBuilder::new()
			.disable_recommended_fillers()
			.connect(endpoint)
			.await
			.map_err(|e| {
				error!("Failed to connect to {}: {}", endpoint, e);
				AdapterError::Connection(format!("Failed to connect to {}: {}", endpoint, e))
			})?;
		let provider = DynProvider::new(provider);

		if verify_chain_id {
			let actual = provider.get_chain_id().await.map_err(|e| {
				AdapterError::Connection(format!("Failed to get chain ID: {}", e))
			})?;

			if actual != chain_id.0 {
				return Err(AdapterError::Connection(format!(
					"Chain ID mismatch: expected {}, got {}",
					chain_id, actual
				)));
			}
		}

		Ok(Self { chain_id, provider })
	}
}

impl AlloyAdapterBuilder {
	/// Check `eth_chainId` against the expected chain after connecting.
	pub fn verify_chain_id(mut self, verify: bool) -> Self {
		self.verify_chain_id = verify;
		self
	}

	/// Connects and builds the AlloyAdapter instance.
	pub async fn connect(self) -> Result<AlloyAdapter> {
		AlloyAdapter::create_adapter(self.chain_id, &self.endpoint, self.verify_chain_id).await
	}
}

impl fmt::Debug for AlloyAdapter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("AlloyAdapter")
			.field("chain_id", &self.chain_id)
			.field("provider", &"<Provider>")
			.finish()
	}
}

/// Whether the node answered with an error saying the block does not exist.
fn is_not_found(err: &TransportError) -> bool {
	err.as_error_resp()
		.is_some_and(|payload| payload.message.to_ascii_lowercase().contains("not found"))
}

fn is_invalid_params(err: &TransportError) -> bool {
	err.as_error_resp()
		.is_some_and(|payload| payload.code == INVALID_PARAMS)
}

#[async_trait]
impl HeadReceiver for NativeSubscription<RpcHeader> {
	type Item = RpcHeader;

	async fn recv(&mut self) -> std::result::Result<RpcHeader, RecvError> {
		NativeSubscription::recv(self).await
	}
}

#[async_trait]
impl ChainAdapter for AlloyAdapter {
	/// Executes a read-only call at `block_number`, or at the latest block.
	///
	/// # Errors
	///
	/// Returns `AdapterError::Call` if the call reverts or the RPC call fails.
	async fn call_contract(
		&self,
		msg: &CallMsg,
		block_number: Option<BlockNumber>,
	) -> Result<Bytes> {
		debug!(
			"Calling contract {:?} on chain {} at block {:?}",
			msg.to, self.chain_id, block_number
		);

		let block = block_number.map_or(BlockId::latest(), BlockId::number);

		self.provider
			.call(to_transaction_request(msg))
			.block(block)
			.await
			.map_err(|e| {
				warn!("Contract call failed on chain {}: {}", self.chain_id, e);
				AdapterError::Call(format!("Failed to call contract: {}", e))
			})
	}

	/// Executes a read-only call pinned to the block with `block_hash`.
	///
	/// # Errors
	///
	/// Returns `AdapterError::BlockNotFound` if the node does not know the
	/// hash, and `AdapterError::Call` for any other failure.
	async fn call_contract_at_hash(&self, msg: &CallMsg, block_hash: BlockHash) -> Result<Bytes> {
		debug!(
			"Calling contract {:?} on chain {} at block {}",
			msg.to, self.chain_id, block_hash
		);

		self.provider
			.call(to_transaction_request(msg))
			.block(BlockId::hash(block_hash))
			.await
			.map_err(|e| {
				warn!("Contract call failed on chain {}: {}", self.chain_id, e);
				if is_not_found(&e) {
					AdapterError::BlockNotFound(block_hash)
				} else {
					AdapterError::Call(format!("Failed to call contract: {}", e))
				}
			})
	}

	/// Retrieves logs matching `query`.
	///
	/// # Errors
	///
	/// Returns `AdapterError::InvalidFilter` if the query sets both a block
	/// hash and a range, or if the node rejects the filter parameters, and
	/// `AdapterError::Rpc` for any other failure.
	async fn filter_logs(&self, query: &FilterQuery) -> Result<Vec<Log>> {
		debug!("Filtering logs on chain {}: {:?}", self.chain_id, query);

		query.validate()?;
		let filter = to_filter(query);

		let logs = self.provider.get_logs(&filter).await.map_err(|e| {
			warn!("Log filter failed on chain {}: {}", self.chain_id, e);
			if is_invalid_params(&e) {
				AdapterError::InvalidFilter(e.to_string())
			} else {
				AdapterError::Rpc(format!("Failed to get logs: {}", e))
			}
		})?;

		debug!("Got {} logs from chain {}", logs.len(), self.chain_id);
		Ok(from_logs(&logs))
	}

	/// Retrieves the current block number from the chain.
	///
	/// # Errors
	///
	/// Returns an error if the RPC call fails or the node is unreachable.
	async fn block_number(&self) -> Result<BlockNumber> {
		debug!("Getting block number for chain {}", self.chain_id);

		self.provider
			.get_block_number()
			.await
			.map_err(|e| AdapterError::Rpc(format!("Failed to get block number: {}", e)))
	}

	async fn header_by_hash(&self, hash: BlockHash) -> Result<Header> {
		debug!("Getting header {} on chain {}", hash, self.chain_id);

		let block = self.provider.get_block_by_hash(hash).await.map_err(|e| {
			if is_not_found(&e) {
				AdapterError::HeaderNotFound(format!("hash {}", hash))
			} else {
				AdapterError::Rpc(format!("Failed to get block {}: {}", hash, e))
			}
		})?;

		block
			.map(|block| from_header(&block.header))
			.ok_or_else(|| AdapterError::HeaderNotFound(format!("hash {}", hash)))
	}

	async fn header_by_number(&self, number: Option<BlockNumber>) -> Result<Header> {
		debug!("Getting header {:?} on chain {}", number, self.chain_id);

		let tag = number.map_or(BlockNumberOrTag::Latest, BlockNumberOrTag::Number);
		let block = self.provider.get_block_by_number(tag).await.map_err(|e| {
			if is_not_found(&e) {
				AdapterError::HeaderNotFound(format!("number {}", tag))
			} else {
				AdapterError::Rpc(format!("Failed to get block {}: {}", tag, e))
			}
		})?;

		block
			.map(|block| from_header(&block.header))
			.ok_or_else(|| AdapterError::HeaderNotFound(format!("number {}", tag)))
	}

	/// Subscribes to new heads and relays them into `headers`.
	///
	/// Requires a WebSocket or IPC endpoint. The relay stops when `cancel`
	/// fires, when the returned handle is unsubscribed, when `headers` is
	/// dropped, or when the upstream subscription ends. If the caller stalls
	/// long enough for the client to discard buffered headers, the relay stops
	/// with a terminal error instead of skipping them. `eth_unsubscribe` is
	/// sent whenever the upstream subscription is still open.
	///
	/// # Errors
	///
	/// Returns `AdapterError::Subscription` if the subscription cannot be opened.
	async fn subscribe_new_head(
		&self,
		cancel: CancellationToken,
		headers: mpsc::Sender<Header>,
	) -> Result<Subscription> {
		debug!("Subscribing to new heads on chain {}", self.chain_id);

		let native = self
			.provider
			.subscribe_blocks()
			.channel_size(NEW_HEAD_BUFFER)
			.await
			.map_err(|e| {
				error!(
					"Failed to subscribe to new heads on chain {}: {}",
					self.chain_id, e
				);
				AdapterError::Subscription(format!("Failed to subscribe to new heads: {}", e))
			})?;
		let subscription_id = *native.local_id();

		let (subscription, relay) = spawn_relay(head_stream(native), from_header, headers, cancel);
		let provider = self.provider.clone();
		let chain_id = self.chain_id;

		tokio::spawn(async move {
			let exit = finish_relay(relay, move || async move {
				if let Err(e) = provider.unsubscribe(subscription_id).await {
					debug!(
						"Failed to unsubscribe {} on chain {}: {}",
						subscription_id, chain_id, e
					);
				}
			})
			.await;

			match exit {
				Ok(exit) => info!("New-head relay for chain {} stopped: {:?}", chain_id, exit),
				Err(e) => error!("New-head relay for chain {} failed: {}", chain_id, e),
			}
		});

		info!(
			"Subscribed to new heads on chain {} ({})",
			self.chain_id, subscription_id
		);
		Ok(subscription)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use alloy::consensus::Header as ConsensusHeader;
	use alloy::providers::mock::Asserter;
	use alloy::rpc::json_rpc::ErrorPayload;
	use alloy::rpc::types::Block;
	use ethrpc_types::{Address, B256};

	fn mocked_adapter() -> (AlloyAdapter, Asserter) {
		let asserter = Asserter::new();
		let provider = ProviderBuilder::new()
			.disable_recommended_fillers()
			.connect_mocked_client(asserter.clone());
		(
			AlloyAdapter::from_provider(ChainId::ETHEREUM, DynProvider::new(provider)),
			asserter,
		)
	}

	/// A block whose reported hash does not match its contents.
	fn block_with_stale_hash(number: u64) -> (Block, ConsensusHeader) {
		let inner = ConsensusHeader {
			parent_hash: B256::repeat_byte(0x11),
			number,
			timestamp: 1_705_000_000,
			gas_limit: 30_000_000,
			..Default::default()
		};
		let header = RpcHeader {
			hash: B256::repeat_byte(0xee),
			inner: inner.clone(),
			total_difficulty: None,
			size: None,
		};
		(Block::empty(header), inner)
	}

	fn error_payload(code: i64, message: &'static str) -> ErrorPayload {
		ErrorPayload {
			code,
			message: message.into(),
			data: None,
		}
	}

	#[tokio::test]
	async fn test_block_number_passthrough() {
		let (adapter, asserter) = mocked_adapter();
		asserter.push_success(&"0x1234");

		assert_eq!(adapter.block_number().await.unwrap(), 0x1234);
	}

	#[tokio::test]
	async fn test_call_contract_returns_bytes() {
		let (adapter, asserter) = mocked_adapter();
		asserter.push_success(&"0x000000000000000000000000000000000000000000000000000000000000002a");

		let msg = CallMsg::to(Address::repeat_byte(0x42)).with_data(vec![0x18, 0x16, 0x0d, 0xdd]);
		let output = adapter.call_contract(&msg, Some(100)).await.unwrap();

		assert_eq!(output.len(), 32);
		assert_eq!(output[31], 0x2a);
	}

	#[tokio::test]
	async fn test_call_contract_wraps_revert() {
		let (adapter, asserter) = mocked_adapter();
		asserter.push_failure(error_payload(3, "execution reverted"));

		let err = adapter
			.call_contract(&CallMsg::to(Address::repeat_byte(0x42)), None)
			.await
			.unwrap_err();

		assert!(matches!(err, AdapterError::Call(ref msg) if msg.contains("execution reverted")));
	}

	#[tokio::test]
	async fn test_call_at_unknown_hash_is_block_not_found() {
		let (adapter, asserter) = mocked_adapter();
		asserter.push_failure(error_payload(-32000, "header for hash not found"));

		let hash = B256::repeat_byte(0x99);
		let err = adapter
			.call_contract_at_hash(&CallMsg::to(Address::repeat_byte(0x42)), hash)
			.await
			.unwrap_err();

		assert!(matches!(err, AdapterError::BlockNotFound(h) if h == hash));
	}

	#[tokio::test]
	async fn test_filter_with_hash_and_range_is_rejected_locally() {
		let (adapter, asserter) = mocked_adapter();

		let query = FilterQuery::new()
			.at_block_hash(B256::repeat_byte(1))
			.with_range(Some(1), Some(2));
		let err = adapter.filter_logs(&query).await.unwrap_err();

		// An empty mock queue would have produced an Rpc error.
		assert!(matches!(err, AdapterError::InvalidFilter(_)));
		assert!(asserter.read_q().is_empty());
	}

	#[tokio::test]
	async fn test_filter_invalid_params_from_node() {
		let (adapter, asserter) = mocked_adapter();
		asserter.push_failure(error_payload(INVALID_PARAMS, "invalid block range params"));

		let err = adapter
			.filter_logs(&FilterQuery::new().with_range(Some(1), Some(2)))
			.await
			.unwrap_err();

		assert!(matches!(err, AdapterError::InvalidFilter(_)));
	}

	#[tokio::test]
	async fn test_filter_logs_converts_results() {
		let (adapter, asserter) = mocked_adapter();
		asserter.push_success(&serde_json::json!([
			{
				"address": "0x5555555555555555555555555555555555555555",
				"topics": ["0x0101010101010101010101010101010101010101010101010101010101010101"],
				"data": "0x01020304",
				"blockHash": "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
				"blockNumber": "0x3e8",
				"transactionHash": "0xcccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc",
				"transactionIndex": "0x2",
				"logIndex": "0x7",
				"removed": true
			}
		]));

		let logs = adapter
			.filter_logs(&FilterQuery::new().with_range(Some(1000), Some(1000)))
			.await
			.unwrap();

		assert_eq!(logs.len(), 1);
		assert_eq!(logs[0].address, Address::repeat_byte(0x55));
		assert_eq!(logs[0].topics, vec![B256::repeat_byte(0x01)]);
		assert_eq!(logs[0].data, Bytes::from(vec![1, 2, 3, 4]));
		assert_eq!(logs[0].block_number, 1000);
		assert_eq!(logs[0].block_hash, B256::repeat_byte(0xbb));
		assert_eq!(logs[0].tx_hash, B256::repeat_byte(0xcc));
		assert_eq!(logs[0].tx_index, 2);
		assert_eq!(logs[0].index, 7);
		assert!(logs[0].removed);
	}

	#[tokio::test]
	async fn test_missing_header_is_header_not_found() {
		let (adapter, asserter) = mocked_adapter();
		asserter.push_success(&serde_json::Value::Null);

		let err = adapter
			.header_by_hash(B256::repeat_byte(0x01))
			.await
			.unwrap_err();

		assert!(matches!(err, AdapterError::HeaderNotFound(_)));
	}

	#[tokio::test]
	async fn test_header_by_hash_recomputes_hash() {
		let (adapter, asserter) = mocked_adapter();
		let (block, inner) = block_with_stale_hash(19_000_000);
		asserter.push_success(&block);

		let header = adapter.header_by_hash(B256::repeat_byte(0xee)).await.unwrap();

		assert_eq!(header.hash, inner.hash_slow());
		assert_ne!(header.hash, B256::repeat_byte(0xee));
		assert_eq!(header.parent_hash, B256::repeat_byte(0x11));
		assert_eq!(header.number, 19_000_000);
		assert_eq!(header.time, 1_705_000_000);
	}

	#[tokio::test]
	async fn test_header_by_number_latest() {
		let (adapter, asserter) = mocked_adapter();
		let (block, inner) = block_with_stale_hash(21_000_000);
		asserter.push_success(&block);

		let header = adapter.header_by_number(None).await.unwrap();
		assert_eq!(header.number, 21_000_000);
		assert_eq!(header.hash, inner.hash_slow());

		// A null answer names the tag that was asked for.
		asserter.push_success(&serde_json::Value::Null);
		let err = adapter.header_by_number(None).await.unwrap_err();
		assert!(matches!(err, AdapterError::HeaderNotFound(ref what) if what == "number latest"));
	}

	#[tokio::test]
	async fn test_header_by_number_null_is_header_not_found() {
		let (adapter, asserter) = mocked_adapter();
		asserter.push_success(&serde_json::Value::Null);

		let err = adapter.header_by_number(Some(99_999_999)).await.unwrap_err();

		assert!(matches!(err, AdapterError::HeaderNotFound(ref what) if what == "number 0x5f5e0ff"));
	}

	#[tokio::test]
	async fn test_header_not_found_error_from_node() {
		let (adapter, asserter) = mocked_adapter();
		asserter.push_failure(error_payload(-32000, "block not found"));
		asserter.push_failure(error_payload(-32000, "header not found"));
		asserter.push_failure(error_payload(-32603, "internal error"));

		let by_hash = adapter.header_by_hash(B256::repeat_byte(0x02)).await.unwrap_err();
		assert!(matches!(by_hash, AdapterError::HeaderNotFound(_)));

		let by_number = adapter.header_by_number(Some(5)).await.unwrap_err();
		assert!(matches!(by_number, AdapterError::HeaderNotFound(_)));

		let other = adapter.header_by_number(Some(5)).await.unwrap_err();
		assert!(matches!(other, AdapterError::Rpc(_)));
	}

	#[tokio::test]
	async fn test_subscribe_over_http_fails() {
		let (adapter, _asserter) = mocked_adapter();
		let (headers_tx, _headers_rx) = mpsc::channel(1);

		let err = adapter
			.subscribe_new_head(CancellationToken::new(), headers_tx)
			.await
			.unwrap_err();

		assert!(matches!(err, AdapterError::Subscription(_)));
	}

	#[tokio::test]
	async fn test_connect_to_unreachable_endpoint_fails() {
		let err = AlloyAdapter::builder(ChainId::ETHEREUM, "/nonexistent/ethrpc/geth.ipc")
			.connect()
			.await
			.unwrap_err();

		assert!(matches!(err, AdapterError::Connection(_)));
	}
}
