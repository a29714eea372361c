//! In-memory `ChainAdapter` double for unit tests.

use async_trait::async_trait;
use ethrpc_types::{
	AdapterError, BlockHash, BlockNumber, Bytes, CallMsg, ChainAdapter, FilterQuery, Header, Log,
	Result, Subscription,
};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug)]
pub struct MockAdapter {
	block: BlockNumber,
}

impl MockAdapter {
	pub fn new(block: BlockNumber) -> Self {
		Self { block }
	}

	fn header(&self, number: BlockNumber) -> Header {
		Header {
			hash: BlockHash::with_last_byte(number as u8),
			parent_hash: BlockHash::with_last_byte(number.saturating_sub(1) as u8),
			number,
			time: 0,
		}
	}
}

#[async_trait]
impl ChainAdapter for MockAdapter {
	async fn call_contract(&self, _: &CallMsg, _: Option<BlockNumber>) -> Result<Bytes> {
		Ok(Bytes::new())
	}

	async fn call_contract_at_hash(&self, _: &CallMsg, hash: BlockHash) -> Result<Bytes> {
		Err(AdapterError::BlockNotFound(hash))
	}

	async fn filter_logs(&self, query: &FilterQuery) -> Result<Vec<Log>> {
		query.validate()?;
		Ok(vec![])
	}

	async fn block_number(&self) -> Result<BlockNumber> {
		Ok(self.block)
	}

	async fn header_by_hash(&self, hash: BlockHash) -> Result<Header> {
		Err(AdapterError::HeaderNotFound(format!("hash {}", hash)))
	}

	async fn header_by_number(&self, number: Option<BlockNumber>) -> Result<Header> {
		Ok(self.header(number.unwrap_or(self.block)))
	}

	async fn subscribe_new_head(
		&self,
		cancel: CancellationToken,
		_: mpsc::Sender<Header>,
	) -> Result<Subscription> {
		let (_, errors) = mpsc::channel(1);
		Ok(Subscription::new(cancel.child_token(), errors))
	}
}
