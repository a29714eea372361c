//! Error types for the adapter layer.

use crate::{chains::ChainId, common::BlockHash};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdapterError>;

#[derive(Error, Debug)]
pub enum AdapterError {
	#[error("Connection error: {0}")]
	Connection(String),

	#[error("Unsupported chain: {0}")]
	UnsupportedChain(ChainId),

	#[error("Chain {0} already registered")]
	AlreadyRegistered(ChainId),

	#[error("Call error: {0}")]
	Call(String),

	#[error("Block not found: {0}")]
	BlockNotFound(BlockHash),

	#[error("Header not found: {0}")]
	HeaderNotFound(String),

	#[error("Invalid filter: {0}")]
	InvalidFilter(String),

	#[error("Subscription error: {0}")]
	Subscription(String),

	#[error("RPC error: {0}")]
	Rpc(String),

	#[error(transparent)]
	Other(#[from] anyhow::Error),
}
