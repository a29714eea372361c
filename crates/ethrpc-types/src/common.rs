//! Common types used throughout the adapter layer.

// Re-export commonly used ethereum types
pub use alloy::primitives::{Address, Bytes, B256, U256};

/// Block hash
pub type BlockHash = B256;

/// Transaction hash
pub type TxHash = B256;

/// Block number
pub type BlockNumber = u64;

/// Timestamp (Unix seconds)
pub type Timestamp = u64;
