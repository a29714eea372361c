//! Ethereum Virtual Machine (EVM) compatible chain adapters.
//!
//! This module provides the adapter for Ethereum and other EVM-compatible
//! blockchains (such as Polygon, Arbitrum, Optimism, Base, etc.).
//!
//! The adapter handles:
//! - Read-only contract calls by block number or block hash
//! - Event log queries and filtering
//! - Block number and header retrieval
//! - New-head subscriptions over WebSocket or IPC
//!
//! Available implementations:
//! - `AlloyAdapter`: Uses the alloy library

mod alloy_adapter;
pub mod convert;

pub use alloy_adapter::{AlloyAdapter, AlloyAdapterBuilder};
