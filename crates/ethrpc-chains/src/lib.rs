//! Chain adapters for connecting to different blockchains.
//!
//! This crate provides a unified interface for interacting with blockchain
//! networks through the `ChainAdapter` trait defined in `ethrpc-types`. Callers
//! pick an adapter by chain id and never touch the underlying client's types.
//!
//! # Architecture
//!
//! - `factory`: maps chain ids to adapter constructors and builds connected
//!   adapters on demand
//! - `registry`: holds already-connected adapters keyed by chain id
//! - `relay`: the task that forwards new block headers to a caller's channel
//! - `implementations`: concrete adapters for different blockchain families

pub mod factory;
pub mod registry;
pub mod relay;

pub mod implementations;

#[cfg(test)]
mod test_utils;

pub use factory::{
	adapter_constructor, default_factory, evm_constructor, init_default_factory, new_adapter,
	AdapterConstructor, AdapterFactory, ConnectParams,
};
pub use registry::ChainRegistry;

pub use implementations::evm::AlloyAdapter;
