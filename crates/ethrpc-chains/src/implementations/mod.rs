//! Chain adapter implementations for various blockchain networks.
//!
//! This module contains concrete implementations of the `ChainAdapter` trait
//! for different blockchain types. Currently supports:
//!
//! - **EVM chains**: Ethereum and EVM-compatible blockchains via the `evm` module

pub mod evm;
