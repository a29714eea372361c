//! Chain-agnostic types shared by every ethrpc crate.
//!
//! The neutral data model (call messages, filter queries, logs, headers) is a
//! fixed projection of the native types of whatever chain client sits behind
//! a [`chains::ChainAdapter`]. Only the fields declared here are carried;
//! anything else the native client reports is dropped during conversion.

pub mod call;
pub mod chains;
pub mod common;
pub mod errors;
pub mod filter;
pub mod header;
pub mod log;
pub mod subscription;

pub use call::{AccessList, AccessListEntry, CallMsg};
pub use chains::{ChainAdapter, ChainId, UnknownChainPolicy};
pub use common::*;
pub use errors::{AdapterError, Result};
pub use filter::FilterQuery;
pub use header::Header;
pub use log::Log;
pub use subscription::Subscription;
