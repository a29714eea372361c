//! Logging setup for processes embedding ethrpc adapters.

pub mod tracing;

pub use crate::tracing::{init_tracing, TracingConfig, TracingError};
