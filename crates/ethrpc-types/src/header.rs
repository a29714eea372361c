//! Block headers.

use crate::common::{BlockHash, BlockNumber, Timestamp};
use serde::{Deserialize, Serialize};

/// Block header projection.
///
/// `hash` is computed from the native header content at conversion time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Header {
	pub hash: BlockHash,
	pub parent_hash: BlockHash,
	pub number: BlockNumber,
	pub time: Timestamp,
}
