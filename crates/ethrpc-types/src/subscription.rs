//! Handle for a running new-head subscription.

use crate::errors::AdapterError;
use std::fmt;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Opaque handle returned by `ChainAdapter::subscribe_new_head`.
///
/// The handle owns a child of the caller's cancellation token. Cancelling the
/// caller's token or calling [`Subscription::unsubscribe`] both stop the relay.
/// The error channel yields at most one terminal error and closes once the
/// relay stops for any other reason.
pub struct Subscription {
	cancel: CancellationToken,
	errors: mpsc::Receiver<AdapterError>,
}

impl Subscription {
	/// Create a handle from the relay's cancellation token and the receiving
	/// half of its terminal error channel.
	pub fn new(cancel: CancellationToken, errors: mpsc::Receiver<AdapterError>) -> Self {
		Self { cancel, errors }
	}

	/// Stop the subscription. Calling it more than once is a no-op.
	pub fn unsubscribe(&self) {
		self.cancel.cancel();
	}

	/// Whether the subscription has been stopped from the caller's side.
	pub fn is_unsubscribed(&self) -> bool {
		self.cancel.is_cancelled()
	}

	/// Channel carrying the terminal transport error, if one happens.
	///
	/// `recv()` returns `None` once the relay has stopped without an error.
	pub fn err(&mut self) -> &mut mpsc::Receiver<AdapterError> {
		&mut self.errors
	}
}

impl fmt::Debug for Subscription {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Subscription")
			.field("unsubscribed", &self.is_unsubscribed())
			.finish()
	}
}
