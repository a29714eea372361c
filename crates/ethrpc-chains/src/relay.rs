//! Relay from a native new-head stream to a caller-owned header channel.
//!
//! One relay runs per active subscription. It pulls a native header, converts
//! it, and awaits the hand-off to the caller's channel before pulling the next
//! one, so a caller that stops reading stalls the relay instead of losing
//! headers. Cancellation is observed both while waiting for the next native
//! header and while blocked on the hand-off.
//!
//! Clients buffer pushed headers in a bounded broadcast channel. If a stall
//! outlasts that buffer the client discards the oldest headers; the relay
//! reports this as [`Lagged`] and ends the subscription rather than resuming
//! past the gap.

use async_trait::async_trait;
use ethrpc_types::{AdapterError, Header, Subscription};
use futures::{Stream, StreamExt};
use std::future::Future;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::sync::mpsc;
use tokio::task::{JoinError, JoinHandle};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Reason a relay stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayExit {
	/// The cancellation token fired.
	Cancelled,
	/// The caller dropped the receiving half of the header channel.
	ReceiverDropped,
	/// The native stream ended. A terminal error was reported.
	UpstreamClosed,
	/// The client discarded headers before the relay read them. A terminal
	/// error was reported.
	Lagged,
}

impl RelayExit {
	/// Whether the upstream subscription is still open and needs tearing down.
	pub fn upstream_open(&self) -> bool {
		!matches!(self, Self::UpstreamClosed)
	}
}

/// Number of headers the client discarded because the relay fell behind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lagged(pub u64);

/// Broadcast-style source of native headers.
///
/// `recv` reports skipped items as `RecvError::Lagged` instead of hiding them.
#[async_trait]
pub trait HeadReceiver: Send + 'static {
	type Item: Send + 'static;

	async fn recv(&mut self) -> Result<Self::Item, RecvError>;
}

#[async_trait]
impl<T: Clone + Send + 'static> HeadReceiver for broadcast::Receiver<T> {
	type Item = T;

	async fn recv(&mut self) -> Result<T, RecvError> {
		broadcast::Receiver::recv(self).await
	}
}

/// Relay input read from `receiver`. The stream ends when the sender closes.
pub fn head_stream<R: HeadReceiver>(
	receiver: R,
) -> impl Stream<Item = Result<R::Item, Lagged>> + Send + 'static {
	futures::stream::unfold(receiver, |mut receiver| async move {
		match receiver.recv().await {
			Ok(item) => Some((Ok(item), receiver)),
			Err(RecvError::Lagged(skipped)) => Some((Err(Lagged(skipped)), receiver)),
			Err(RecvError::Closed) => None,
		}
	})
}

/// Pump `native` into `output` until cancelled or either side goes away.
///
/// When the native stream ends or reports lag, a single
/// `AdapterError::Subscription` is sent on `errors`. In every other case
/// `errors` is dropped without a value.
pub async fn relay_headers<S, N, F>(
	native: S,
	convert: F,
	output: mpsc::Sender<Header>,
	cancel: CancellationToken,
	errors: mpsc::Sender<AdapterError>,
) -> RelayExit
where
	S: Stream<Item = Result<N, Lagged>> + Send,
	N: Send,
	F: Fn(&N) -> Header + Send,
{
	let mut native = std::pin::pin!(native);
	let mut relayed: u64 = 0;

	loop {
		let next = tokio::select! {
			_ = cancel.cancelled() => {
				debug!(relayed, "Header relay cancelled");
				return RelayExit::Cancelled;
			}
			next = native.next() => next,
		};

		let origin = match next {
			Some(Ok(origin)) => origin,
			Some(Err(Lagged(skipped))) => {
				warn!(relayed, skipped, "New-head subscription lagged");
				let _ = errors.try_send(AdapterError::Subscription(format!(
					"lagged, {} headers dropped",
					skipped
				)));
				return RelayExit::Lagged;
			}
			None => {
				warn!(relayed, "New-head subscription closed by upstream");
				let _ = errors.try_send(AdapterError::Subscription(
					"new-head subscription closed by upstream".to_string(),
				));
				return RelayExit::UpstreamClosed;
			}
		};

		let header = convert(&origin);
		tokio::select! {
			_ = cancel.cancelled() => {
				debug!(relayed, block = header.number, "Header relay cancelled during hand-off");
				return RelayExit::Cancelled;
			}
			sent = output.send(header) => {
				if sent.is_err() {
					debug!(relayed, "Header receiver dropped, stopping relay");
					return RelayExit::ReceiverDropped;
				}
			}
		}

		relayed += 1;
	}
}

/// Start a relay task for one subscription.
///
/// The returned handle owns a child of `cancel` and the relay's terminal error
/// channel. The join handle resolves to the reason the relay stopped.
pub fn spawn_relay<S, N, F>(
	native: S,
	convert: F,
	headers: mpsc::Sender<Header>,
	cancel: CancellationToken,
) -> (Subscription, JoinHandle<RelayExit>)
where
	S: Stream<Item = Result<N, Lagged>> + Send + 'static,
	N: Send + 'static,
	F: Fn(&N) -> Header + Send + 'static,
{
	let cancel = cancel.child_token();
	let (errors_tx, errors_rx) = mpsc::channel(1);
	let relay = tokio::spawn(relay_headers(
		native,
		convert,
		headers,
		cancel.clone(),
		errors_tx,
	));

	(Subscription::new(cancel, errors_rx), relay)
}

/// Wait for `relay` to stop, then run `teardown` unless the upstream already
/// ended on its own. A relay that panicked is torn down as well.
pub async fn finish_relay<T, Fut>(
	relay: JoinHandle<RelayExit>,
	teardown: T,
) -> Result<RelayExit, JoinError>
where
	T: FnOnce() -> Fut,
	Fut: Future<Output = ()>,
{
	let exit = relay.await;
	if exit.as_ref().map_or(true, RelayExit::upstream_open) {
		teardown().await;
	}
	exit
}
