//! Driving a store from an event stream.

use futures::{Stream, StreamExt};
use relay_events::{ChatEvent, EventError};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::error::StoreError;
use crate::store::ChatStore;

/// How a consumed stream ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ConsumeSummary {
    /// Events dispatched into the store.
    pub events: usize,
    /// The token fired before the stream ended. In-flight messages are left
    /// streaming.
    pub cancelled: bool,
}

/// Pull events one at a time and dispatch them in arrival order.
///
/// `responding` is set for the duration and cleared on every exit path.
///
/// # Errors
///
/// Returns `StoreError::Transport` when the stream yields a transport error,
/// after every still-streaming message has been finalized.
pub async fn consume<S>(
    store: &mut ChatStore,
    events: S,
    cancel: &CancellationToken,
) -> Result<ConsumeSummary, StoreError>
where
    S: Stream<Item = Result<ChatEvent, EventError>>,
{
    let mut events = std::pin::pin!(events);
    let mut summary = ConsumeSummary::default();
    store.set_responding(true);

    let result = loop {
        let next = tokio::select! {
            biased;
            () = cancel.cancelled() => {
                tracing::debug!(events = summary.events, "event stream cancelled");
                summary.cancelled = true;
                break Ok(summary);
            }
            next = events.next() => next,
        };

        match next {
            Some(Ok(event)) => {
                tracing::trace!(event = event.name(), message_id = event.message_id(), "dispatching");
                store.dispatch(&event);
                summary.events += 1;
            }
            Some(Err(error)) => {
                let finalized = store.finalize_streaming();
                tracing::warn!(%error, finalized = finalized.len(), "event stream failed");
                break Err(StoreError::from(error));
            }
            None => break Ok(summary),
        }
    };

    store.set_responding(false);
    result
}
