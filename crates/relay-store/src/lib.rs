//! # relay-store
//!
//! The client-side state container for one conversation.
//!
//! [`ChatStore`] is the only writer. Each [`ChatStore::dispatch`] merges one
//! event, updates the research block maps and escalation links in the same
//! step, and publishes one immutable [`StoreState`] snapshot on a
//! `tokio::sync::watch` channel for any number of readers.
//!
//! [`consume`] drives a store from an event stream with cooperative
//! cancellation.

pub mod consumer;
pub mod error;
pub mod state;
pub mod store;

pub use consumer::{ConsumeSummary, consume};
pub use error::StoreError;
pub use state::{ArmedEscalation, StoreState};
pub use store::ChatStore;
