//! # relay-merge
//!
//! Folds decoded [`relay_events::ChatEvent`]s into message state.
//!
//! The reducer ([`merge()`]) works on a caller-owned [`Conversation`] and keeps
//! nothing of its own between calls. All accumulation state lives in the
//! messages themselves plus the conversation's tool-call index, so two
//! conversations never share mutable structures.
//!
//! [`thoughts`] derives the ordered, deduplicated thought list for one
//! research block from the same state.

pub mod conversation;
pub mod merge;
pub mod thoughts;

pub use conversation::Conversation;
pub use merge::{MergeOutcome, merge};
pub use thoughts::{BlockSources, ThoughtAggregator};
