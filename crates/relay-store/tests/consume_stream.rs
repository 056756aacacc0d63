//! Stream consumption: transport failures and cancellation.

use futures::{StreamExt, stream};
use pretty_assertions::assert_eq;
use relay_config::StreamConfig;
use relay_events::{ChatEvent, EventError, chat_events, decode};
use relay_store::{ChatStore, StoreError, consume};
use tokio_util::sync::CancellationToken;

fn event(name: &str, data: &str) -> Result<ChatEvent, EventError> {
    Ok(decode(name, data).unwrap().unwrap())
}

#[tokio::test]
async fn transport_error_finalizes_and_propagates() {
    let mut store = ChatStore::default();
    let events = stream::iter(vec![
        event("message_chunk", r#"{"id":"1","agent":"react_agent","content":"Sprint 5 has "}"#),
        Err(EventError::Transport("connection reset".into())),
        event("message_chunk", r#"{"id":"1","content":"never merged"}"#),
    ]);

    let err = consume(&mut store, events, &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Transport(_)));

    let message = store.state().message("1").unwrap();
    assert_eq!(message.content, "Sprint 5 has ");
    assert!(!message.is_streaming);
    assert!(!store.state().responding);
}

#[tokio::test]
async fn cancellation_leaves_messages_streaming() {
    let mut store = ChatStore::default();
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    let first = event("message_chunk", r#"{"id":"1","agent":"react_agent","content":"partial"}"#);
    let events = stream::iter(vec![first]).chain(stream::once(async move {
        trigger.cancel();
        event("message_chunk", r#"{"id":"1","content":" lost?"}"#)
    }))
    .chain(stream::pending());

    let summary = consume(&mut store, events, &cancel).await.unwrap();
    assert!(summary.cancelled);

    let message = store.state().message("1").unwrap();
    assert!(message.is_streaming);
    assert!(message.content.starts_with("partial"));
    assert!(!store.state().responding);
}

#[tokio::test]
async fn end_to_end_from_sse_bytes() {
    let transcript = concat!(
        "event: message_chunk\n",
        "data: {\"id\":\"1\",\"role\":\"assistant\",\"agent\":\"react_agent\",\"content\":\"Sprint 5 has \"}\n\n",
        "event: message_chunk\n",
        "data: {\"id\":\"1\",\"content\":\"92% completion.\"}\n\n",
        "event: thoughts\n",
        "data: {\"id\":\"1\",\"react_thoughts\":[{\"thought\":\"Use list_sprints\",\"step_index\":0}]}\n\n",
        "event: thoughts\n",
        "data: {\"id\":\"1\",\"react_thoughts\":[{\"thought\":\"Use list_sprints\",\"step_index\":0}]}\n\n",
        "event: message_chunk\n",
        "data: {\"id\":\"1\",\"finish_reason\":\"stop\"}\n\n",
    );
    let bytes: Vec<Result<Vec<u8>, std::io::Error>> = transcript
        .as_bytes()
        .chunks(7)
        .map(|c| Ok(c.to_vec()))
        .collect();

    let mut store = ChatStore::default();
    let mut snapshots = store.subscribe();
    let events = chat_events(stream::iter(bytes), &StreamConfig::default());
    let summary = consume(&mut store, events, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(summary.events, 5);
    let message = store.state().message("1").unwrap();
    assert_eq!(message.content, "Sprint 5 has 92% completion.");
    assert!(!message.is_streaming);
    assert_eq!(message.react_thoughts.len(), 1);

    assert!(snapshots.has_changed().unwrap());
    assert!(!snapshots.borrow_and_update().responding);
}
