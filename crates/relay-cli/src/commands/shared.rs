use std::path::Path;

use anyhow::Context;
use relay_config::RelayConfig;
use relay_events::chat_events;
use relay_store::{ChatStore, ConsumeSummary, consume};
use tokio::io::AsyncRead;
use tokio_util::io::ReaderStream;
use tokio_util::sync::CancellationToken;

type TranscriptReader = Box<dyn AsyncRead + Unpin + Send>;

/// Open a transcript file, or stdin for `-`.
pub async fn open_transcript(path: &Path) -> anyhow::Result<TranscriptReader> {
    if path == Path::new("-") {
        return Ok(Box::new(tokio::io::stdin()));
    }
    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open transcript {}", path.display()))?;
    Ok(Box::new(file))
}

/// Feed a recorded SSE transcript through a fresh store.
///
/// Ctrl-C stops the replay between events; the store keeps whatever was
/// merged up to that point.
pub async fn replay(
    path: &Path,
    config: &RelayConfig,
) -> anyhow::Result<(ChatStore, ConsumeSummary)> {
    let reader = open_transcript(path).await?;
    let events = chat_events(ReaderStream::new(reader), &config.stream);
    let mut store = ChatStore::new(config);

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    let watcher = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            interrupt.cancel();
        }
    });

    let result = consume(&mut store, events, &cancel).await;
    watcher.abort();
    let summary = result.with_context(|| format!("replay of {} failed", path.display()))?;

    tracing::debug!(
        events = summary.events,
        messages = store.state().conversation().len(),
        blocks = store.state().research_ids.len(),
        "transcript replayed"
    );
    Ok((store, summary))
}
