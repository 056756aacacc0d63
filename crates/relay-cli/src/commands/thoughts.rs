use anyhow::Context;
use relay_config::RelayConfig;
use relay_core::entities::Thought;
use relay_store::ChatStore;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::ThoughtsArgs;
use crate::commands::shared;
use crate::output::output;

#[derive(Debug, Serialize)]
pub struct ThoughtsReport {
    pub research_id: String,
    pub thoughts: Vec<Thought>,
}

pub async fn handle(
    args: &ThoughtsArgs,
    config: &RelayConfig,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let (store, _) = shared::replay(&args.file, config).await?;
    let report = collect(&store, args.research.as_deref())?;
    output(&report, flags.format)
}

/// Thoughts of the named block, or of the newest block.
pub fn collect(store: &ChatStore, research: Option<&str>) -> anyhow::Result<ThoughtsReport> {
    let research_id = match research {
        Some(id) => id.to_string(),
        None => store
            .state()
            .research_ids
            .last()
            .cloned()
            .context("transcript contains no research block")?,
    };
    let thoughts = store.thoughts(&research_id)?;
    Ok(ThoughtsReport {
        research_id,
        thoughts,
    })
}

#[cfg(test)]
mod tests {
    use relay_config::RelayConfig;
    use relay_store::ChatStore;

    use super::collect;
    use crate::commands::shared::{self, fixtures};

    #[tokio::test]
    async fn defaults_to_newest_block() {
        let file = fixtures::write(fixtures::ESCALATED);
        let (store, _) = shared::replay(file.path(), &RelayConfig::default())
            .await
            .expect("replay should succeed");

        let report = collect(&store, None).expect("thoughts");
        assert_eq!(report.research_id, "p1");
        let texts = report.thoughts.iter().map(|t| t.thought.as_str()).collect::<Vec<_>>();
        assert!(texts.contains(&"Group tasks by owner"));
        assert!(!texts.contains(&"List open tasks"));
    }

    #[tokio::test]
    async fn named_block_is_used() {
        let file = fixtures::write(fixtures::ESCALATED);
        let (store, _) = shared::replay(file.path(), &RelayConfig::default())
            .await
            .expect("replay should succeed");

        let report = collect(&store, Some("r1")).expect("thoughts");
        assert_eq!(report.thoughts.len(), 1);
        assert_eq!(report.thoughts[0].thought, "List open tasks");
    }

    #[test]
    fn empty_store_has_no_default_block() {
        let error = collect(&ChatStore::default(), None).expect_err("no blocks");
        assert!(error.to_string().contains("no research block"));
    }

    #[test]
    fn unknown_block_is_an_error() {
        assert!(collect(&ChatStore::default(), Some("missing")).is_err());
    }
}
