use super::{FeedError, Feeder};
use crate::events::EpochInfo;
use async_trait::async_trait;
use insights_sdk::client::{Upstream, fetch_graph};
use insights_sdk::objects::Asset;
use insights_sdk::objects::graph::{EpochNode, EpochsData};
use std::sync::Arc;

const EPOCHS_QUERY: &str = r#"
{
    allEpoches(
        orderBy: ID_ASC,
        first: 10,
        filter: { id: { greaterThan: $CURSOR } }
    ) {
        edges {
            node {
                id
                bond
                totalBonded
                authorityCount
                eventByStartEventId {
                    blockByBlockId {
                        timestamp
                    }
                }
            }
        }
    }
}
"#;

/// Announces authority set rotations, keyed by epoch id.
pub struct EpochFeeder {
    upstream: Arc<dyn Upstream>,
}

impl EpochFeeder {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}

fn to_event(node: EpochNode) -> Result<EpochInfo, FeedError> {
    Ok(EpochInfo {
        id: node.id,
        bond: Asset::Flip.from_base_units(&node.bond)?,
        total_bonded: Asset::Flip.from_base_units(&node.total_bonded)?,
        authority_count: node.authority_count,
        started_at: node.event_by_start_event_id.block_by_block_id.timestamp,
    })
}

#[async_trait]
impl Feeder for EpochFeeder {
    type Event = EpochInfo;

    fn name(&self) -> &'static str {
        "epoch"
    }

    fn default_cursor(&self) -> u64 {
        0
    }

    async fn fetch(&self, cursor: &u64) -> Result<Vec<EpochInfo>, FeedError> {
        let query = EPOCHS_QUERY.replace("$CURSOR", &cursor.to_string());
        let data: EpochsData = fetch_graph(self.upstream.as_ref(), &query).await?;
        data.all_epoches.into_nodes().map(to_event).collect()
    }
}
