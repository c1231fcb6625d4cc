use super::{FeedError, Feeder, Page};
use crate::events::SwapInfo;
use async_trait::async_trait;
use insights_sdk::client::{Upstream, fetch_graph};
use insights_sdk::objects::Asset;
use insights_sdk::objects::graph::{SwapNode, SwapsData};
use std::sync::Arc;
use tracing::debug;

const SWAPS_QUERY: &str = r#"
{
    allSwaps(
        orderBy: ID_ASC,
        first: 50,
        filter: {
            id: { greaterThan: $CURSOR },
            swapExecutedBlockTimestamp: { isNull: false }
        }
    ) {
        edges {
            node {
                id
                sourceAsset
                destinationAsset
                depositAmount
                depositValueUsd
                egressAmount
                egressValueUsd
                swapExecutedBlockTimestamp
            }
        }
    }
}
"#;

/// Announces executed swaps, keyed by swap id.
pub struct SwapFeeder {
    upstream: Arc<dyn Upstream>,
}

impl SwapFeeder {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}

/// `None` when either side is an asset this bot cannot scale.
fn to_event(node: SwapNode) -> Result<Option<SwapInfo>, FeedError> {
    let (Ok(source_asset), Ok(destination_asset)) = (
        node.source_asset.parse::<Asset>(),
        node.destination_asset.parse::<Asset>(),
    ) else {
        debug!(
            swap = node.id,
            source = %node.source_asset,
            destination = %node.destination_asset,
            "Skipping swap with unknown asset"
        );
        return Ok(None);
    };

    Ok(Some(SwapInfo {
        id: node.id,
        deposit_amount: source_asset.from_base_units(&node.deposit_amount)?,
        egress_amount: destination_asset.from_base_units(&node.egress_amount)?,
        source_asset,
        destination_asset,
        deposit_value_usd: node.deposit_value_usd,
        egress_value_usd: node.egress_value_usd,
        executed_at: node.swap_executed_block_timestamp,
    }))
}

#[async_trait]
impl Feeder for SwapFeeder {
    type Event = SwapInfo;

    fn name(&self) -> &'static str {
        "swap"
    }

    fn default_cursor(&self) -> u64 {
        0
    }

    async fn fetch(&self, cursor: &u64) -> Result<Vec<SwapInfo>, FeedError> {
        Ok(self.fetch_page(cursor).await?.items)
    }

    async fn fetch_page(&self, cursor: &u64) -> Result<Page<SwapInfo>, FeedError> {
        let query = SWAPS_QUERY.replace("$CURSOR", &cursor.to_string());
        let data: SwapsData = fetch_graph(self.upstream.as_ref(), &query).await?;

        let mut page = Page::new();
        for node in data.all_swaps.into_nodes() {
            let id = node.id;
            match to_event(node)? {
                Some(swap) => page.items.push(swap),
                None => page.skip(id),
            }
        }
        Ok(page)
    }
}
