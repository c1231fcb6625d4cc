use super::{FeedError, Feeder, Page};
use crate::events::{AccountRef, IncomingLiquidityInfo};
use async_trait::async_trait;
use insights_sdk::client::{Upstream, fetch_graph};
use insights_sdk::objects::Asset;
use insights_sdk::objects::graph::{LiquidityDepositNode, LiquidityDepositsData};
use std::sync::Arc;
use tracing::debug;

const LIQUIDITY_DEPOSITS_QUERY: &str = r#"
{
    allLiquidityDeposits(
        orderBy: ID_ASC,
        first: 50,
        filter: { id: { greaterThan: $CURSOR } }
    ) {
        edges {
            node {
                id
                asset
                depositAmount
                depositValueUsd
                lpAccount: accountByLiquidityProviderId {
                    alias
                    idSs58
                }
                blockByBlockId {
                    timestamp
                }
            }
        }
    }
}
"#;

/// Announces liquidity deposited into the pools, keyed by deposit id.
pub struct IncomingLiquidityFeeder {
    upstream: Arc<dyn Upstream>,
}

impl IncomingLiquidityFeeder {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}

fn to_event(node: LiquidityDepositNode) -> Result<Option<IncomingLiquidityInfo>, FeedError> {
    let Ok(asset) = node.asset.parse::<Asset>() else {
        debug!(deposit = node.id, asset = %node.asset, "Skipping deposit of unknown asset");
        return Ok(None);
    };

    Ok(Some(IncomingLiquidityInfo {
        id: node.id,
        asset,
        amount: asset.from_base_units(&node.deposit_amount)?,
        value_usd: node.deposit_value_usd,
        provider: node.lp_account.map(|lp| AccountRef {
            alias: lp.alias,
            id_ss58: lp.id_ss58,
        }),
        deposited_at: node.block_by_block_id.timestamp,
    }))
}

#[async_trait]
impl Feeder for IncomingLiquidityFeeder {
    type Event = IncomingLiquidityInfo;

    fn name(&self) -> &'static str {
        "incoming_liquidity"
    }

    fn default_cursor(&self) -> u64 {
        0
    }

    async fn fetch(&self, cursor: &u64) -> Result<Vec<IncomingLiquidityInfo>, FeedError> {
        Ok(self.fetch_page(cursor).await?.items)
    }

    async fn fetch_page(&self, cursor: &u64) -> Result<Page<IncomingLiquidityInfo>, FeedError> {
        let query = LIQUIDITY_DEPOSITS_QUERY.replace("$CURSOR", &cursor.to_string());
        let data: LiquidityDepositsData = fetch_graph(self.upstream.as_ref(), &query).await?;

        let mut page = Page::new();
        for node in data.all_liquidity_deposits.into_nodes() {
            let id = node.id;
            match to_event(node)? {
                Some(deposit) => page.items.push(deposit),
                None => page.skip(id),
            }
        }
        Ok(page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeders::test_support::ScriptedUpstream;
    use rust_decimal::Decimal;
    use serde_json::json;

    #[tokio::test]
    async fn test_deposits_with_and_without_provider() {
        let upstream = Arc::new(ScriptedUpstream::single(json!({
            "data": { "allLiquidityDeposits": { "edges": [
                { "node": {
                    "id": 7,
                    "asset": "Eth",
                    "depositAmount": "2000000000000000000",
                    "depositValueUsd": 4600,
                    "lpAccount": { "alias": null, "idSs58": "cFLRQDfEdmnv6d2XfHJNRBQHi4fruPMReLSfvB8WWD2ENbqj7" },
                    "blockByBlockId": { "timestamp": "2024-02-03T04:43:48+00:00" }
                }},
                { "node": {
                    "id": 8,
                    "asset": "Usdc",
                    "depositAmount": "1500000000",
                    "depositValueUsd": "1500",
                    "lpAccount": null,
                    "blockByBlockId": { "timestamp": "2024-02-03T05:00:00+00:00" }
                }}
            ]}}
        })));

        let deposits = IncomingLiquidityFeeder::new(upstream).fetch(&6).await.unwrap();
        assert_eq!(deposits.len(), 2);
        assert_eq!(deposits[0].asset, Asset::Eth);
        assert_eq!(deposits[0].amount, Decimal::from(2));
        assert!(deposits[0].provider.is_some());
        assert_eq!(deposits[1].amount, Decimal::from(1500));
        assert!(deposits[1].provider.is_none());
    }

    #[tokio::test]
    async fn test_page_mixing_known_and_unknown_assets() {
        let node = |id: u64, asset: &str| {
            json!({ "node": {
                "id": id,
                "asset": asset,
                "depositAmount": "1000000",
                "depositValueUsd": "1",
                "lpAccount": null,
                "blockByBlockId": { "timestamp": "2024-02-03T05:00:00+00:00" }
            }})
        };
        let upstream = Arc::new(ScriptedUpstream::single(json!({
            "data": { "allLiquidityDeposits": { "edges": [node(9, "Sol"), node(10, "Usdc")] } }
        })));

        let page = IncomingLiquidityFeeder::new(upstream).fetch_page(&8).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].asset, Asset::Usdc);
        assert_eq!(page.skipped, Some(9));
    }
}
