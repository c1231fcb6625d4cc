use super::funding::{fetch_funding_events, validator};
use super::{FeedError, Feeder};
use crate::events::RedemptionInfo;
use async_trait::async_trait;
use insights_sdk::client::Upstream;
use insights_sdk::objects::Asset;
use std::sync::Arc;

/// Announces FLIP redeemed from validator stakes.
pub struct RedemptionFeeder {
    upstream: Arc<dyn Upstream>,
}

impl RedemptionFeeder {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl Feeder for RedemptionFeeder {
    type Event = RedemptionInfo;

    fn name(&self) -> &'static str {
        "redemption"
    }

    fn default_cursor(&self) -> u64 {
        0
    }

    async fn fetch(&self, cursor: &u64) -> Result<Vec<RedemptionInfo>, FeedError> {
        fetch_funding_events(self.upstream.as_ref(), "REDEEMED", *cursor)
            .await?
            .into_iter()
            .map(|node| -> Result<RedemptionInfo, FeedError> {
                Ok(RedemptionInfo {
                    id: node.id,
                    amount: Asset::Flip.from_base_units(&node.amount)?,
                    epoch: node.epoch_id,
                    validator: validator(&node),
                    redeemed_at: node.event_by_event_id.block_by_block_id.timestamp,
                })
            })
            .collect()
    }
}
