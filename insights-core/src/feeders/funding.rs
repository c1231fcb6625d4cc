use super::{FeedError, Feeder};
use crate::events::{AccountRef, FundingInfo};
use async_trait::async_trait;
use insights_sdk::client::{Upstream, fetch_graph};
use insights_sdk::objects::Asset;
use insights_sdk::objects::graph::{FundingEventNode, FundingEventsData};
use std::sync::Arc;

/// Validator funding events of one type (`FUNDED` or `REDEEMED`).
const FUNDING_EVENTS_QUERY: &str = r#"
{
    allValidatorFundingEvents(
        orderBy: ID_ASC,
        first: 50,
        filter: {
            id: { greaterThan: $CURSOR },
            type: { equalTo: $TYPE }
        }
    ) {
        edges {
            node {
                id
                amount
                epochId
                validatorByValidatorId {
                    alias
                    idSs58
                }
                eventByEventId {
                    blockByBlockId {
                        timestamp
                    }
                }
            }
        }
    }
}
"#;

/// Fetch funding events of `event_type` with an id above `cursor`.
pub(super) async fn fetch_funding_events(
    upstream: &dyn Upstream,
    event_type: &str,
    cursor: u64,
) -> Result<Vec<FundingEventNode>, FeedError> {
    let query = FUNDING_EVENTS_QUERY
        .replace("$CURSOR", &cursor.to_string())
        .replace("$TYPE", event_type);
    let data: FundingEventsData = fetch_graph(upstream, &query).await?;
    Ok(data.all_validator_funding_events.into_nodes().collect())
}

pub(super) fn validator(node: &FundingEventNode) -> AccountRef {
    AccountRef {
        alias: node.validator_by_validator_id.alias.clone(),
        id_ss58: node.validator_by_validator_id.id_ss58.clone(),
    }
}

/// Announces FLIP added to validator stakes.
pub struct FundingFeeder {
    upstream: Arc<dyn Upstream>,
}

impl FundingFeeder {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}

#[async_trait]
impl Feeder for FundingFeeder {
    type Event = FundingInfo;

    fn name(&self) -> &'static str {
        "funding"
    }

    fn default_cursor(&self) -> u64 {
        0
    }

    async fn fetch(&self, cursor: &u64) -> Result<Vec<FundingInfo>, FeedError> {
        fetch_funding_events(self.upstream.as_ref(), "FUNDED", *cursor)
            .await?
            .into_iter()
            .map(|node| -> Result<FundingInfo, FeedError> {
                Ok(FundingInfo {
                    id: node.id,
                    amount: Asset::Flip.from_base_units(&node.amount)?,
                    epoch: node.epoch_id,
                    validator: validator(&node),
                    funded_at: node.event_by_event_id.block_by_block_id.timestamp,
                })
            })
            .collect()
    }
}
