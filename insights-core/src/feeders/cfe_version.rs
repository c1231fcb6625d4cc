use super::cex_movement::utc_today;
use super::{FeedError, Feeder};
use crate::events::{CfeVersionInfo, CfeVersionsInfo};
use crate::utils::Version;
use async_trait::async_trait;
use insights_sdk::client::{Upstream, fetch_graph};
use insights_sdk::objects::graph::{CfeVersionNode, CfeVersionsData, LastBlockData};
use itertools::Itertools;
use std::sync::Arc;
use time::{Date, Duration};
use tracing::debug;

const CFE_VERSIONS_QUERY: &str = r#"
{
    allCfeVersions(orderBy: ID_DESC) {
        edges {
            node {
                id
                validatorsByCfeVersionId {
                    edges {
                        node {
                            idSs58
                            lastHeartbeatBlockId
                        }
                    }
                }
            }
        }
    }
}
"#;

const LAST_BLOCK_QUERY: &str = r#"
{
    allBlocks(orderBy: ID_DESC, first: 1) {
        nodes {
            id
        }
    }
}
"#;

/// A validator counts as online if it heartbeated within this many blocks
/// of the chain tip.
pub const HEARTBEAT_WINDOW_BLOCKS: u64 = 600;

/// Announces the CFE release distribution across validators, once per UTC
/// day. The cursor is the date of the last announcement.
pub struct CfeVersionFeeder {
    upstream: Arc<dyn Upstream>,
    today: fn() -> Date,
}

impl CfeVersionFeeder {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self {
            upstream,
            today: utc_today,
        }
    }

    /// Replace the UTC clock.
    pub fn with_clock(mut self, today: fn() -> Date) -> Self {
        self.today = today;
        self
    }
}

fn summarize(node: CfeVersionNode, last_block: u64) -> Result<CfeVersionInfo, FeedError> {
    let version: Version = node.id.parse().map_err(FeedError::Invalid)?;
    let online_since = last_block.saturating_sub(HEARTBEAT_WINDOW_BLOCKS);

    let mut validators = 0;
    let mut online = 0;
    for validator in node.validators_by_cfe_version_id.into_nodes() {
        validators += 1;
        if validator
            .last_heartbeat_block_id
            .is_some_and(|block| block >= online_since)
        {
            online += 1;
        }
    }

    Ok(CfeVersionInfo {
        version,
        validators,
        online,
    })
}

#[async_trait]
impl Feeder for CfeVersionFeeder {
    type Event = CfeVersionsInfo;

    fn name(&self) -> &'static str {
        "cfe_version"
    }

    fn default_cursor(&self) -> Date {
        let today = (self.today)();
        today.checked_sub(Duration::days(1)).unwrap_or(today)
    }

    async fn fetch(&self, cursor: &Date) -> Result<Vec<CfeVersionsInfo>, FeedError> {
        let today = (self.today)();
        if *cursor >= today {
            debug!(date = %today, "CFE versions already announced today");
            return Ok(Vec::new());
        }

        let data: CfeVersionsData = fetch_graph(self.upstream.as_ref(), CFE_VERSIONS_QUERY).await?;
        let blocks: LastBlockData = fetch_graph(self.upstream.as_ref(), LAST_BLOCK_QUERY).await?;
        let last_block = blocks
            .all_blocks
            .nodes
            .first()
            .map(|block| block.id)
            .ok_or_else(|| FeedError::Invalid("no blocks returned".to_string()))?;

        let versions: Vec<CfeVersionInfo> = data
            .all_cfe_versions
            .into_nodes()
            .map(|node| summarize(node, last_block))
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .sorted_by(|a, b| a.version.cmp(&b.version))
            .collect();

        Ok(vec![CfeVersionsInfo {
            date: today,
            previous_date: *cursor,
            versions,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeders::test_support::ScriptedUpstream;
    use serde_json::json;
    use time::macros::date;

    fn feb_5th() -> Date {
        date!(2024 - 02 - 05)
    }

    fn versions_payload() -> serde_json::Value {
        json!({ "data": { "allCfeVersions": { "edges": [
            { "node": { "id": "1.2.0", "validatorsByCfeVersionId": { "edges": [
                { "node": { "idSs58": "cFa", "lastHeartbeatBlockId": 10_000 } },
                { "node": { "idSs58": "cFb", "lastHeartbeatBlockId": 9_000 } },
                { "node": { "idSs58": "cFc", "lastHeartbeatBlockId": null } }
            ]}}},
            { "node": { "id": "1.1.6", "validatorsByCfeVersionId": { "edges": [
                { "node": { "idSs58": "cFd", "lastHeartbeatBlockId": 9_500 } }
            ]}}}
        ]}}})
    }

    #[tokio::test]
    async fn test_one_sorted_event_per_day() {
        let upstream = Arc::new(ScriptedUpstream::new(vec![
            Ok(versions_payload()),
            Ok(json!({ "data": { "allBlocks": { "nodes": [{ "id": 10_050 }] } } })),
        ]));
        let feeder = CfeVersionFeeder::new(upstream).with_clock(feb_5th);
        assert_eq!(feeder.default_cursor(), date!(2024 - 02 - 04));

        let events = feeder.fetch(&date!(2024 - 02 - 01)).await.unwrap();
        assert_eq!(events.len(), 1);

        let event = &events[0];
        assert_eq!(event.date, feb_5th());
        assert_eq!(event.previous_date, date!(2024 - 02 - 01));
        assert_eq!(event.total_validators(), 4);

        let versions: Vec<String> = event.versions.iter().map(|v| v.version.to_string()).collect();
        assert_eq!(versions, vec!["1.1.6", "1.2.0"]);
        assert_eq!((event.versions[0].validators, event.versions[0].online), (1, 1));
        assert_eq!((event.versions[1].validators, event.versions[1].online), (3, 1));
    }

    #[tokio::test]
    async fn test_already_announced_today_skips_upstream() {
        let upstream = Arc::new(ScriptedUpstream::single(versions_payload()));
        let feeder = CfeVersionFeeder::new(upstream.clone()).with_clock(feb_5th);

        let events = feeder.fetch(&feb_5th()).await.unwrap();
        assert!(events.is_empty());
        assert!(upstream.requests.lock().unwrap().is_empty());
    }
}
