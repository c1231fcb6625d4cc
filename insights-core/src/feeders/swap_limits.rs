use super::{FeedError, Feeder};
use crate::events::{SwapLimit, SwapLimitsInfo};
use crate::utils::Version;
use async_trait::async_trait;
use insights_sdk::client::{Upstream, fetch_rpc};
use insights_sdk::objects::Asset;
use insights_sdk::objects::rpc::{SwappingEnvironment, parse_hex_u128};
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

/// Announces per-asset maximum swap amounts whenever the State Chain node
/// reports a new release. The cursor is the last announced node version.
pub struct SwapLimitsFeeder {
    upstream: Arc<dyn Upstream>,
}

impl SwapLimitsFeeder {
    pub fn new(upstream: Arc<dyn Upstream>) -> Self {
        Self { upstream }
    }
}

fn collect_limits(environment: SwappingEnvironment) -> Result<Vec<SwapLimit>, FeedError> {
    let mut limits = Vec::new();
    for (chain, assets) in environment.maximum_swap_amounts {
        for (ticker, maximum) in assets {
            let Ok(asset) = ticker.parse::<Asset>() else {
                debug!(chain = %chain, ticker = %ticker, "Skipping limit of unsupported asset");
                continue;
            };
            let maximum = match maximum {
                Some(hex) => {
                    let base_units = parse_hex_u128(&hex).ok_or_else(|| {
                        FeedError::Invalid(format!("swap limit of {ticker}: {hex:?}"))
                    })?;
                    Some(asset.from_base_units_u128(base_units)?)
                }
                None => None,
            };
            limits.push(SwapLimit { asset, maximum });
        }
    }
    limits.sort_by_key(|limit| limit.asset);
    Ok(limits)
}

#[async_trait]
impl Feeder for SwapLimitsFeeder {
    type Event = SwapLimitsInfo;

    fn name(&self) -> &'static str {
        "swap_limits"
    }

    fn default_cursor(&self) -> Version {
        Version::default()
    }

    async fn fetch(&self, cursor: &Version) -> Result<Vec<SwapLimitsInfo>, FeedError> {
        let raw: String = fetch_rpc(self.upstream.as_ref(), "system_version", json!([])).await?;
        let node_version: Version = raw.parse().map_err(FeedError::Invalid)?;
        if node_version <= *cursor {
            return Ok(Vec::new());
        }

        let environment: SwappingEnvironment =
            fetch_rpc(self.upstream.as_ref(), "cf_swapping_environment", json!([])).await?;

        Ok(vec![SwapLimitsInfo {
            node_version,
            limits: collect_limits(environment)?,
        }])
    }
}
