//! Response objects of the Chainflip explorer GraphQL endpoint.

use super::base_units;
use compact_str::CompactString;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::OffsetDateTime;

/// Top level GraphQL envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct GraphResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphError {
    pub message: String,
}

/// Relay-style connection (`edges { node { .. } }`).
#[derive(Debug, Clone, Deserialize)]
pub struct Connection<T> {
    #[serde(default = "Vec::new")]
    pub edges: Vec<Edge<T>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Edge<T> {
    pub node: T,
}

/// Plain node list (`nodes { .. }`).
#[derive(Debug, Clone, Deserialize)]
pub struct Nodes<T> {
    #[serde(default = "Vec::new")]
    pub nodes: Vec<T>,
}

impl<T> Connection<T> {
    pub fn into_nodes(self) -> impl Iterator<Item = T> {
        self.edges.into_iter().map(|edge| edge.node)
    }
}

// ---------------------------------------------------------------------------
// Swaps
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapsData {
    pub all_swaps: Connection<SwapNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwapNode {
    pub id: u64,
    /// Explorer asset name (`Btc`, `Usdc`, ...); kept raw so that assets
    /// added to the network later do not break the whole page.
    pub source_asset: CompactString,
    pub destination_asset: CompactString,
    #[serde(deserialize_with = "base_units")]
    pub deposit_amount: String,
    #[serde(default)]
    pub deposit_value_usd: Decimal,
    #[serde(deserialize_with = "base_units")]
    pub egress_amount: String,
    #[serde(default)]
    pub egress_value_usd: Decimal,
    #[serde(with = "time::serde::rfc3339")]
    pub swap_executed_block_timestamp: OffsetDateTime,
}

// ---------------------------------------------------------------------------
// Liquidity deposits
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityDepositsData {
    pub all_liquidity_deposits: Connection<LiquidityDepositNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LiquidityDepositNode {
    pub id: u64,
    pub asset: CompactString,
    #[serde(deserialize_with = "base_units")]
    pub deposit_amount: String,
    #[serde(default)]
    pub deposit_value_usd: Decimal,
    pub lp_account: Option<AccountRef>,
    pub block_by_block_id: BlockRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountRef {
    pub alias: Option<String>,
    pub id_ss58: CompactString,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockRef {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

// ---------------------------------------------------------------------------
// Epochs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochsData {
    pub all_epoches: Connection<EpochNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpochNode {
    pub id: u64,
    #[serde(deserialize_with = "base_units")]
    pub bond: String,
    #[serde(deserialize_with = "base_units")]
    pub total_bonded: String,
    #[serde(default)]
    pub authority_count: u32,
    pub event_by_start_event_id: EventRef,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRef {
    pub block_by_block_id: BlockRef,
}

// ---------------------------------------------------------------------------
// Validator funding events (fundings and redemptions)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingEventsData {
    pub all_validator_funding_events: Connection<FundingEventNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FundingEventNode {
    pub id: u64,
    #[serde(deserialize_with = "base_units")]
    pub amount: String,
    pub epoch_id: u64,
    pub validator_by_validator_id: AccountRef,
    pub event_by_event_id: EventRef,
}

// ---------------------------------------------------------------------------
// CFE versions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfeVersionsData {
    pub all_cfe_versions: Connection<CfeVersionNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfeVersionNode {
    /// The version string, e.g. `1.3.2`.
    pub id: String,
    pub validators_by_cfe_version_id: Connection<CfeValidatorNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CfeValidatorNode {
    pub id_ss58: CompactString,
    pub last_heartbeat_block_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastBlockData {
    pub all_blocks: Nodes<BlockIdNode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BlockIdNode {
    pub id: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_funding_event_parsing() {
        let payload = r#"{
            "data": {
                "allValidatorFundingEvents": {
                    "edges": [{
                        "node": {
                            "id": 3093,
                            "amount": "600000000000000000000",
                            "epochId": 77,
                            "validatorByValidatorId": {
                                "alias": "StakedFLIP (Chorus One #10)",
                                "idSs58": "cFNwGhUje3AJzBykDGs45umgFoGKS9xouSVn1UNz7VG1y4j4n"
                            },
                            "eventByEventId": {
                                "blockByBlockId": { "timestamp": "2024-02-03T04:43:48+00:00" }
                            }
                        }
                    }]
                }
            }
        }"#;

        let response: GraphResponse<FundingEventsData> = serde_json::from_str(payload).unwrap();
        let nodes: Vec<_> = response
            .data
            .unwrap()
            .all_validator_funding_events
            .into_nodes()
            .collect();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].id, 3093);
        assert_eq!(nodes[0].epoch_id, 77);
        assert_eq!(nodes[0].amount, "600000000000000000000");
        assert_eq!(
            nodes[0].validator_by_validator_id.alias.as_deref(),
            Some("StakedFLIP (Chorus One #10)")
        );
    }

    #[test]
    fn test_graph_errors_without_data() {
        let payload = r#"{ "errors": [{ "message": "syntax error" }] }"#;
        let response: GraphResponse<SwapsData> = serde_json::from_str(payload).unwrap();
        assert!(response.data.is_none());
        assert_eq!(response.errors[0].message, "syntax error");
    }

    #[test]
    fn test_swap_amounts_accept_numbers() {
        let payload = r#"{
            "id": 12,
            "sourceAsset": "Btc",
            "destinationAsset": "Eth",
            "depositAmount": 150000000,
            "depositValueUsd": "63000.12",
            "egressAmount": "25000000000000000000",
            "egressValueUsd": 62900.5,
            "swapExecutedBlockTimestamp": "2024-02-03T04:43:48Z"
        }"#;
        let node: SwapNode = serde_json::from_str(payload).unwrap();
        assert_eq!(node.deposit_amount, "150000000");
        assert_eq!(node.source_asset, "Btc");
        assert_eq!(node.destination_asset, "Eth");
    }
}
