//! Response objects of the State Chain node JSON-RPC endpoint.

use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Deserialize)]
pub struct RpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

/// Result of `cf_swapping_environment`.
#[derive(Debug, Clone, Deserialize)]
pub struct SwappingEnvironment {
    /// Per chain, per asset ticker, the hex-encoded maximum swap amount in
    /// base units. `null` means the asset is not limited.
    pub maximum_swap_amounts: BTreeMap<String, BTreeMap<String, Option<String>>>,
}

/// Parse a `0x`-prefixed hex quantity as returned by the node.
pub fn parse_hex_u128(value: &str) -> Option<u128> {
    let digits = value.strip_prefix("0x").unwrap_or(value);
    if digits.is_empty() {
        return None;
    }
    u128::from_str_radix(digits, 16).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_swapping_environment() {
        let payload = r#"{
            "jsonrpc": "2.0",
            "id": 1,
            "result": {
                "maximum_swap_amounts": {
                    "Bitcoin": { "BTC": "0x5f5e100" },
                    "Ethereum": { "ETH": null, "FLIP": null, "USDC": "0x2540be400" }
                },
                "network_fee_hundredth_pips": 1000
            }
        }"#;
        let response: RpcResponse<SwappingEnvironment> = serde_json::from_str(payload).unwrap();
        let env = response.result.unwrap();
        let btc = env.maximum_swap_amounts["Bitcoin"]["BTC"].as_deref().unwrap();
        assert_eq!(parse_hex_u128(btc), Some(100_000_000));
        assert!(env.maximum_swap_amounts["Ethereum"]["ETH"].is_none());
    }

    #[test]
    fn test_parse_hex_rejects_empty() {
        assert_eq!(parse_hex_u128("0x"), None);
        assert_eq!(parse_hex_u128("0xzz"), None);
        assert_eq!(parse_hex_u128("ff"), Some(255));
    }
}
