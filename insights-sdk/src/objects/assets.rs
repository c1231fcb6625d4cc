use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// All assets that can be swapped on Chainflip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Asset {
    #[serde(alias = "btc", alias = "BTC")]
    Btc,
    #[serde(alias = "dot", alias = "DOT")]
    Dot,
    #[serde(alias = "eth", alias = "ETH")]
    Eth,
    #[serde(alias = "flip", alias = "FLIP")]
    Flip,
    #[serde(alias = "usdc", alias = "USDC")]
    Usdc,
}

/// Static display data for an [`Asset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetInfo {
    pub ticker: &'static str,
    pub name: &'static str,
    pub network: &'static str,
    pub decimals: u32,
}

#[derive(Debug, Error)]
pub enum AssetParseError {
    #[error("unknown asset: {0}")]
    UnknownAsset(String),

    #[error("invalid base unit amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },
}

impl Asset {
    pub const ALL: [Asset; 5] = [Asset::Btc, Asset::Dot, Asset::Eth, Asset::Flip, Asset::Usdc];

    pub fn info(self) -> AssetInfo {
        match self {
            Asset::Btc => AssetInfo {
                ticker: "BTC",
                name: "Bitcoin",
                network: "Bitcoin",
                decimals: 8,
            },
            Asset::Dot => AssetInfo {
                ticker: "DOT",
                name: "Polkadot",
                network: "Polkadot",
                decimals: 10,
            },
            Asset::Eth => AssetInfo {
                ticker: "ETH",
                name: "Ethereum",
                network: "Ethereum",
                decimals: 18,
            },
            Asset::Flip => AssetInfo {
                ticker: "FLIP",
                name: "Chainflip",
                network: "Ethereum",
                decimals: 18,
            },
            Asset::Usdc => AssetInfo {
                ticker: "USDC",
                name: "ethUSDC",
                network: "Ethereum",
                decimals: 6,
            },
        }
    }

    pub fn ticker(self) -> &'static str {
        self.info().ticker
    }

    /// Convert an integer amount in the asset's smallest unit into a
    /// human-scale decimal (e.g. satoshi to BTC).
    pub fn from_base_units(self, amount: &str) -> Result<Decimal, AssetParseError> {
        let invalid = |reason: String| AssetParseError::InvalidAmount {
            amount: amount.to_string(),
            reason,
        };

        let trimmed = amount.trim();
        // Postgraphile BigFloat values occasionally carry a ".0" suffix.
        let integer = trimmed.split_once('.').map_or(trimmed, |(int, _)| int);
        let mut value = Decimal::from_str(integer).map_err(|e| invalid(e.to_string()))?;
        value
            .set_scale(self.info().decimals)
            .map_err(|e| invalid(e.to_string()))?;
        Ok(value.normalize())
    }

    /// Same as [`from_base_units`](Self::from_base_units) for amounts that
    /// are already integers, such as the hex-encoded values of the node RPC.
    pub fn from_base_units_u128(self, amount: u128) -> Result<Decimal, AssetParseError> {
        let signed = i128::try_from(amount).map_err(|e| AssetParseError::InvalidAmount {
            amount: amount.to_string(),
            reason: e.to_string(),
        })?;
        Decimal::try_from_i128_with_scale(signed, self.info().decimals)
            .map(|d| d.normalize())
            .map_err(|e| AssetParseError::InvalidAmount {
                amount: amount.to_string(),
                reason: e.to_string(),
            })
    }
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.ticker())
    }
}

impl FromStr for Asset {
    type Err = AssetParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Asset::ALL
            .into_iter()
            .find(|asset| asset.ticker().eq_ignore_ascii_case(s))
            .ok_or_else(|| AssetParseError::UnknownAsset(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base_units_scales_by_decimals() {
        let btc = Asset::Btc.from_base_units("150000000").unwrap();
        assert_eq!(btc, Decimal::from_str("1.5").unwrap());

        let flip = Asset::Flip.from_base_units("600000000000000000000").unwrap();
        assert_eq!(flip, Decimal::from(600));

        let usdc = Asset::Usdc.from_base_units("1234567").unwrap();
        assert_eq!(usdc, Decimal::from_str("1.234567").unwrap());
    }

    #[test]
    fn test_from_base_units_rejects_garbage() {
        assert!(Asset::Eth.from_base_units("not-a-number").is_err());
    }

    #[test]
    fn test_asset_parsing_is_case_insensitive() {
        assert_eq!("btc".parse::<Asset>().unwrap(), Asset::Btc);
        assert_eq!("USDC".parse::<Asset>().unwrap(), Asset::Usdc);
        assert!("doge".parse::<Asset>().is_err());

        let parsed: Asset = serde_json::from_str("\"FLIP\"").unwrap();
        assert_eq!(parsed, Asset::Flip);
        let parsed: Asset = serde_json::from_str("\"Eth\"").unwrap();
        assert_eq!(parsed, Asset::Eth);
    }
}
