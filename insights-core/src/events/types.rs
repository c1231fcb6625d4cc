//! Event type definitions, one per feeder.
//!
//! Events are immutable snapshots of an upstream item, already converted to
//! human-scale amounts. Each carries exactly one ordering key, used by its
//! feeder to sort a batch and to bound cursor advancement.

use crate::cursor::CursorValue;
use crate::utils::Version;
use compact_str::CompactString;
use insights_sdk::objects::Asset;
use rust_decimal::Decimal;
use time::{Date, OffsetDateTime};

/// An event with a feeder-specific ordering key.
pub trait OrderedEvent: Send + Sync + 'static {
    type Key: CursorValue;

    fn key(&self) -> Self::Key;
}

/// A validator or liquidity provider account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountRef {
    pub alias: Option<String>,
    pub id_ss58: CompactString,
}

impl AccountRef {
    /// The alias if one is registered, otherwise a shortened ss58 address.
    pub fn display_name(&self) -> String {
        match self.alias.as_deref().map(str::trim) {
            Some(alias) if !alias.is_empty() => alias.to_string(),
            _ => short_address(&self.id_ss58),
        }
    }
}

fn short_address(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}…{tail}")
}

/// A completed swap.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapInfo {
    pub id: u64,
    pub source_asset: Asset,
    pub destination_asset: Asset,
    pub deposit_amount: Decimal,
    pub deposit_value_usd: Decimal,
    pub egress_amount: Decimal,
    pub egress_value_usd: Decimal,
    pub executed_at: OffsetDateTime,
}

impl OrderedEvent for SwapInfo {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

/// Liquidity deposited into a pool by a liquidity provider.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingLiquidityInfo {
    pub id: u64,
    pub asset: Asset,
    pub amount: Decimal,
    pub value_usd: Decimal,
    pub provider: Option<AccountRef>,
    pub deposited_at: OffsetDateTime,
}

impl OrderedEvent for IncomingLiquidityInfo {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

/// A new authority set (epoch rotation).
#[derive(Debug, Clone, PartialEq)]
pub struct EpochInfo {
    pub id: u64,
    /// Minimum active bid in FLIP.
    pub bond: Decimal,
    /// Total FLIP bonded by the new authority set.
    pub total_bonded: Decimal,
    pub authority_count: u32,
    pub started_at: OffsetDateTime,
}

impl OrderedEvent for EpochInfo {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

/// FLIP added to a validator's stake.
#[derive(Debug, Clone, PartialEq)]
pub struct FundingInfo {
    pub id: u64,
    pub amount: Decimal,
    pub epoch: u64,
    pub validator: AccountRef,
    pub funded_at: OffsetDateTime,
}

impl OrderedEvent for FundingInfo {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

/// FLIP redeemed from a validator's stake.
#[derive(Debug, Clone, PartialEq)]
pub struct RedemptionInfo {
    pub id: u64,
    pub amount: Decimal,
    pub epoch: u64,
    pub validator: AccountRef,
    pub redeemed_at: OffsetDateTime,
}

impl OrderedEvent for RedemptionInfo {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }
}

/// FLIP moved to and from centralised exchanges on one completed day.
///
/// Keyed by `date`, so the order survives the year boundary even though the
/// upstream rows only carry a day of the year.
#[derive(Debug, Clone, PartialEq)]
pub struct CexMovementInfo {
    pub day_of_year: u32,
    pub date: Date,
    pub flip_to_cex: Decimal,
    pub flip_from_cex: Decimal,
}

impl CexMovementInfo {
    /// Net FLIP flow into exchanges; negative means a net outflow.
    pub fn net_to_cex(&self) -> Decimal {
        self.flip_to_cex - self.flip_from_cex
    }
}

impl OrderedEvent for CexMovementInfo {
    type Key = Date;

    fn key(&self) -> Date {
        self.date
    }
}

/// Validator adoption of one CFE release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfeVersionInfo {
    pub version: Version,
    pub validators: u32,
    /// Validators whose last heartbeat is recent relative to the chain tip.
    pub online: u32,
}

/// Daily CFE version distribution across all validators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CfeVersionsInfo {
    pub date: Date,
    pub previous_date: Date,
    /// Sorted ascending by version.
    pub versions: Vec<CfeVersionInfo>,
}

impl CfeVersionsInfo {
    pub fn total_validators(&self) -> u32 {
        self.versions.iter().map(|v| v.validators).sum()
    }
}

impl OrderedEvent for CfeVersionsInfo {
    type Key = Date;

    fn key(&self) -> Date {
        self.date
    }
}

/// Maximum swap amount for one asset; `None` means unlimited.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapLimit {
    pub asset: Asset,
    pub maximum: Option<Decimal>,
}

/// The swap limits in force as of a node release.
#[derive(Debug, Clone, PartialEq)]
pub struct SwapLimitsInfo {
    pub node_version: Version,
    /// Sorted by asset.
    pub limits: Vec<SwapLimit>,
}

impl OrderedEvent for SwapLimitsInfo {
    type Key = Version;

    fn key(&self) -> Version {
        self.node_version.clone()
    }
}
