//! The tagged union that lets heterogeneous feeder streams share one
//! distribution point.

use super::types::{
    CexMovementInfo, CfeVersionsInfo, EpochInfo, FundingInfo, IncomingLiquidityInfo,
    RedemptionInfo, SwapInfo, SwapLimitsInfo,
};

/// Exactly one feeder event, wrapped for the fan-out.
///
/// Built 1:1 from a feeder event via `From`; has no identity of its own.
#[derive(Debug, Clone, PartialEq)]
pub enum BroadcastEvent {
    Swap(SwapInfo),
    IncomingLiquidity(IncomingLiquidityInfo),
    Epoch(EpochInfo),
    Funding(FundingInfo),
    Redemption(RedemptionInfo),
    CexMovement(CexMovementInfo),
    CfeVersions(CfeVersionsInfo),
    SwapLimits(SwapLimitsInfo),
}

impl BroadcastEvent {
    /// Short variant tag for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            BroadcastEvent::Swap(_) => "swap",
            BroadcastEvent::IncomingLiquidity(_) => "incoming_liquidity",
            BroadcastEvent::Epoch(_) => "epoch",
            BroadcastEvent::Funding(_) => "funding",
            BroadcastEvent::Redemption(_) => "redemption",
            BroadcastEvent::CexMovement(_) => "cex_movement",
            BroadcastEvent::CfeVersions(_) => "cfe_versions",
            BroadcastEvent::SwapLimits(_) => "swap_limits",
        }
    }
}

macro_rules! impl_from_event {
    ($($info:ty => $variant:ident),* $(,)?) => {
        $(
            impl From<$info> for BroadcastEvent {
                fn from(info: $info) -> Self {
                    BroadcastEvent::$variant(info)
                }
            }
        )*
    };
}

impl_from_event! {
    SwapInfo => Swap,
    IncomingLiquidityInfo => IncomingLiquidity,
    EpochInfo => Epoch,
    FundingInfo => Funding,
    RedemptionInfo => Redemption,
    CexMovementInfo => CexMovement,
    CfeVersionsInfo => CfeVersions,
    SwapLimitsInfo => SwapLimits,
}
