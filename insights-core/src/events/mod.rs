//! Event system for the announcement pipeline.
//!
//! # Event Flow
//!
//! 1. Each feeder sends its own event type into its [`Pipeline`]
//! 2. A normalizer per pipeline wraps events into [`BroadcastEvent`]
//! 3. All normalizers merge into the fan-out via [`broadcast_channel`]
//! 4. The fan-out offers every event to each sink's [`sink_slot`]
//!
//! Completion flows the same way: a drained source ends its normalizer,
//! the last normalizer ends the fan-out, and the fan-out closes every slot.

pub mod broadcast;
pub mod channels;
pub mod types;

pub use broadcast::BroadcastEvent;
pub use channels::{
    BroadcastReceiver, BroadcastSender, DEFAULT_CHANNEL_BUFFER, Pipeline, PipelineCompleter,
    PipelineSource, SendError, SlotReceiver, SlotSender, broadcast_channel, sink_slot,
};
pub use types::{
    AccountRef, CexMovementInfo, CfeVersionInfo, CfeVersionsInfo, EpochInfo, FundingInfo,
    IncomingLiquidityInfo, OrderedEvent, RedemptionInfo, SwapInfo, SwapLimit, SwapLimitsInfo,
};
