//! Feeders: independent pollers, one per upstream source type.
//!
//! Every feeder implements [`Feeder`] (how to fetch and convert one batch)
//! and is driven by a [`FeederRunner`], which owns the polling loop, the
//! cursor and the pipeline:
//!
//! 1. Load the cursor, seeding the feeder's default on first run
//! 2. Fetch a batch, keep the items newer than the cursor, sort ascending
//! 3. Forward each item into the pipeline in order
//! 4. Persist the key of the last forwarded item as the new cursor, or the
//!    key of a later item the feeder had to drop, whichever is higher
//! 5. Sleep a jittered delay and repeat
//!
//! Upstream failures never escape the loop. The shutdown signal is observed
//! at every suspension point (fetch, send, sleep).

mod cex_movement;
mod cfe_version;
mod epoch;
mod funding;
mod liquidity;
mod redemption;
mod swap;
mod swap_limits;

pub use cex_movement::CexMovementFeeder;
pub use cfe_version::CfeVersionFeeder;
pub use epoch::EpochFeeder;
pub use funding::FundingFeeder;
pub use liquidity::IncomingLiquidityFeeder;
pub use redemption::RedemptionFeeder;
pub use swap::SwapFeeder;
pub use swap_limits::SwapLimitsFeeder;

use crate::cursor::{CursorError, CursorStore};
use crate::events::{OrderedEvent, Pipeline};
use crate::utils::{cancelled, jittered, sleep_or_cancel};
use async_trait::async_trait;
use insights_sdk::client::ClientError;
use insights_sdk::objects::AssetParseError;
use itertools::Itertools;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that can occur while polling an upstream.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport, status or envelope error from the upstream client
    #[error("upstream error: {0}")]
    Upstream(ClientError),

    /// Payload did not decode into the expected shape
    #[error("malformed response: {0}")]
    Malformed(#[from] serde_json::Error),

    /// An amount could not be converted
    #[error("invalid amount: {0}")]
    Amount(#[from] AssetParseError),

    /// Any other inconsistency in the upstream data
    #[error("invalid upstream data: {0}")]
    Invalid(String),

    /// The cursor could not be read or written
    #[error(transparent)]
    Cursor(#[from] CursorError),
}

impl From<ClientError> for FeedError {
    fn from(e: ClientError) -> Self {
        match e {
            ClientError::Json(e) => FeedError::Malformed(e),
            other => FeedError::Upstream(other),
        }
    }
}

/// Key type of a feeder's events.
pub type FeederKey<F> = <<F as Feeder>::Event as OrderedEvent>::Key;

/// One converted upstream batch.
pub struct Page<E: OrderedEvent> {
    pub items: Vec<E>,
    /// Highest key among upstream items that could not be converted and were
    /// dropped. The cursor may move past them.
    pub skipped: Option<E::Key>,
}

impl<E: OrderedEvent> Page<E> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            skipped: None,
        }
    }

    pub fn skip(&mut self, key: E::Key) {
        if self.skipped.as_ref().is_none_or(|skipped| key > *skipped) {
            self.skipped = Some(key);
        }
    }
}

impl<E: OrderedEvent> Default for Page<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: OrderedEvent> From<Vec<E>> for Page<E> {
    fn from(items: Vec<E>) -> Self {
        Self {
            items,
            skipped: None,
        }
    }
}

/// One upstream source type.
///
/// Implementations only know how to fetch and convert; ordering, cursor
/// handling, retries and cancellation live in [`FeederRunner`].
#[async_trait]
pub trait Feeder: Send + Sync + 'static {
    type Event: OrderedEvent;

    /// Name used for logging and for the pipeline.
    fn name(&self) -> &'static str;

    /// Cursor seeded on first run.
    fn default_cursor(&self) -> FeederKey<Self>;

    /// Fetch the current upstream batch. Items at or below `cursor` may be
    /// included; the runner filters them out.
    async fn fetch(&self, cursor: &FeederKey<Self>) -> Result<Vec<Self::Event>, FeedError>;

    /// Same as [`fetch`](Self::fetch), also reporting items that were
    /// dropped during conversion. This is what the runner polls.
    async fn fetch_page(&self, cursor: &FeederKey<Self>) -> Result<Page<Self::Event>, FeedError> {
        self.fetch(cursor).await.map(Page::from)
    }
}

/// Loop timing for one feeder.
#[derive(Debug, Clone, Copy)]
pub struct FeederSettings {
    pub enabled: bool,
    /// Grace period before the first poll, so sinks can connect.
    pub feeding_delay: Duration,
    /// Base delay between polls; jittered on every use.
    pub query_delay: Duration,
}

/// Drives a [`Feeder`] until shutdown.
pub struct FeederRunner<F: Feeder> {
    feeder: F,
    cursor_store: CursorStore<FeederKey<F>>,
    pipeline: Pipeline<F::Event>,
    settings: FeederSettings,
}

impl<F: Feeder> FeederRunner<F> {
    pub fn new(
        feeder: F,
        cursor_store: CursorStore<FeederKey<F>>,
        pipeline: Pipeline<F::Event>,
        settings: FeederSettings,
    ) -> Self {
        Self {
            feeder,
            cursor_store,
            pipeline,
            settings,
        }
    }

    /// Run the feeder.
    ///
    /// Returns `Ok(())` on shutdown, when disabled, or once its pipeline
    /// stops accepting items. Only an unreadable cursor at startup is
    /// reported as an error.
    pub async fn run(self) -> Result<(), FeedError> {
        let feeder = self.feeder.name();
        let mut shutdown_rx = self.pipeline.shutdown_rx();

        if !self.settings.enabled {
            info!(feeder, "Feeder not enabled, skipping");
            return Ok(());
        }

        info!(feeder, "Starting feeder");

        if !sleep_or_cancel(self.settings.feeding_delay, &mut shutdown_rx).await {
            info!(feeder, "Stopping feeder before first poll");
            return Ok(());
        }

        let mut cursor = self
            .cursor_store
            .load_or_seed(self.feeder.default_cursor())
            .await
            .inspect_err(|e| error!(feeder, error = %e, "Failed to load cursor"))?;
        info!(feeder, cursor = %cursor, "Loaded cursor");

        loop {
            let fetched = tokio::select! {
                biased;
                _ = cancelled(&mut shutdown_rx) => break,
                fetched = self.feeder.fetch_page(&cursor) => fetched,
            };

            match fetched {
                Ok(page) => {
                    let fresh: Vec<F::Event> = page
                        .items
                        .into_iter()
                        .filter(|item| item.key() > cursor)
                        .sorted_by_key(|item| item.key())
                        .collect();

                    let mut next = None;
                    if !fresh.is_empty() {
                        match self.forward(fresh).await {
                            Some(last) => next = Some(last),
                            None => break,
                        }
                    }
                    if let Some(skipped) = page.skipped.filter(|skipped| *skipped > cursor) {
                        debug!(feeder, key = %skipped, "Moving cursor past dropped items");
                        next = Some(match next {
                            Some(last) if last > skipped => last,
                            _ => skipped,
                        });
                    }

                    match next {
                        Some(next) => {
                            cursor = next;
                            if let Err(e) = self.cursor_store.store(&cursor).await {
                                error!(
                                    feeder,
                                    cursor = %cursor,
                                    error = %e,
                                    "Failed to persist cursor"
                                );
                            }
                        }
                        None => info!(feeder, cursor = %cursor, "Nothing new to announce"),
                    }
                }
                Err(e) => {
                    warn!(feeder, error = %e, "Fetch failed, retrying after delay");
                }
            }

            if !sleep_or_cancel(jittered(self.settings.query_delay), &mut shutdown_rx).await {
                break;
            }
        }

        info!(feeder, cursor = %cursor, "Stopping feeder");
        Ok(())
    }

    /// Forward a sorted batch. Returns the key of the last item, or `None`
    /// if the pipeline refused an item part-way (the cursor must not move).
    async fn forward(&self, batch: Vec<F::Event>) -> Option<FeederKey<F>> {
        let feeder = self.feeder.name();
        let total = batch.len();
        let mut last = None;

        for item in batch {
            let key = item.key();
            if let Err(e) = self.pipeline.send(item).await {
                info!(feeder, reason = %e, "Pipeline closed mid-batch");
                return None;
            }
            debug!(feeder, key = %key, "Forwarded item");
            last = Some(key);
        }

        info!(feeder, count = total, "Forwarded batch");
        last
    }
}
