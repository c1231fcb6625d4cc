//! Sinks: serial consumers that announce events on one external channel.
//!
//! Each channel implements [`AnnouncementChannel`] (which variants it
//! announces and how to reach the platform) and is driven by a
//! [`SinkRunner`], which owns the slot, the session state and teardown:
//!
//! - Items are taken from the sink's slot one at a time, in order
//! - Variants the channel does not announce are skipped silently
//! - The session is established lazily, before the first delivery
//! - A failed connect or delivery is logged and the next item proceeds
//! - On completion or shutdown the session is torn down at most once

mod discord;
pub mod format;
mod mastodon;
mod telegram;
mod twitter;

pub use discord::DiscordSink;
pub use mastodon::MastodonSink;
pub use telegram::TelegramSink;
pub use twitter::TwitterSink;

use crate::events::{BroadcastEvent, SlotReceiver};
use crate::utils::cancelled;
use async_trait::async_trait;
use insights_sdk::client::ClientError;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Errors that can occur while announcing on a channel.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The platform client failed
    #[error("client error: {0}")]
    Client(#[from] ClientError),

    /// Delivery attempted without an established session
    #[error("session not established")]
    NotConnected,
}

/// One external announcement channel.
#[async_trait]
pub trait AnnouncementChannel: Send + 'static {
    /// Name used for logging.
    fn name(&self) -> &'static str;

    /// Platform text for `event`, or `None` if this channel does not
    /// announce it.
    fn render(&self, event: &BroadcastEvent) -> Option<String>;

    /// Authenticate and establish the session.
    async fn connect(&mut self) -> Result<(), DeliveryError>;

    /// Post one announcement.
    async fn deliver(&mut self, text: &str) -> Result<(), DeliveryError>;

    /// Tear the session down. Best effort.
    async fn disconnect(&mut self);
}

/// Drives an [`AnnouncementChannel`] until its slot closes or shutdown.
pub struct SinkRunner<C: AnnouncementChannel> {
    channel: C,
    slot: SlotReceiver,
    shutdown_rx: watch::Receiver<bool>,
    enabled: bool,
    connected: bool,
}

impl<C: AnnouncementChannel> SinkRunner<C> {
    /// Create a new SinkRunner.
    ///
    /// A disabled runner still drains its slot so the topology can
    /// complete, but never connects or delivers.
    pub fn new(
        channel: C,
        slot: SlotReceiver,
        shutdown_rx: watch::Receiver<bool>,
        enabled: bool,
    ) -> Self {
        Self {
            channel,
            slot,
            shutdown_rx,
            enabled,
            connected: false,
        }
    }

    /// Run the sink.
    pub async fn run(mut self) {
        let sink = self.channel.name();
        if self.enabled {
            info!(sink, "Sink started");
        } else {
            info!(sink, "Sink not enabled, draining only");
        }

        loop {
            let event = tokio::select! {
                biased;
                _ = cancelled(&mut self.shutdown_rx) => {
                    info!(sink, "Sink received shutdown signal");
                    break;
                }
                event = self.slot.recv() => event,
            };

            let Some(event) = event else {
                info!(sink, "Sink slot completed");
                break;
            };

            if !self.enabled {
                continue;
            }

            let Some(text) = self.channel.render(&event) else {
                debug!(sink, kind = event.kind(), "Event not announced on this channel");
                continue;
            };

            if !self.announce(event.kind(), &text).await {
                break;
            }
        }

        self.teardown().await;
        info!(sink, "Sink shutdown complete");
    }

    /// Connect if needed and deliver. Returns `false` if cancelled.
    async fn announce(&mut self, kind: &'static str, text: &str) -> bool {
        let sink = self.channel.name();

        if !self.connected {
            let connected = tokio::select! {
                biased;
                _ = cancelled(&mut self.shutdown_rx) => return false,
                connected = self.channel.connect() => connected,
            };
            match connected {
                Ok(()) => {
                    info!(sink, "Sink session established");
                    self.connected = true;
                }
                Err(e) => {
                    warn!(sink, kind, error = %e, "Failed to connect, dropping announcement");
                    return true;
                }
            }
        }

        let delivered = tokio::select! {
            biased;
            _ = cancelled(&mut self.shutdown_rx) => return false,
            delivered = self.channel.deliver(text) => delivered,
        };
        match delivered {
            Ok(()) => debug!(sink, kind, "Announcement delivered"),
            Err(e) => warn!(sink, kind, error = %e, "Failed to deliver announcement"),
        }
        true
    }

    async fn teardown(&mut self) {
        if self.connected {
            debug!(sink = self.channel.name(), "Disconnecting sink session");
            self.channel.disconnect().await;
            self.connected = false;
        }
    }
}
