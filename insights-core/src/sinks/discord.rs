use super::format::{self, Markup};
use super::{AnnouncementChannel, DeliveryError};
use crate::config::Thresholds;
use crate::events::BroadcastEvent;
use async_trait::async_trait;
use insights_sdk::client::DiscordClient;
use tracing::{debug, info};

/// Announces every variant in a Discord channel.
pub struct DiscordSink {
    client: DiscordClient,
    explorer_url: String,
    thresholds: Thresholds,
    bot_name: Option<String>,
}

impl DiscordSink {
    pub fn new(
        client: DiscordClient,
        explorer_url: impl Into<String>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            client,
            explorer_url: explorer_url.into(),
            thresholds,
            bot_name: None,
        }
    }
}

#[async_trait]
impl AnnouncementChannel for DiscordSink {
    fn name(&self) -> &'static str {
        "discord"
    }

    fn render(&self, event: &BroadcastEvent) -> Option<String> {
        const MARKUP: Markup = Markup::Discord;
        match event {
            BroadcastEvent::Swap(info) => self
                .thresholds
                .swap_passes(info.deposit_value_usd)
                .then(|| format::swap(info, &self.explorer_url, MARKUP)),
            BroadcastEvent::IncomingLiquidity(info) => self
                .thresholds
                .liquidity_passes(info.value_usd)
                .then(|| format::incoming_liquidity(info, MARKUP)),
            BroadcastEvent::Epoch(info) => Some(format::epoch(info, MARKUP)),
            BroadcastEvent::Funding(info) => Some(format::funding(info, MARKUP)),
            BroadcastEvent::Redemption(info) => Some(format::redemption(info, MARKUP)),
            BroadcastEvent::CexMovement(info) => Some(format::cex_movement(info, MARKUP)),
            BroadcastEvent::CfeVersions(info) => Some(format::cfe_versions(info, MARKUP)),
            BroadcastEvent::SwapLimits(info) => Some(format::swap_limits(info, MARKUP)),
        }
    }

    async fn connect(&mut self) -> Result<(), DeliveryError> {
        let bot_name = self.client.current_user().await?;
        info!(sink = "discord", bot = %bot_name, "Logged in to Discord");
        self.bot_name = Some(bot_name);
        Ok(())
    }

    async fn deliver(&mut self, text: &str) -> Result<(), DeliveryError> {
        if self.bot_name.is_none() {
            return Err(DeliveryError::NotConnected);
        }
        self.client.send_message(text).await?;
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(bot_name) = self.bot_name.take() {
            debug!(sink = "discord", bot = %bot_name, "Logged out of Discord");
        }
    }
}
