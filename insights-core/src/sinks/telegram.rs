use super::format::{self, Markup};
use super::{AnnouncementChannel, DeliveryError};
use crate::config::Thresholds;
use crate::events::BroadcastEvent;
use async_trait::async_trait;
use insights_sdk::client::TelegramClient;
use tracing::{debug, info};

/// Announces every variant in a Telegram chat.
pub struct TelegramSink {
    client: TelegramClient,
    explorer_url: String,
    thresholds: Thresholds,
    bot_name: Option<String>,
}

impl TelegramSink {
    pub fn new(
        client: TelegramClient,
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
impl AnnouncementChannel for TelegramSink {
    fn name(&self) -> &'static str {
        "telegram"
    }

    fn render(&self, event: &BroadcastEvent) -> Option<String> {
        const MARKUP: Markup = Markup::Telegram;
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
        let bot_name = self.client.get_me().await?;
        info!(sink = "telegram", bot = %bot_name, "Connected to Telegram");
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
            debug!(sink = "telegram", bot = %bot_name, "Disconnected from Telegram");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::test_support::{all_events, announced_kinds, swap};
    use rust_decimal::Decimal;

    fn sink(thresholds: Thresholds) -> TelegramSink {
        let client =
            TelegramClient::new("123:abc", "@chainflip_insights", "insights-test").unwrap();
        TelegramSink::new(client, "https://scan.chainflip.io/swaps/", thresholds)
    }

    #[test]
    fn test_announces_every_variant() {
        let sink = sink(Thresholds::default());
        assert_eq!(announced_kinds(&sink).len(), all_events().len());
    }

    #[test]
    fn test_swap_uses_telegram_markdown() {
        let sink = sink(Thresholds {
            swap_usd: Decimal::from(100),
            liquidity_usd: Decimal::ZERO,
        });
        let text = sink.render(&swap(2_000)).unwrap();
        assert!(text.starts_with("🐟 Swapped *2000.00 USDC* ($2000.00)"), "{text}");
        assert!(sink.render(&swap(99)).is_none());
    }
}
