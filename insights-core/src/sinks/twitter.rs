use super::format::{self, Markup};
use super::{AnnouncementChannel, DeliveryError};
use crate::config::Thresholds;
use crate::events::BroadcastEvent;
use async_trait::async_trait;
use insights_sdk::client::TwitterClient;
use tracing::{debug, info};

/// Tweets swaps, liquidity, epochs, CEX movements and swap limits.
pub struct TwitterSink {
    client: TwitterClient,
    explorer_url: String,
    thresholds: Thresholds,
    username: Option<String>,
}

impl TwitterSink {
    pub fn new(
        client: TwitterClient,
        explorer_url: impl Into<String>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            client,
            explorer_url: explorer_url.into(),
            thresholds,
            username: None,
        }
    }
}

#[async_trait]
impl AnnouncementChannel for TwitterSink {
    fn name(&self) -> &'static str {
        "twitter"
    }

    fn render(&self, event: &BroadcastEvent) -> Option<String> {
        const MARKUP: Markup = Markup::Plain;
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
            BroadcastEvent::CexMovement(info) => Some(format::cex_movement(info, MARKUP)),
            BroadcastEvent::SwapLimits(info) => Some(format::swap_limits(info, MARKUP)),
            BroadcastEvent::Funding(_)
            | BroadcastEvent::Redemption(_)
            | BroadcastEvent::CfeVersions(_) => None,
        }
    }

    async fn connect(&mut self) -> Result<(), DeliveryError> {
        let username = self.client.me().await?;
        info!(sink = "twitter", user = %username, "Authenticated with Twitter");
        self.username = Some(username);
        Ok(())
    }

    async fn deliver(&mut self, text: &str) -> Result<(), DeliveryError> {
        if self.username.is_none() {
            return Err(DeliveryError::NotConnected);
        }
        self.client.tweet(text).await?;
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(username) = self.username.take() {
            debug!(sink = "twitter", user = %username, "Twitter session closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::test_support::announced_kinds;

    #[test]
    fn test_interest_set() {
        let client = TwitterClient::new("token", "insights-test").unwrap();
        let sink =
            TwitterSink::new(client, "https://scan.chainflip.io/swaps/", Thresholds::default());
        assert_eq!(
            announced_kinds(&sink),
            vec!["swap", "incoming_liquidity", "epoch", "cex_movement", "swap_limits"]
        );
    }
}
