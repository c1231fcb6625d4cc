use super::format::{self, Markup};
use super::{AnnouncementChannel, DeliveryError};
use crate::config::Thresholds;
use crate::events::BroadcastEvent;
use async_trait::async_trait;
use insights_sdk::client::MastodonClient;
use tracing::{debug, info};

/// Toots swaps, liquidity, epochs, fundings and redemptions.
pub struct MastodonSink {
    client: MastodonClient,
    explorer_url: String,
    thresholds: Thresholds,
    account: Option<String>,
}

impl MastodonSink {
    pub fn new(
        client: MastodonClient,
        explorer_url: impl Into<String>,
        thresholds: Thresholds,
    ) -> Self {
        Self {
            client,
            explorer_url: explorer_url.into(),
            thresholds,
            account: None,
        }
    }
}

#[async_trait]
impl AnnouncementChannel for MastodonSink {
    fn name(&self) -> &'static str {
        "mastodon"
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
            BroadcastEvent::Funding(info) => Some(format::funding(info, MARKUP)),
            BroadcastEvent::Redemption(info) => Some(format::redemption(info, MARKUP)),
            BroadcastEvent::CexMovement(_)
            | BroadcastEvent::CfeVersions(_)
            | BroadcastEvent::SwapLimits(_) => None,
        }
    }

    async fn connect(&mut self) -> Result<(), DeliveryError> {
        let account = self.client.verify_credentials().await?;
        info!(sink = "mastodon", account = %account, "Authenticated with Mastodon");
        self.account = Some(account);
        Ok(())
    }

    async fn deliver(&mut self, text: &str) -> Result<(), DeliveryError> {
        if self.account.is_none() {
            return Err(DeliveryError::NotConnected);
        }
        self.client.post_status(text).await?;
        Ok(())
    }

    async fn disconnect(&mut self) {
        if let Some(account) = self.account.take() {
            debug!(sink = "mastodon", account = %account, "Mastodon session closed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sinks::test_support::announced_kinds;
    use url::Url;

    #[test]
    fn test_interest_set() {
        let client = MastodonClient::new(
            Url::parse("https://mastodon.social/").unwrap(),
            "token",
            "insights-test",
        );
        let sink =
            MastodonSink::new(client, "https://scan.chainflip.io/swaps/", Thresholds::default());
        assert_eq!(
            announced_kinds(&sink),
            vec!["swap", "incoming_liquidity", "epoch", "funding", "redemption"]
        );
    }
}
