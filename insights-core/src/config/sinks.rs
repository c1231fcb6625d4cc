//! Announcement channel configuration.

use rust_decimal::Decimal;
use url::Url;

/// Minimum USD value for an event to be announced on a channel.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub swap_usd: Decimal,
    pub liquidity_usd: Decimal,
}

impl Thresholds {
    pub fn swap_passes(&self, value_usd: Decimal) -> bool {
        value_usd >= self.swap_usd
    }

    pub fn liquidity_passes(&self, value_usd: Decimal) -> bool {
        value_usd >= self.liquidity_usd
    }
}

#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub enabled: bool,
    pub token: String,
    pub channel_id: u64,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: String,
    /// Numeric chat id or `@channelusername`.
    pub chat_id: String,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone)]
pub struct TwitterConfig {
    pub enabled: bool,
    /// OAuth 2.0 user-context access token.
    pub access_token: String,
    pub thresholds: Thresholds,
}

#[derive(Debug, Clone)]
pub struct MastodonConfig {
    pub enabled: bool,
    pub instance_url: Url,
    pub access_token: String,
    pub thresholds: Thresholds,
}
