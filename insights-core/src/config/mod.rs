//! Configuration types for the announcement bot.
//!
//! These types represent the validated runtime configuration. Loading and
//! parsing the configuration file is handled by the binary crate.

mod feeding;
mod sinks;
mod upstream;

pub use feeding::{FeederConfig, FeedersConfig, FeedingConfig};
pub use sinks::{DiscordConfig, MastodonConfig, TelegramConfig, Thresholds, TwitterConfig};
pub use upstream::UpstreamConfig;

/// Complete runtime configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub upstream: UpstreamConfig,
    pub feeding: FeedingConfig,
    pub feeders: FeedersConfig,
    pub discord: DiscordConfig,
    pub telegram: TelegramConfig,
    pub twitter: TwitterConfig,
    pub mastodon: MastodonConfig,
}
