//! TOML file configuration structures.
//!
//! These structs directly map to the `insights-config.toml` file format.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub feeding: FeedingConfig,
    #[serde(default)]
    pub feeders: FeedersConfig,
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub twitter: TwitterConfig,
    #[serde(default)]
    pub mastodon: MastodonConfig,
}

/// Upstream endpoints section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Explorer GraphQL endpoint.
    pub graph_url: Url,
    /// State Chain node JSON-RPC endpoint.
    pub rpc_url: Url,
    #[serde(default = "default_dune_url")]
    pub dune_url: String,
    #[serde(default)]
    pub dune_api_key: String,
    /// Swap links are this prefix followed by the swap id.
    #[serde(default = "default_explorer_url")]
    pub explorer_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_dune_url() -> String {
    "https://api.dune.com/api/v1/".to_string()
}

fn default_explorer_url() -> String {
    "https://scan.chainflip.io/swaps/".to_string()
}

fn default_user_agent() -> String {
    format!("chainflip-insights/{}", env!("CARGO_PKG_VERSION"))
}

/// Feeding section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedingConfig {
    /// Directory holding the cursor files.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
    /// Grace period before the first poll so sinks can connect.
    #[serde(default = "default_feeding_delay_secs")]
    pub feeding_delay_secs: u64,
}

impl Default for FeedingConfig {
    fn default() -> Self {
        Self {
            state_dir: default_state_dir(),
            feeding_delay_secs: default_feeding_delay_secs(),
        }
    }
}

fn default_state_dir() -> PathBuf {
    PathBuf::from("./state")
}

fn default_feeding_delay_secs() -> u64 {
    30
}

/// One `[feeders.<name>]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeederConfig {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_query_delay_secs")]
    pub query_delay_secs: u64,
    /// Overrides the default cursor file in the state directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cursor_file: Option<PathBuf>,
}

impl Default for FeederConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            query_delay_secs: default_query_delay_secs(),
            cursor_file: None,
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_query_delay_secs() -> u64 {
    60
}

/// The `[feeders.cex_movement]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CexMovementConfig {
    #[serde(flatten)]
    pub feeder: FeederConfig,
    /// Saved Dune query producing the daily rows.
    #[serde(default)]
    pub query_id: String,
}

/// The `[feeders]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedersConfig {
    pub swap: FeederConfig,
    pub incoming_liquidity: FeederConfig,
    pub epoch: FeederConfig,
    pub funding: FeederConfig,
    pub redemption: FeederConfig,
    pub cex_movement: CexMovementConfig,
    pub cfe_version: FeederConfig,
    pub swap_limits: FeederConfig,
}

/// USD thresholds shared by every sink section.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ThresholdsConfig {
    #[serde(default)]
    pub swap_threshold_usd: Decimal,
    #[serde(default)]
    pub liquidity_threshold_usd: Decimal,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscordConfig {
    pub enabled: bool,
    pub token: String,
    pub channel_id: u64,
    #[serde(flatten)]
    pub thresholds: ThresholdsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    pub enabled: bool,
    pub token: String,
    pub chat_id: String,
    #[serde(flatten)]
    pub thresholds: ThresholdsConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TwitterConfig {
    pub enabled: bool,
    pub access_token: String,
    #[serde(flatten)]
    pub thresholds: ThresholdsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MastodonConfig {
    pub enabled: bool,
    pub instance_url: String,
    pub access_token: String,
    #[serde(flatten)]
    pub thresholds: ThresholdsConfig,
}

impl Default for MastodonConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            instance_url: "https://mastodon.social/".to_string(),
            access_token: String::new(),
            thresholds: ThresholdsConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parsing() {
        let toml_str = r#"
[upstream]
graph_url = "https://explorer-service-processor.chainflip.io/graphql"
rpc_url = "https://mainnet-archive.chainflip.io"
dune_api_key = "dune-key"

[feeding]
state_dir = "/var/lib/insights"
feeding_delay_secs = 5

[feeders.swap]
query_delay_secs = 30

[feeders.funding]
enabled = false

[feeders.cex_movement]
query_delay_secs = 3600
query_id = "3360123"
cursor_file = "/tmp/cex"

[discord]
enabled = true
token = "discord-token"
channel_id = 1180000000000000000
swap_threshold_usd = 2500

[telegram]
enabled = true
token = "123:abc"
chat_id = "@chainflip_insights"
liquidity_threshold_usd = 10000.5
"#;
        let config: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.feeding.feeding_delay_secs, 5);
        assert_eq!(config.feeders.swap.query_delay_secs, 30);
        assert!(config.feeders.swap.enabled);
        assert!(!config.feeders.funding.enabled);
        assert_eq!(config.feeders.epoch.query_delay_secs, 60);
        assert_eq!(config.feeders.cex_movement.query_id, "3360123");
        assert_eq!(config.feeders.cex_movement.feeder.query_delay_secs, 3600);
        assert_eq!(
            config.feeders.cex_movement.feeder.cursor_file,
            Some(PathBuf::from("/tmp/cex"))
        );
        assert_eq!(config.discord.channel_id, 1_180_000_000_000_000_000);
        assert_eq!(config.discord.thresholds.swap_threshold_usd, Decimal::from(2500));
        assert_eq!(
            config.telegram.thresholds.liquidity_threshold_usd,
            Decimal::new(100005, 1)
        );
        assert!(!config.twitter.enabled);
        assert_eq!(config.mastodon.instance_url, "https://mastodon.social/");
        assert_eq!(config.upstream.explorer_url, "https://scan.chainflip.io/swaps/");
    }

    #[test]
    fn test_upstream_is_required() {
        let result: Result<FileConfig, _> = toml::from_str("[feeding]\nfeeding_delay_secs = 1\n");
        assert!(result.is_err());
    }
}
