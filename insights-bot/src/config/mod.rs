//! Configuration module for insights-bot.
//!
//! Loads the TOML file, applies CLI overrides, validates it and converts it
//! into the runtime types of `insights_core::config`.

pub mod file;

use crate::config::file::{FileConfig, ThresholdsConfig};
use insights_core::config::{
    AppConfig, DiscordConfig, FeederConfig, FeedersConfig, FeedingConfig, MastodonConfig,
    TelegramConfig, Thresholds, TwitterConfig, UpstreamConfig,
};
use insights_sdk::client::UpstreamEndpoints;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid url {url:?}: {source}")]
    UrlError {
        url: String,
        source: url::ParseError,
    },

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
    state_dir_override: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, state_dir_override: Option<PathBuf>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            state_dir_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Build the runtime configuration
    pub fn load(&self) -> Result<AppConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(state_dir) = &self.state_dir_override {
            file_config.feeding.state_dir = state_dir.clone();
        }

        validate(&file_config)?;
        build_app_config(file_config)
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    let feeders = &config.feeders;
    let all_feeders = [
        ("swap", &feeders.swap),
        ("incoming_liquidity", &feeders.incoming_liquidity),
        ("epoch", &feeders.epoch),
        ("funding", &feeders.funding),
        ("redemption", &feeders.redemption),
        ("cex_movement", &feeders.cex_movement.feeder),
        ("cfe_version", &feeders.cfe_version),
        ("swap_limits", &feeders.swap_limits),
    ];
    for (name, feeder) in all_feeders {
        if feeder.enabled && feeder.query_delay_secs == 0 {
            return Err(ConfigError::ValidationError(format!(
                "feeders.{name}.query_delay_secs must be greater than zero"
            )));
        }
    }

    if feeders.cex_movement.feeder.enabled {
        require("feeders.cex_movement.query_id", &feeders.cex_movement.query_id)?;
        require("upstream.dune_api_key", &config.upstream.dune_api_key)?;
    }

    if config.discord.enabled {
        require("discord.token", &config.discord.token)?;
        if config.discord.channel_id == 0 {
            return Err(ConfigError::ValidationError(
                "discord.channel_id is required when discord is enabled".to_string(),
            ));
        }
    }
    if config.telegram.enabled {
        require("telegram.token", &config.telegram.token)?;
        require("telegram.chat_id", &config.telegram.chat_id)?;
    }
    if config.twitter.enabled {
        require("twitter.access_token", &config.twitter.access_token)?;
    }
    if config.mastodon.enabled {
        require("mastodon.access_token", &config.mastodon.access_token)?;
    }
    Ok(())
}

fn require(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::ValidationError(format!(
            "{key} is required when its section is enabled"
        )));
    }
    Ok(())
}

fn parse_url(url: &str) -> Result<Url, ConfigError> {
    Url::parse(url).map_err(|source| ConfigError::UrlError {
        url: url.to_string(),
        source,
    })
}

fn convert_thresholds(t: ThresholdsConfig) -> Thresholds {
    Thresholds {
        swap_usd: t.swap_threshold_usd,
        liquidity_usd: t.liquidity_threshold_usd,
    }
}

fn convert_feeder(f: file::FeederConfig) -> FeederConfig {
    FeederConfig {
        enabled: f.enabled,
        query_delay: Duration::from_secs(f.query_delay_secs),
        cursor_file: f.cursor_file,
    }
}

fn build_app_config(file_config: FileConfig) -> Result<AppConfig, ConfigError> {
    let FileConfig {
        upstream,
        feeding,
        feeders,
        discord,
        telegram,
        twitter,
        mastodon,
    } = file_config;

    Ok(AppConfig {
        upstream: UpstreamConfig {
            endpoints: UpstreamEndpoints {
                graph_url: upstream.graph_url,
                rpc_url: upstream.rpc_url,
                dune_url: parse_url(&upstream.dune_url)?,
                dune_api_key: upstream.dune_api_key,
            },
            explorer_url: upstream.explorer_url,
            user_agent: upstream.user_agent,
        },
        feeding: FeedingConfig {
            state_dir: feeding.state_dir,
            feeding_delay: Duration::from_secs(feeding.feeding_delay_secs),
        },
        feeders: FeedersConfig {
            swap: convert_feeder(feeders.swap),
            incoming_liquidity: convert_feeder(feeders.incoming_liquidity),
            epoch: convert_feeder(feeders.epoch),
            funding: convert_feeder(feeders.funding),
            redemption: convert_feeder(feeders.redemption),
            cex_movement: convert_feeder(feeders.cex_movement.feeder),
            cfe_version: convert_feeder(feeders.cfe_version),
            swap_limits: convert_feeder(feeders.swap_limits),
            cex_movement_query_id: feeders.cex_movement.query_id,
        },
        discord: DiscordConfig {
            enabled: discord.enabled,
            token: discord.token,
            channel_id: discord.channel_id,
            thresholds: convert_thresholds(discord.thresholds),
        },
        telegram: TelegramConfig {
            enabled: telegram.enabled,
            token: telegram.token,
            chat_id: telegram.chat_id,
            thresholds: convert_thresholds(telegram.thresholds),
        },
        twitter: TwitterConfig {
            enabled: twitter.enabled,
            access_token: twitter.access_token,
            thresholds: convert_thresholds(twitter.thresholds),
        },
        mastodon: MastodonConfig {
            enabled: mastodon.enabled,
            instance_url: parse_url(&mastodon.instance_url)?,
            access_token: mastodon.access_token,
            thresholds: convert_thresholds(mastodon.thresholds),
        },
    })
}
