//! The startup routine enumerating every feeder and sink.

use insights_core::config::AppConfig;
use insights_core::cursor::CursorStore;
use insights_core::feeders::{
    CexMovementFeeder, CfeVersionFeeder, EpochFeeder, FundingFeeder, IncomingLiquidityFeeder,
    RedemptionFeeder, SwapFeeder, SwapLimitsFeeder,
};
use insights_core::sinks::{DiscordSink, MastodonSink, TelegramSink, TwitterSink};
use insights_core::topology::Topology;
use insights_sdk::client::{
    ClientError, DiscordClient, HttpUpstream, MastodonClient, TelegramClient, TwitterClient,
    Upstream,
};
use std::sync::Arc;

/// Build and start the topology described by `config`.
pub fn build_topology(config: &AppConfig) -> Result<Topology, ClientError> {
    let user_agent = config.upstream.user_agent.as_str();
    let explorer_url = config.upstream.explorer_url.as_str();
    let upstream: Arc<dyn Upstream> = Arc::new(HttpUpstream::new(
        config.upstream.endpoints.clone(),
        user_agent,
    ));

    let feeding = &config.feeding;
    let state_dir = feeding.state_dir.as_path();
    let feeders = &config.feeders;

    let discord = DiscordClient::new(&config.discord.token, config.discord.channel_id, user_agent)?;
    let telegram = TelegramClient::new(&config.telegram.token, &config.telegram.chat_id, user_agent)?;
    let twitter = TwitterClient::new(&config.twitter.access_token, user_agent)?;
    let mastodon = MastodonClient::new(
        config.mastodon.instance_url.clone(),
        &config.mastodon.access_token,
        user_agent,
    );

    let topology = Topology::builder()
        .feeder(
            SwapFeeder::new(Arc::clone(&upstream)),
            CursorStore::new(feeders.swap.cursor_path(state_dir, "last_swap_id")),
            feeders.swap.settings(feeding),
        )
        .feeder(
            IncomingLiquidityFeeder::new(Arc::clone(&upstream)),
            CursorStore::new(
                feeders
                    .incoming_liquidity
                    .cursor_path(state_dir, "last_incoming_liquidity_id"),
            ),
            feeders.incoming_liquidity.settings(feeding),
        )
        .feeder(
            EpochFeeder::new(Arc::clone(&upstream)),
            CursorStore::new(feeders.epoch.cursor_path(state_dir, "last_epoch_id")),
            feeders.epoch.settings(feeding),
        )
        .feeder(
            FundingFeeder::new(Arc::clone(&upstream)),
            CursorStore::new(feeders.funding.cursor_path(state_dir, "last_funding_id")),
            feeders.funding.settings(feeding),
        )
        .feeder(
            RedemptionFeeder::new(Arc::clone(&upstream)),
            CursorStore::new(feeders.redemption.cursor_path(state_dir, "last_redemption_id")),
            feeders.redemption.settings(feeding),
        )
        .feeder(
            CexMovementFeeder::new(Arc::clone(&upstream), feeders.cex_movement_query_id.clone()),
            CursorStore::new(
                feeders
                    .cex_movement
                    .cursor_path(state_dir, "last_cex_movement_date"),
            ),
            feeders.cex_movement.settings(feeding),
        )
        .feeder(
            CfeVersionFeeder::new(Arc::clone(&upstream)),
            CursorStore::new(feeders.cfe_version.cursor_path(state_dir, "last_cfe_version")),
            feeders.cfe_version.settings(feeding),
        )
        .feeder(
            SwapLimitsFeeder::new(upstream),
            CursorStore::new(
                feeders
                    .swap_limits
                    .cursor_path(state_dir, "last_swap_limits_version"),
            ),
            feeders.swap_limits.settings(feeding),
        )
        .sink(
            DiscordSink::new(discord, explorer_url, config.discord.thresholds),
            config.discord.enabled,
        )
        .sink(
            TelegramSink::new(telegram, explorer_url, config.telegram.thresholds),
            config.telegram.enabled,
        )
        .sink(
            TwitterSink::new(twitter, explorer_url, config.twitter.thresholds),
            config.twitter.enabled,
        )
        .sink(
            MastodonSink::new(mastodon, explorer_url, config.mastodon.thresholds),
            config.mastodon.enabled,
        )
        .start();

    Ok(topology)
}
