//! Static wiring of the announcement pipeline.
//!
//! A [`TopologyBuilder`] collects every feeder and sink, and
//! [`start`](TopologyBuilder::start) spawns them together with one
//! normalizer per feeder and the shared fan-out:
//!
//! ```text
//! Feeder ─► Pipeline ─► EventNormalizer ─┐
//! Feeder ─► Pipeline ─► EventNormalizer ─┼─► FanOut ─┬─► slot ─► Sink
//!   ...                                  │           └─► slot ─► Sink
//! ```
//!
//! Shutdown completes every pipeline source and trips the shared shutdown
//! signal; [`Topology::completion`] then resolves once every sink has
//! drained and disconnected.

use crate::cursor::CursorStore;
use crate::events::{
    BroadcastEvent, BroadcastSender, Pipeline, PipelineCompleter, broadcast_channel,
};
use crate::feeders::{FeedError, Feeder, FeederKey, FeederRunner, FeederSettings};
use crate::processors::{EventNormalizer, FanOut};
use crate::sinks::{AnnouncementChannel, SinkRunner};
use futures_util::future::{BoxFuture, FutureExt};
use futures_util::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};

/// Fatal failures of a running topology.
#[derive(Debug, Error)]
pub enum TopologyError {
    /// A feeder stopped with an error
    #[error("feeder {feeder} failed: {source}")]
    Feeder {
        feeder: &'static str,
        source: FeedError,
    },

    /// A feeder, stage or sink task panicked
    #[error("{task} task panicked")]
    Panicked { task: &'static str },
}

type Spawnable<T> = (&'static str, BoxFuture<'static, T>);

/// Collects the feeders and sinks of a [`Topology`].
pub struct TopologyBuilder {
    shutdown_tx: watch::Sender<bool>,
    merge_tx: BroadcastSender,
    fan_out: FanOut,
    completers: Vec<PipelineCompleter>,
    feeders: Vec<Spawnable<Result<(), FeedError>>>,
    normalizers: Vec<Spawnable<()>>,
    sinks: Vec<Spawnable<()>>,
}

impl Default for TopologyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TopologyBuilder {
    pub fn new() -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        let (merge_tx, merge_rx) = broadcast_channel();
        Self {
            shutdown_tx,
            merge_tx,
            fan_out: FanOut::new(merge_rx),
            completers: Vec::new(),
            feeders: Vec::new(),
            normalizers: Vec::new(),
            sinks: Vec::new(),
        }
    }

    /// Add a feeder with its own pipeline and normalizer.
    pub fn feeder<F>(
        mut self,
        feeder: F,
        cursor_store: CursorStore<FeederKey<F>>,
        settings: FeederSettings,
    ) -> Self
    where
        F: Feeder,
        F::Event: Into<BroadcastEvent>,
    {
        let name = feeder.name();
        let (pipeline, source, completer) = Pipeline::new(name, self.shutdown_tx.subscribe());
        self.completers.push(completer);
        self.feeders.push((
            name,
            FeederRunner::new(feeder, cursor_store, pipeline, settings)
                .run()
                .boxed(),
        ));
        self.normalizers.push((
            name,
            EventNormalizer::new()
                .run(source, self.merge_tx.clone())
                .boxed(),
        ));
        self
    }

    /// Add a sink with its own slot on the fan-out.
    pub fn sink<C: AnnouncementChannel>(mut self, channel: C, enabled: bool) -> Self {
        let name = channel.name();
        let slot = self.fan_out.subscribe(name);
        self.sinks.push((
            name,
            SinkRunner::new(channel, slot, self.shutdown_tx.subscribe(), enabled)
                .run()
                .boxed(),
        ));
        self
    }

    /// Spawn every stage.
    pub fn start(self) -> Topology {
        let TopologyBuilder {
            shutdown_tx,
            merge_tx,
            fan_out,
            completers,
            feeders,
            normalizers,
            sinks,
        } = self;
        // Only the normalizers may keep the fan-out alive.
        drop(merge_tx);

        info!(
            feeders = feeders.len(),
            sinks = sinks.len(),
            "Starting topology"
        );

        let sinks = spawn_all(sinks);
        let mut stages = spawn_all(normalizers);
        stages.push(("fan_out", tokio::spawn(fan_out.run())));
        let feeders = spawn_all(feeders);

        Topology {
            handle: ShutdownHandle {
                shutdown_tx: Arc::new(shutdown_tx),
                completers: completers.into(),
            },
            feeders,
            stages,
            sinks,
        }
    }
}

fn spawn_all<T: Send + 'static>(
    tasks: Vec<Spawnable<T>>,
) -> Vec<(&'static str, JoinHandle<T>)> {
    tasks
        .into_iter()
        .map(|(name, task)| (name, tokio::spawn(task)))
        .collect()
}

/// Cloneable trigger for the shutdown sequence.
#[derive(Clone)]
pub struct ShutdownHandle {
    shutdown_tx: Arc<watch::Sender<bool>>,
    completers: Arc<[PipelineCompleter]>,
}

impl ShutdownHandle {
    /// Complete every pipeline source and trip the shutdown signal.
    ///
    /// Idempotent.
    pub fn shutdown(&self) {
        for completer in self.completers.iter() {
            completer.complete();
        }
        if !self.shutdown_tx.send_replace(true) {
            info!("Shutdown signal sent");
        }
    }
}

/// A running topology.
pub struct Topology {
    handle: ShutdownHandle,
    feeders: Vec<(&'static str, JoinHandle<Result<(), FeedError>>)>,
    stages: Vec<(&'static str, JoinHandle<()>)>,
    sinks: Vec<(&'static str, JoinHandle<()>)>,
}

impl Topology {
    pub fn builder() -> TopologyBuilder {
        TopologyBuilder::new()
    }

    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.handle.clone()
    }

    /// See [`ShutdownHandle::shutdown`].
    pub fn shutdown(&self) {
        self.handle.shutdown();
    }

    /// Resolve once every sink has drained and disconnected.
    ///
    /// A feeder that fails or any task that panics is fatal: the shutdown
    /// sequence is started and the error returned without waiting for the
    /// remaining stages.
    pub async fn completion(self) -> Result<(), TopologyError> {
        let Topology {
            handle,
            feeders,
            stages,
            sinks,
        } = self;

        let mut feeders: FuturesUnordered<_> = feeders
            .into_iter()
            .map(|(feeder, task)| task.map(move |joined| (feeder, joined)))
            .collect();

        let mut sinks: FuturesUnordered<_> = sinks
            .into_iter()
            .map(|(sink, task)| task.map(move |joined| (sink, joined)))
            .collect();

        loop {
            tokio::select! {
                Some((feeder, joined)) = feeders.next() => {
                    if let Err(e) = check_feeder(feeder, joined) {
                        error!(error = %e, "Fatal error, shutting down");
                        handle.shutdown();
                        return Err(e);
                    }
                }
                next = sinks.next() => match next {
                    Some((sink, Ok(()))) => debug!(sink, "Sink completed"),
                    Some((sink, Err(_))) => {
                        error!(sink, "Sink task panicked, shutting down");
                        handle.shutdown();
                        return Err(TopologyError::Panicked { task: sink });
                    }
                    None => break,
                },
            }
        }

        // Sinks end after the fan-out and every normalizer did; feeders are
        // either done or observing the shutdown signal.
        for (stage, task) in stages {
            if task.await.is_err() {
                error!(stage, "Stage task panicked");
                return Err(TopologyError::Panicked { task: stage });
            }
        }
        while let Some((feeder, joined)) = feeders.next().await {
            check_feeder(feeder, joined)?;
        }

        info!("All sinks completed");
        Ok(())
    }
}

fn check_feeder(
    feeder: &'static str,
    joined: Result<Result<(), FeedError>, tokio::task::JoinError>,
) -> Result<(), TopologyError> {
    match joined {
        Ok(Ok(())) => {
            info!(feeder, "{feeder} source completed");
            Ok(())
        }
        Ok(Err(source)) => Err(TopologyError::Feeder { feeder, source }),
        Err(_) => Err(TopologyError::Panicked { task: feeder }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feeders::{EpochFeeder, FundingFeeder};
    use crate::feeders::test_support::ScriptedUpstream;
    use crate::sinks::test_support::{StubChannel, StubLog};
    use serde_json::json;
    use std::sync::Mutex;
    use std::time::Duration;

    fn epochs(ids: &[u64]) -> serde_json::Value {
        let edges: Vec<_> = ids
            .iter()
            .map(|id| {
                json!({ "node": {
                    "id": id,
                    "bond": "1000000000000000000",
                    "totalBonded": "150000000000000000000",
                    "authorityCount": 150,
                    "eventByStartEventId": { "blockByBlockId": { "timestamp": "2024-02-03T04:43:48+00:00" } }
                }})
            })
            .collect();
        json!({ "data": { "allEpoches": { "edges": edges } } })
    }

    fn fundings(ids: &[u64]) -> serde_json::Value {
        let edges: Vec<_> = ids
            .iter()
            .map(|id| {
                json!({ "node": {
                    "id": id,
                    "amount": "600000000000000000000",
                    "epochId": 77,
                    "validatorByValidatorId": {
                        "alias": "StakedFLIP (Chorus One #10)",
                        "idSs58": "cFNwGhUje3AJzBykDGs45umgFoGKS9xouSVn1UNz7VG1y4j4n"
                    },
                    "eventByEventId": { "blockByBlockId": { "timestamp": "2024-02-03T04:43:48+00:00" } }
                }})
            })
            .collect();
        json!({ "data": { "allValidatorFundingEvents": { "edges": edges } } })
    }

    fn settings(enabled: bool) -> FeederSettings {
        FeederSettings {
            enabled,
            feeding_delay: Duration::ZERO,
            query_delay: Duration::from_millis(10),
        }
    }

    async fn wait_for(log: &Arc<Mutex<StubLog>>, last: &str) {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                if log.lock().unwrap().delivered.last().map(String::as_str) == Some(last) {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_events_reach_every_sink_and_shutdown_completes() {
        let dir = tempfile::tempdir().unwrap();
        let cursor_path = dir.path().join("last_epoch");
        let upstream = Arc::new(ScriptedUpstream::single(epochs(&[1, 2, 3])));

        let (discord, discord_log) = StubChannel::new("discord");
        let (telegram, telegram_log) = StubChannel::new("telegram");

        let topology = Topology::builder()
            .feeder(
                EpochFeeder::new(upstream),
                CursorStore::new(&cursor_path),
                settings(true),
            )
            .sink(discord, true)
            .sink(telegram, true)
            .start();

        wait_for(&discord_log, "3").await;
        wait_for(&telegram_log, "3").await;

        topology.shutdown();
        tokio::time::timeout(Duration::from_secs(5), topology.completion())
            .await
            .unwrap()
            .unwrap();

        for log in [discord_log, telegram_log] {
            let log = log.lock().unwrap();
            let ids: Vec<u64> = log.delivered.iter().map(|id| id.parse().unwrap()).collect();
            assert!(ids.windows(2).all(|w| w[0] < w[1]), "reordered: {ids:?}");
            assert_eq!(log.disconnects, 1);
        }
        assert_eq!(std::fs::read_to_string(&cursor_path).unwrap().trim(), "3");
    }

    fn read_cursor(path: &std::path::Path) -> Option<String> {
        std::fs::read_to_string(path)
            .ok()
            .map(|text| text.trim().to_string())
    }

    #[tokio::test]
    async fn test_stalled_sink_holds_back_neither_feeder_nor_live_sink() {
        let dir = tempfile::tempdir().unwrap();
        let epoch_cursor = dir.path().join("last_epoch");
        let funding_cursor = dir.path().join("last_funding");
        let epoch_ids: Vec<u64> = (1..=10).collect();
        let funding_ids: Vec<u64> = (101..=110).collect();

        let (mut discord, discord_log) = StubChannel::new("discord");
        discord.stalled = true;
        let (telegram, telegram_log) = StubChannel::new("telegram");

        let topology = Topology::builder()
            .feeder(
                EpochFeeder::new(Arc::new(ScriptedUpstream::single(epochs(&epoch_ids)))),
                CursorStore::new(&epoch_cursor),
                settings(true),
            )
            .feeder(
                FundingFeeder::new(Arc::new(ScriptedUpstream::single(fundings(&funding_ids)))),
                CursorStore::new(&funding_cursor),
                settings(true),
            )
            .sink(discord, true)
            .sink(telegram, true)
            .start();

        // Both feeders finish their batch and Telegram hears from each while
        // Discord never completes a single delivery.
        tokio::time::timeout(Duration::from_secs(2), async {
            loop {
                let cursors_done = read_cursor(&epoch_cursor).as_deref() == Some("10")
                    && read_cursor(&funding_cursor).as_deref() == Some("110");
                let heard_both = {
                    let log = telegram_log.lock().unwrap();
                    log.delivered.iter().any(|text| text.starts_with("funding "))
                        && log.delivered.iter().any(|text| !text.starts_with("funding "))
                };
                if cursors_done && heard_both {
                    return;
                }
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .unwrap();

        topology.shutdown();
        tokio::time::timeout(Duration::from_secs(5), topology.completion())
            .await
            .unwrap()
            .unwrap();

        let delivered = telegram_log.lock().unwrap().delivered.clone();
        let (funding_texts, epoch_texts): (Vec<&String>, Vec<&String>) = delivered
            .iter()
            .partition(|text| text.starts_with("funding "));
        let funding_seen: Vec<u64> = funding_texts
            .iter()
            .map(|text| text["funding ".len()..].parse().unwrap())
            .collect();
        let epoch_seen: Vec<u64> = epoch_texts.iter().map(|text| text.parse().unwrap()).collect();

        for (seen, expected) in [(&epoch_seen, &epoch_ids), (&funding_seen, &funding_ids)] {
            assert!(seen.windows(2).all(|w| w[0] < w[1]), "reordered: {seen:?}");
            assert!(seen.iter().all(|id| expected.contains(id)), "unknown item: {seen:?}");
        }

        let discord_log = discord_log.lock().unwrap();
        assert!(discord_log.delivered.is_empty());
        assert_eq!(discord_log.disconnects, 1);
        assert_eq!(telegram_log.lock().unwrap().disconnects, 1);
    }

    #[tokio::test]
    async fn test_disabled_feeders_complete_the_topology() {
        let dir = tempfile::tempdir().unwrap();
        let upstream = Arc::new(ScriptedUpstream::single(epochs(&[1])));
        let (sink, log) = StubChannel::new("discord");

        let topology = Topology::builder()
            .feeder(
                EpochFeeder::new(upstream),
                CursorStore::new(dir.path().join("last_epoch")),
                settings(false),
            )
            .sink(sink, true)
            .start();

        tokio::time::timeout(Duration::from_secs(5), topology.completion())
            .await
            .unwrap()
            .unwrap();
        assert!(log.lock().unwrap().delivered.is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_cursor_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let cursor_path = dir.path().join("last_epoch");
        std::fs::write(&cursor_path, "not-a-number").unwrap();
        let upstream = Arc::new(ScriptedUpstream::single(epochs(&[1])));
        let (sink, _log) = StubChannel::new("discord");

        let topology = Topology::builder()
            .feeder(
                EpochFeeder::new(upstream),
                CursorStore::new(&cursor_path),
                settings(true),
            )
            .sink(sink, true)
            .start();

        let result = tokio::time::timeout(Duration::from_secs(5), topology.completion())
            .await
            .unwrap();
        assert!(matches!(
            result,
            Err(TopologyError::Feeder { feeder: "epoch", .. })
        ));
    }
}
