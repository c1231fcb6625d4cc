//! FanOut processor.
//!
//! Merges every normalizer output and offers each event to every registered
//! sink. Each sink has its own single-slot buffer: offering never blocks,
//! and an event the sink has not taken yet is overwritten by the next one
//! for that sink only. A stalled sink therefore loses events but never
//! holds up the fan-out, the other sinks, or any feeder.

use crate::events::{BroadcastEvent, BroadcastReceiver, SlotReceiver, SlotSender, sink_slot};
use std::sync::Arc;
use tracing::{debug, info};

pub struct FanOut {
    input: BroadcastReceiver,
    slots: Vec<(&'static str, SlotSender)>,
}

impl FanOut {
    pub fn new(input: BroadcastReceiver) -> Self {
        Self {
            input,
            slots: Vec::new(),
        }
    }

    /// Register a sink and return the receiving end of its slot.
    ///
    /// The set of sinks is fixed once [`run`](Self::run) starts.
    pub fn subscribe(&mut self, sink: &'static str) -> SlotReceiver {
        let (tx, rx) = sink_slot();
        self.slots.push((sink, tx));
        rx
    }

    /// Distribute events until every normalizer has completed, then close
    /// all sink slots.
    pub async fn run(mut self) {
        info!(sinks = self.slots.len(), "FanOut started");

        while let Some(event) = self.input.recv().await {
            self.offer(event);
        }

        info!("All sources completed, closing sink slots");
        // Dropping the slot senders completes every sink.
    }

    fn offer(&self, event: BroadcastEvent) {
        let kind = event.kind();
        let event = Arc::new(event);
        for (sink, slot) in &self.slots {
            if slot.offer(Arc::clone(&event)) {
                debug!(sink, kind, "Sink busy, dropped its pending event");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{EpochInfo, broadcast_channel};
    use rust_decimal::Decimal;
    use std::time::Duration;
    use time::OffsetDateTime;

    fn epoch(id: u64) -> BroadcastEvent {
        BroadcastEvent::Epoch(EpochInfo {
            id,
            bond: Decimal::ZERO,
            total_bonded: Decimal::ZERO,
            authority_count: 0,
            started_at: OffsetDateTime::UNIX_EPOCH,
        })
    }

    fn id_of(event: &BroadcastEvent) -> u64 {
        match event {
            BroadcastEvent::Epoch(info) => info.id,
            other => unreachable!("unexpected variant {}", other.kind()),
        }
    }

    #[tokio::test]
    async fn test_every_sink_sees_events_in_order() {
        let (merge_tx, merge_rx) = broadcast_channel();
        let mut fan_out = FanOut::new(merge_rx);
        let a = fan_out.subscribe("a");
        let b = fan_out.subscribe("b");
        let handle = tokio::spawn(fan_out.run());

        let consume = |mut rx: SlotReceiver| {
            tokio::spawn(async move {
                let mut seen = Vec::new();
                while let Some(event) = rx.recv().await {
                    seen.push(id_of(&event));
                }
                seen
            })
        };
        let a_seen = consume(a);
        let b_seen = consume(b);

        for id in 1..=50 {
            merge_tx.send(epoch(id)).await.unwrap();
            tokio::task::yield_now().await;
        }
        drop(merge_tx);
        handle.await.unwrap();

        for seen in [a_seen.await.unwrap(), b_seen.await.unwrap()] {
            assert!(!seen.is_empty());
            assert!(seen.windows(2).all(|w| w[0] < w[1]), "reordered: {seen:?}");
            assert_eq!(seen.last(), Some(&50));
        }
    }

    #[tokio::test]
    async fn test_stalled_sink_does_not_block_others() {
        let (merge_tx, merge_rx) = broadcast_channel();
        let mut fan_out = FanOut::new(merge_rx);
        let mut stalled = fan_out.subscribe("stalled");
        let mut live = fan_out.subscribe("live");
        let handle = tokio::spawn(fan_out.run());

        for id in 1..=1_000 {
            merge_tx.send(epoch(id)).await.unwrap();
            let got = tokio::time::timeout(Duration::from_secs(5), live.recv())
                .await
                .unwrap()
                .unwrap();
            assert_eq!(id_of(&got), id);
        }

        drop(merge_tx);
        handle.await.unwrap();
        // The stalled sink only ever holds the latest event.
        assert_eq!(id_of(&stalled.recv().await.unwrap()), 1_000);
        assert!(stalled.recv().await.is_none());
    }
}
