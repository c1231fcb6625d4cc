//! EventNormalizer processor.
//!
//! One normalizer is linked to each feeder pipeline. It converts every
//! feeder event into a [`BroadcastEvent`] strictly one at a time, never
//! dropping, reordering or batching, and forwards it to the fan-out's merge
//! channel. When its source completes it drops its merge sender, which is
//! how completion travels downstream.

use crate::events::{BroadcastEvent, BroadcastSender, PipelineSource};
use kanau::processor::Processor;
use std::convert::Infallible;
use tracing::{debug, info, warn};

/// Stateless 1:1 transform into the broadcast tagged union.
#[derive(Debug, Clone, Copy, Default)]
pub struct EventNormalizer;

impl EventNormalizer {
    pub fn new() -> Self {
        Self
    }

    /// Drain `source` into `output` until the source completes.
    pub async fn run<T>(self, mut source: PipelineSource<T>, output: BroadcastSender)
    where
        T: Into<BroadcastEvent> + Send + 'static,
    {
        let pipeline = source.name();
        debug!(pipeline, "EventNormalizer started");

        while let Some(event) = source.recv().await {
            let Ok(wrapped) = self.process(event).await;
            if output.send(wrapped).await.is_err() {
                warn!(pipeline, "Fan-out dropped, stopping normalizer");
                return;
            }
        }

        info!(pipeline, "Source completed, normalizer drained");
    }
}

impl<T> Processor<T> for EventNormalizer
where
    T: Into<BroadcastEvent> + Send + 'static,
{
    type Output = BroadcastEvent;
    type Error = Infallible;

    async fn process(&self, event: T) -> Result<BroadcastEvent, Infallible> {
        Ok(event.into())
    }
}
