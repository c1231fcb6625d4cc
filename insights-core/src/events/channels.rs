//! Channel plumbing between the stages of the distribution pipeline.
//!
//! - [`Pipeline`] / [`PipelineSource`]: per-feeder ordered queue, one
//!   producer (the feeder) and one consumer (its normalizer).
//! - [`broadcast_channel`]: the merge point where every normalizer forwards
//!   into the fan-out.
//! - [`sink_slot`]: the single-slot, overwrite-on-full buffer between the
//!   fan-out and one sink.

use super::broadcast::BroadcastEvent;
use crate::utils::cancelled;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;
use tokio::sync::{Notify, mpsc, watch};

/// Default buffer size for pipeline and merge channels.
///
/// Feeders forward at most one upstream page per cycle, so this is
/// effectively unbounded while still keeping memory in check.
pub const DEFAULT_CHANNEL_BUFFER: usize = 256;

/// Why a [`Pipeline::send`] did not hand its item over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The shared shutdown signal fired.
    #[error("pipeline cancelled")]
    Cancelled,
    /// The source was completed and accepts no more items.
    #[error("pipeline source completed")]
    Completed,
}

/// Producer side of a feeder's pipeline.
///
/// Owned by exactly one feeder. Dropping it completes the source once the
/// queued items have drained.
pub struct Pipeline<T> {
    name: &'static str,
    tx: mpsc::Sender<T>,
    complete_rx: watch::Receiver<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

/// Consumer side of a feeder's pipeline, linked to a normalizer.
pub struct PipelineSource<T> {
    name: &'static str,
    rx: mpsc::Receiver<T>,
    complete_rx: watch::Receiver<bool>,
    watching: bool,
}

/// Handle used by the orchestrator to complete a pipeline's source.
#[derive(Clone)]
pub struct PipelineCompleter {
    name: &'static str,
    complete_tx: Arc<watch::Sender<bool>>,
}

impl<T: Send + 'static> Pipeline<T> {
    /// Create a pipeline bound to the shared shutdown signal.
    pub fn new(
        name: &'static str,
        shutdown_rx: watch::Receiver<bool>,
    ) -> (Pipeline<T>, PipelineSource<T>, PipelineCompleter) {
        let (tx, rx) = mpsc::channel(DEFAULT_CHANNEL_BUFFER);
        let (complete_tx, complete_rx) = watch::channel(false);
        (
            Pipeline {
                name,
                tx,
                complete_rx: complete_rx.clone(),
                shutdown_rx,
            },
            PipelineSource {
                name,
                rx,
                complete_rx,
                watching: true,
            },
            PipelineCompleter {
                name,
                complete_tx: Arc::new(complete_tx),
            },
        )
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// A fresh receiver of the shared shutdown signal.
    pub fn shutdown_rx(&self) -> watch::Receiver<bool> {
        self.shutdown_rx.clone()
    }

    pub fn is_cancelled(&self) -> bool {
        *self.shutdown_rx.borrow()
    }

    /// Hand an item to the source, suspending while the queue is full.
    pub async fn send(&self, item: T) -> Result<(), SendError> {
        if self.is_cancelled() {
            return Err(SendError::Cancelled);
        }
        if *self.complete_rx.borrow() {
            return Err(SendError::Completed);
        }

        let mut shutdown_rx = self.shutdown_rx.clone();
        tokio::select! {
            biased;
            _ = cancelled(&mut shutdown_rx) => Err(SendError::Cancelled),
            sent = self.tx.send(item) => sent.map_err(|_| SendError::Completed),
        }
    }
}

impl<T> PipelineSource<T> {
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Receive the next queued item.
    ///
    /// Once the source has been completed, no new sends are accepted but
    /// items already queued are still returned. `None` means the source is
    /// completed and fully drained.
    pub async fn recv(&mut self) -> Option<T> {
        loop {
            if self.watching && *self.complete_rx.borrow_and_update() {
                self.rx.close();
                self.watching = false;
            }
            if !self.watching {
                return self.rx.recv().await;
            }

            tokio::select! {
                biased;
                item = self.rx.recv() => return item,
                changed = self.complete_rx.changed() => {
                    if changed.is_err() {
                        // Every completer is gone; completion can now only
                        // come from the producer dropping its sender.
                        self.watching = false;
                    }
                }
            }
        }
    }
}

impl PipelineCompleter {
    /// Mark the source complete: further sends fail, queued items drain.
    pub fn complete(&self) {
        if !self.complete_tx.send_replace(true) {
            tracing::debug!(pipeline = self.name, "Pipeline source marked complete");
        }
    }
}

/// Sender handle for the merge point feeding the fan-out.
pub type BroadcastSender = mpsc::Sender<BroadcastEvent>;
/// Receiver handle for the merge point feeding the fan-out.
pub type BroadcastReceiver = mpsc::Receiver<BroadcastEvent>;

/// Create the merge channel shared by all normalizers.
pub fn broadcast_channel() -> (BroadcastSender, BroadcastReceiver) {
    mpsc::channel(DEFAULT_CHANNEL_BUFFER)
}

/// Writer side of a sink's single-slot buffer, held by the fan-out.
///
/// Dropping it closes the slot; the sink still takes the last offered event.
pub struct SlotSender {
    shared: Arc<Slot>,
}

/// Reader side of a sink's single-slot buffer, held by the sink.
pub struct SlotReceiver {
    shared: Arc<Slot>,
}

struct Slot {
    item: Mutex<Option<Arc<BroadcastEvent>>>,
    closed: AtomicBool,
    notify: Notify,
}

impl Slot {
    fn take(&self) -> Option<Arc<BroadcastEvent>> {
        self.item
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

/// Create a single-slot buffer between the fan-out and one sink.
pub fn sink_slot() -> (SlotSender, SlotReceiver) {
    let shared = Arc::new(Slot {
        item: Mutex::new(None),
        closed: AtomicBool::new(false),
        notify: Notify::new(),
    });
    (
        SlotSender {
            shared: Arc::clone(&shared),
        },
        SlotReceiver { shared },
    )
}

impl SlotSender {
    /// Place an event in the slot, replacing any item the sink has not
    /// taken yet. Never blocks.
    ///
    /// Returns `true` if an untaken item was overwritten.
    pub fn offer(&self, event: Arc<BroadcastEvent>) -> bool {
        let previous = self
            .shared
            .item
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(event);
        self.shared.notify.notify_one();
        previous.is_some()
    }
}

impl Drop for SlotSender {
    fn drop(&mut self) {
        self.shared.closed.store(true, Ordering::Release);
        self.shared.notify.notify_one();
    }
}

impl SlotReceiver {
    /// Take the next event from the slot.
    ///
    /// Returns `None` once the fan-out has completed and the last offered
    /// event has been taken.
    pub async fn recv(&mut self) -> Option<Arc<BroadcastEvent>> {
        loop {
            if let Some(event) = self.shared.take() {
                return Some(event);
            }
            if self.shared.closed.load(Ordering::Acquire) {
                // An offer may have raced with the close.
                return self.shared.take();
            }
            self.shared.notify.notified().await;
        }
    }
}
