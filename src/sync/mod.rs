//! Outbound sync event port
//!
//! Live UI sessions learn about card/enrollment changes through sync
//! events. The core publishes through the [`SyncEventPublisher`] port and
//! never depends on a concrete transport; publishing is fire-and-forget
//! and never raises.

use crate::domain::SyncEvent;
use tokio::sync::broadcast;

/// Port for emitting sync events to live UI sessions.
#[cfg_attr(test, mockall::automock)]
pub trait SyncEventPublisher: Send + Sync {
    /// Emit one event. Must not fail; delivery problems are the
    /// publisher's to log and swallow.
    fn publish(&self, event: SyncEvent);
}

/// In-process fan-out to connected sessions via a broadcast channel.
#[derive(Clone)]
pub struct BroadcastSyncPublisher {
    tx: broadcast::Sender<SyncEvent>,
}

impl BroadcastSyncPublisher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe a live session to the event stream
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.tx.subscribe()
    }
}

impl SyncEventPublisher for BroadcastSyncPublisher {
    fn publish(&self, event: SyncEvent) {
        metrics::counter!("perks_sync_events_total").increment(1);
        // send only fails when no session is subscribed; the event is
        // ephemeral, so that is not an error
        if self.tx.send(event).is_err() {
            tracing::debug!("no live sessions; sync event dropped");
        }
    }
}

/// Publisher for contexts without a UI execution context (batch jobs,
/// maintenance binaries): emitting is a no-op.
#[derive(Debug, Clone, Default)]
pub struct NoopSyncPublisher;

impl SyncEventPublisher for NoopSyncPublisher {
    fn publish(&self, _event: SyncEvent) {}
}
