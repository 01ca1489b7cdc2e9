//! Event emission towards the stream consumer

use council_domain::PipelineEvent;
use tokio::sync::mpsc;
use tracing::{debug, warn};

/// Writes events into the run's output channel.
///
/// Once the receiver is gone the emitter goes quiet for good; the
/// controller notices at its next stage boundary and stops the run.
pub struct EventEmitter {
    tx: Option<mpsc::Sender<PipelineEvent>>,
    disconnected: bool,
}

impl EventEmitter {
    pub fn new(tx: mpsc::Sender<PipelineEvent>) -> Self {
        Self {
            tx: Some(tx),
            disconnected: false,
        }
    }

    /// An emitter with no consumer; events are dropped.
    pub fn disabled() -> Self {
        Self {
            tx: None,
            disconnected: false,
        }
    }

    pub async fn emit(&mut self, event: PipelineEvent) {
        let Some(tx) = &self.tx else {
            return;
        };
        let name = event.name();
        if tx.send(event).await.is_err() {
            warn!("Event consumer disconnected; dropping {} and all later events", name);
            self.tx = None;
            self.disconnected = true;
        } else {
            debug!("Emitted {}", name);
        }
    }

    /// The consumer went away after the stream started.
    pub fn is_disconnected(&self) -> bool {
        self.disconnected || self.tx.as_ref().is_some_and(|tx| tx.is_closed())
    }
}
