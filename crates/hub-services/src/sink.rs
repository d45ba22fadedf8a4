//! Outbound path of a session.
//!
//! Routing hands a message to the sink and moves on; flushing to the socket
//! is the connection task's job.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use hub_core::{HubConfig, Message};

pub trait OutboundSink: Send + Sync {
    /// Queue a message. `false` means the session cannot take it right now.
    fn send(&self, msg: Arc<Message>) -> bool;

    /// Messages queued but not yet picked up by the connection task.
    fn queue_len(&self) -> usize;
}

/// Sink backed by a bounded channel drained by the session's connection task.
pub struct ChannelSink {
    tx: mpsc::Sender<Arc<Message>>,
}

impl ChannelSink {
    pub fn channel(capacity: usize) -> (Arc<Self>, mpsc::Receiver<Arc<Message>>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Arc::new(Self { tx }), rx)
    }

    /// Channel sized by `sessions.send_queue_capacity`.
    pub fn for_config(config: &HubConfig) -> (Arc<Self>, mpsc::Receiver<Arc<Message>>) {
        Self::channel(config.sessions.send_queue_capacity)
    }
}

impl OutboundSink for ChannelSink {
    fn send(&self, msg: Arc<Message>) -> bool {
        match self.tx.try_send(msg) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => {
                tracing::debug!("send queue full, message rejected");
                false
            }
            Err(TrySendError::Closed(_)) => false,
        }
    }

    fn queue_len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }
}
