//! Hub integration test harness.
//!
//! Each test runs a real hub worker in-process and joins sessions through a
//! `HubHandle`, the same path connection tasks take. Sessions use channel
//! sinks; the test reads the receiving end as the client would.
//!
//!   cargo test --test integration

pub use std::sync::Arc;

pub use anyhow::{Context, Result};
pub use tokio::sync::{broadcast, mpsc};

pub use hub_core::message::{Command, QUIT_FLAG_DISCONNECT};
pub use hub_core::{HubConfig, Message, Sid};
pub use hub_services::{
    ChannelSink, Credentials, Hub, HubHandle, HubWorker, Lookup, NetStats, QuitReason, Session,
    SessionState,
};

mod departure;
mod join;
mod lifecycle;

// ── Harness ───────────────────────────────────────────────────────────────────

/// A hub worker running on the test runtime.
pub struct TestHub {
    pub handle: HubHandle,
    pub net: Arc<NetStats>,
    config: HubConfig,
    shutdown: broadcast::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

/// The client side of a joined session.
pub struct Client {
    pub sid: Sid,
    pub rx: mpsc::Receiver<Arc<Message>>,
}

impl TestHub {
    pub fn start(config: HubConfig) -> Self {
        let net = Arc::new(NetStats::new());
        let hub = Hub::init(config.clone(), net.clone()).expect("hub init failed");
        let (shutdown, shutdown_rx) = broadcast::channel(1);
        let (handle, worker) = HubWorker::new(hub, shutdown_rx);
        let task = tokio::spawn(worker.run());
        Self {
            handle,
            net,
            config,
            shutdown,
            task,
        }
    }

    /// Allocate a SID and log a session in with `share` bytes shared. The
    /// client's queue depth comes from `sessions.send_queue_capacity`.
    pub async fn join(&self, nick: &str, share: u64) -> Result<Client> {
        let sid = self.handle.allocate_sid().await?;
        let (sink, rx) = ChannelSink::for_config(&self.config);
        let session = Session::new(sid, format!("CID{nick}"), nick, sink)
            .with_credentials(Credentials::User)
            .with_share(share, 1);
        let accepted = self.handle.login(session).await?;
        anyhow::ensure!(accepted, "login of {nick} rejected");
        Ok(Client { sid, rx })
    }

    /// Signal shutdown and wait for the worker to finish teardown.
    pub async fn stop(self) {
        let _ = self.shutdown.send(());
        self.task.await.expect("hub worker panicked");
    }
}

/// Everything currently queued for a client.
pub fn drain(rx: &mut mpsc::Receiver<Arc<Message>>) -> Vec<Arc<Message>> {
    let mut out = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        out.push(msg);
    }
    out
}

/// First argument (the SID) of every queued message.
pub fn drain_sids(rx: &mut mpsc::Receiver<Arc<Message>>) -> Vec<String> {
    drain(rx)
        .iter()
        .map(|m| m.arguments().first().cloned().unwrap_or_default())
        .collect()
}
