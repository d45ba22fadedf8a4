//! Hub worker: the single owner of the `Hub`.
//!
//! Connection and command tasks hold a cloneable `HubHandle` and submit
//! requests over a bounded channel; the worker applies them one at a time,
//! interleaved with statistics ticks. Nothing else touches the directory,
//! so a tick never overlaps a mutation and shutdown never overlaps a tick.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::time::Instant;

use hub_core::{HubError, Message, Sid};

use crate::hub::Hub;
use crate::routing;
use crate::session::{QuitReason, Session, SessionSummary};
use crate::stats::HubStats;

/// Key for a directory lookup.
#[derive(Debug, Clone)]
pub enum Lookup {
    Sid(Sid),
    Cid(String),
    Nick(String),
}

/// Counters and statistics as seen by the worker at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HubSnapshot {
    pub count: usize,
    pub count_peak: usize,
    pub shared_size: u64,
    pub shared_files: u64,
    pub stats: HubStats,
}

pub enum HubRequest {
    AllocateSid {
        reply: oneshot::Sender<Result<Sid, HubError>>,
    },
    Login {
        session: Session,
        reply: oneshot::Sender<bool>,
    },
    Disconnect {
        sid: Sid,
        reason: QuitReason,
        reply: oneshot::Sender<Option<Session>>,
    },
    UpdateShare {
        sid: Sid,
        size: u64,
        files: u64,
        reply: oneshot::Sender<bool>,
    },
    RouteToUser {
        sid: Sid,
        message: Arc<Message>,
        reply: oneshot::Sender<bool>,
    },
    Broadcast {
        message: Arc<Message>,
        reply: oneshot::Sender<usize>,
    },
    /// The session's connection task has flushed its presence snapshot.
    SnapshotDrained {
        sid: Sid,
        reply: oneshot::Sender<bool>,
    },
    Find {
        key: Lookup,
        reply: oneshot::Sender<Option<SessionSummary>>,
    },
    Snapshot {
        reply: oneshot::Sender<HubSnapshot>,
    },
}

pub struct HubWorker {
    hub: Hub,
    requests: mpsc::Receiver<HubRequest>,
    shutdown: broadcast::Receiver<()>,
}

impl HubWorker {
    /// Wrap `hub` in a worker and return the handle callers use to reach it.
    pub fn new(hub: Hub, shutdown: broadcast::Receiver<()>) -> (HubHandle, Self) {
        let (tx, requests) = mpsc::channel(hub.config().worker.request_queue.max(1));
        let worker = Self {
            hub,
            requests,
            shutdown,
        };
        (HubHandle { tx }, worker)
    }

    /// Serve requests until shutdown is signalled or every handle is dropped,
    /// then tear the hub down.
    pub async fn run(mut self) {
        self.serve().await;
        // The statistics timer lived in `serve` and is gone by now.
        self.hub.shutdown();
        tracing::info!("hub worker stopped");
    }

    async fn serve(&mut self) {
        let interval = self.hub.config().stats.interval();
        let timer = tokio::time::sleep(interval);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.recv() => {
                    tracing::info!("hub worker shutting down");
                    return;
                }

                _ = &mut timer => {
                    self.hub.update_stats();
                    // Re-arm after the tick so a slow tick delays the next one.
                    timer.as_mut().reset(Instant::now() + interval);
                }

                req = self.requests.recv() => {
                    match req {
                        Some(req) => self.handle(req),
                        None => {
                            tracing::info!("all hub handles dropped, worker exiting");
                            return;
                        }
                    }
                }
            }
        }
    }

    fn handle(&mut self, req: HubRequest) {
        // A dropped reply receiver just means the caller stopped waiting.
        match req {
            HubRequest::AllocateSid { reply } => {
                let _ = reply.send(self.hub.allocate_sid());
            }
            HubRequest::Login { session, reply } => {
                let _ = reply.send(self.hub.login(session));
            }
            HubRequest::Disconnect { sid, reason, reply } => {
                let _ = reply.send(self.hub.disconnect(sid, reason));
            }
            HubRequest::UpdateShare {
                sid,
                size,
                files,
                reply,
            } => {
                let _ = reply.send(self.hub.directory_mut().update_share(sid, size, files));
            }
            HubRequest::RouteToUser {
                sid,
                message,
                reply,
            } => {
                let delivered = self
                    .hub
                    .directory()
                    .find_by_sid(sid)
                    .is_some_and(|target| routing::route_to_user(target, &message));
                let _ = reply.send(delivered);
            }
            HubRequest::Broadcast { message, reply } => {
                let _ = reply.send(routing::route_to_all(self.hub.directory(), &message));
            }
            HubRequest::SnapshotDrained { sid, reply } => {
                let _ = reply.send(self.hub.snapshot_drained(sid));
            }
            HubRequest::Find { key, reply } => {
                let directory = self.hub.directory();
                let found = match &key {
                    Lookup::Sid(sid) => directory.find_by_sid(*sid),
                    Lookup::Cid(cid) => directory.find_by_cid(cid),
                    Lookup::Nick(nick) => directory.find_by_nick(nick),
                };
                let _ = reply.send(found.map(Session::summary));
            }
            HubRequest::Snapshot { reply } => {
                let directory = self.hub.directory();
                let _ = reply.send(HubSnapshot {
                    count: directory.count(),
                    count_peak: directory.count_peak(),
                    shared_size: directory.shared_size(),
                    shared_files: directory.shared_files(),
                    stats: *self.hub.stats(),
                });
            }
        }
    }
}

/// Cloneable entry point to the hub worker.
#[derive(Clone)]
pub struct HubHandle {
    tx: mpsc::Sender<HubRequest>,
}

impl HubHandle {
    async fn request<T>(
        &self,
        build: impl FnOnce(oneshot::Sender<T>) -> HubRequest,
    ) -> Result<T, HubError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(build(reply))
            .await
            .map_err(|_| HubError::WorkerGone)?;
        rx.await.map_err(|_| HubError::WorkerGone)
    }

    pub async fn allocate_sid(&self) -> Result<Sid, HubError> {
        self.request(|reply| HubRequest::AllocateSid { reply }).await?
    }

    pub async fn login(&self, session: Session) -> Result<bool, HubError> {
        self.request(|reply| HubRequest::Login { session, reply }).await
    }

    pub async fn disconnect(
        &self,
        sid: Sid,
        reason: QuitReason,
    ) -> Result<Option<Session>, HubError> {
        self.request(|reply| HubRequest::Disconnect { sid, reason, reply })
            .await
    }

    pub async fn update_share(&self, sid: Sid, size: u64, files: u64) -> Result<bool, HubError> {
        self.request(|reply| HubRequest::UpdateShare {
            sid,
            size,
            files,
            reply,
        })
        .await
    }

    pub async fn route_to_user(&self, sid: Sid, message: Arc<Message>) -> Result<bool, HubError> {
        self.request(|reply| HubRequest::RouteToUser {
            sid,
            message,
            reply,
        })
        .await
    }

    pub async fn broadcast(&self, message: Arc<Message>) -> Result<usize, HubError> {
        self.request(|reply| HubRequest::Broadcast { message, reply })
            .await
    }

    pub async fn snapshot_drained(&self, sid: Sid) -> Result<bool, HubError> {
        self.request(|reply| HubRequest::SnapshotDrained { sid, reply })
            .await
    }

    pub async fn find(&self, key: Lookup) -> Result<Option<SessionSummary>, HubError> {
        self.request(|reply| HubRequest::Find { key, reply }).await
    }

    pub async fn snapshot(&self) -> Result<HubSnapshot, HubError> {
        self.request(|reply| HubRequest::Snapshot { reply }).await
    }
}
