//! Hub context: owns the session directory and statistics for the life of
//! the process. Not shared: exactly one owner (the hub worker) calls into it.

use std::sync::Arc;

use hub_core::{HubConfig, HubError, Sid};

use crate::directory::SessionDirectory;
use crate::routing;
use crate::session::{Credentials, QuitReason, Session, SessionState};
use crate::stats::HubStats;
use crate::traffic::TrafficSource;

pub struct Hub {
    config: HubConfig,
    directory: SessionDirectory,
    stats: HubStats,
    traffic: Arc<dyn TrafficSource>,
}

impl Hub {
    /// Allocate the directory. The first statistics tick is armed by whoever
    /// drives the hub (see `HubWorker`).
    pub fn init(config: HubConfig, traffic: Arc<dyn TrafficSource>) -> Result<Self, HubError> {
        let directory = SessionDirectory::with_capacity(
            config.sessions.initial_capacity,
            config.sessions.sid_policy,
        )?;

        tracing::info!(
            sid_policy = ?config.sessions.sid_policy,
            stats_interval_secs = config.stats.interval().as_secs(),
            "hub initialised"
        );

        Ok(Self {
            config,
            directory,
            stats: HubStats::default(),
            traffic,
        })
    }

    pub fn config(&self) -> &HubConfig {
        &self.config
    }

    pub fn directory(&self) -> &SessionDirectory {
        &self.directory
    }

    pub fn directory_mut(&mut self) -> &mut SessionDirectory {
        &mut self.directory
    }

    pub fn stats(&self) -> &HubStats {
        &self.stats
    }

    pub fn allocate_sid(&mut self) -> Result<Sid, HubError> {
        self.directory.allocate_sid().ok_or_else(|| {
            tracing::error!(
                policy = ?self.directory.allocator().policy(),
                "no session identifiers left"
            );
            HubError::SidExhausted
        })
    }

    /// Complete a join: push the current presence list to the newcomer, mark
    /// it logged in, insert it and announce it to everyone (itself included).
    ///
    /// Returns `false` and drops the session if it is already marked as
    /// disconnecting, if its SID is taken, or if it refuses the snapshot; its
    /// connection task sees the closed sink.
    pub fn login(&mut self, mut session: Session) -> bool {
        let sid = session.sid();
        if session.credentials == Credentials::None {
            tracing::info!(sid = %sid, nick = %session.nick, "login refused, session is disconnecting");
            return false;
        }
        if self.directory.contains(sid) {
            tracing::warn!(sid = %sid, nick = %session.nick, "login refused, sid already in use");
            return false;
        }
        if !routing::send_presence_snapshot(&self.directory, &mut session) {
            tracing::info!(sid = %sid, nick = %session.nick, "login aborted during presence snapshot");
            return false;
        }

        session.state = SessionState::Normal;
        if !self.directory.add(session) {
            return false;
        }

        if let Some(session) = self.directory.find_by_sid(sid) {
            tracing::info!(sid = %sid, nick = %session.nick, cid = %session.cid, "session logged in");
            routing::route_info_update(&self.directory, session);
        }
        true
    }

    /// The newcomer's connection task has flushed its presence snapshot.
    /// Returns `false` if the session is gone.
    pub fn snapshot_drained(&mut self, sid: Sid) -> bool {
        match self.directory.find_by_sid_mut(sid) {
            Some(session) => {
                session.flags.receiving_snapshot = false;
                true
            }
            None => false,
        }
    }

    /// Remove a session and, unless it is already marked as disconnecting,
    /// tell everyone it left. The record is handed back for final teardown.
    pub fn disconnect(&mut self, sid: Sid, reason: QuitReason) -> Option<Session> {
        let mut session = self.directory.remove(sid)?;
        session.quit_reason = reason;
        notify_departure(&self.directory, &session);
        session.state = SessionState::Cleanup;
        tracing::info!(sid = %sid, nick = %session.nick, ?reason, "session disconnected");
        Some(session)
    }

    /// One statistics tick.
    pub fn update_stats(&mut self) {
        let interval = self.config.stats.interval();
        self.stats.update(self.traffic.as_ref(), interval);
        self.stats
            .log_summary(self.directory.count(), self.directory.count_peak());
    }

    /// Orderly teardown of every remaining session. Nobody is told about the
    /// departures: the directory marks all sessions first.
    pub fn shutdown(mut self) {
        tracing::info!(remaining = self.directory.count(), "hub shutting down");
        self.directory.shutdown(|remaining, mut session| {
            notify_departure(remaining, &session);
            session.state = SessionState::Disconnected;
            tracing::trace!(sid = %session.sid(), "session destroyed");
        });
    }
}

fn notify_departure(directory: &SessionDirectory, leaving: &Session) {
    if leaving.is_logged_in() && leaving.credentials != Credentials::None {
        routing::send_departure_notice(directory, leaving);
    }
}
