//! Session directory: the authoritative set of connected sessions.
//!
//! Sessions are stored in join order. Lookups by SID, CID and nickname go
//! through secondary indexes; when a key is (wrongly) shared by several
//! sessions the earliest-joined one wins, same as a forward scan would.
//!
//! Share totals saturate at `u64::MAX`. Shares are client-reported, so a
//! saturated total is clamped rather than trusted.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use hub_core::config::SidPolicy;
use hub_core::{HubError, Sid};

use crate::allocator::SidAllocator;
use crate::session::{Credentials, Session};

/// Join sequences of every session carrying a key, earliest first.
type KeyIndex = HashMap<String, BTreeSet<u64>>;

pub struct SessionDirectory {
    // join sequence -> session
    sessions: BTreeMap<u64, Session>,
    by_sid: HashMap<Sid, u64>,
    by_cid: KeyIndex,
    by_nick: KeyIndex,
    next_seq: u64,
    count: usize,
    count_peak: usize,
    shared_size: u64,
    shared_files: u64,
    allocator: SidAllocator,
}

impl SessionDirectory {
    /// Create an empty directory with index space for `capacity` sessions.
    pub fn with_capacity(capacity: usize, policy: SidPolicy) -> Result<Self, HubError> {
        let mut by_sid = HashMap::new();
        let mut by_cid = HashMap::new();
        let mut by_nick = HashMap::new();
        by_sid.try_reserve(capacity)?;
        by_cid.try_reserve(capacity)?;
        by_nick.try_reserve(capacity)?;

        Ok(Self {
            sessions: BTreeMap::new(),
            by_sid,
            by_cid,
            by_nick,
            next_seq: 0,
            count: 0,
            count_peak: 0,
            shared_size: 0,
            shared_files: 0,
            allocator: SidAllocator::new(policy),
        })
    }

    /// Allocate a SID for a joining session.
    pub fn allocate_sid(&mut self) -> Option<Sid> {
        self.allocator.allocate(|sid| self.by_sid.contains_key(&sid))
    }

    pub fn allocator(&self) -> &SidAllocator {
        &self.allocator
    }

    /// Insert a session. Returns `false`, dropping the record, if its SID is
    /// already present.
    pub fn add(&mut self, session: Session) -> bool {
        let sid = session.sid();
        if self.by_sid.contains_key(&sid) {
            tracing::warn!(sid = %sid, nick = %session.nick, "refusing to add duplicate sid");
            return false;
        }

        let seq = self.next_seq;
        self.next_seq += 1;

        self.by_sid.insert(sid, seq);
        self.by_cid.entry(session.cid.clone()).or_default().insert(seq);
        self.by_nick.entry(session.nick.clone()).or_default().insert(seq);

        self.count += 1;
        self.count_peak = self.count_peak.max(self.count);
        self.shared_size = self.shared_size.saturating_add(session.shared_size());
        self.shared_files = self.shared_files.saturating_add(session.shared_files());

        tracing::debug!(
            sid = %sid,
            nick = %session.nick,
            count = self.count,
            "session added"
        );
        self.sessions.insert(seq, session);
        true
    }

    /// Remove a session and hand ownership back to the caller.
    pub fn remove(&mut self, sid: Sid) -> Option<Session> {
        let Some(seq) = self.by_sid.remove(&sid) else {
            tracing::debug!(sid = %sid, "remove of unknown sid ignored");
            return None;
        };
        let session = self.sessions.remove(&seq)?;

        unindex(&mut self.by_cid, &session.cid, seq);
        unindex(&mut self.by_nick, &session.nick, seq);
        self.release(&session);

        tracing::debug!(sid = %sid, count = self.count, "session removed");
        Some(session)
    }

    /// Replace a session's reported share, keeping hub totals in step.
    pub fn update_share(&mut self, sid: Sid, size: u64, files: u64) -> bool {
        let Some(session) = self.by_sid.get(&sid).and_then(|seq| self.sessions.get_mut(seq)) else {
            return false;
        };
        self.shared_size = self
            .shared_size
            .saturating_sub(session.shared_size())
            .saturating_add(size);
        self.shared_files = self
            .shared_files
            .saturating_sub(session.shared_files())
            .saturating_add(files);
        session.set_share(size, files);
        true
    }

    pub fn find_by_sid(&self, sid: Sid) -> Option<&Session> {
        self.by_sid.get(&sid).and_then(|seq| self.sessions.get(seq))
    }

    pub fn find_by_sid_mut(&mut self, sid: Sid) -> Option<&mut Session> {
        self.by_sid.get(&sid).and_then(|seq| self.sessions.get_mut(seq))
    }

    pub fn find_by_cid(&self, cid: &str) -> Option<&Session> {
        earliest(&self.by_cid, cid).and_then(|seq| self.sessions.get(&seq))
    }

    pub fn find_by_nick(&self, nick: &str) -> Option<&Session> {
        earliest(&self.by_nick, nick).and_then(|seq| self.sessions.get(&seq))
    }

    pub fn contains(&self, sid: Sid) -> bool {
        self.by_sid.contains_key(&sid)
    }

    /// All sessions in join order.
    pub fn iter(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values()
    }

    /// Logged-in sessions in join order.
    pub fn logged_in(&self) -> impl Iterator<Item = &Session> {
        self.sessions.values().filter(|s| s.is_logged_in())
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn count_peak(&self) -> usize {
        self.count_peak
    }

    pub fn shared_size(&self) -> u64 {
        self.shared_size
    }

    pub fn shared_files(&self) -> u64 {
        self.shared_files
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Tear down every remaining session.
    ///
    /// All sessions are marked `Credentials::None` before the first one is
    /// handed to `teardown`, so departure notices stay quiet. Each session is
    /// removed from the directory before its teardown runs. CID and nickname
    /// lookups are dropped up front and find nothing during teardown.
    pub fn shutdown(&mut self, mut teardown: impl FnMut(&SessionDirectory, Session)) {
        for session in self.sessions.values_mut() {
            session.credentials = Credentials::None;
        }
        self.by_cid = HashMap::new();
        self.by_nick = HashMap::new();

        let mut destroyed = 0usize;
        while let Some((_, session)) = self.sessions.pop_first() {
            self.by_sid.remove(&session.sid());
            self.release(&session);
            teardown(self, session);
            destroyed += 1;
        }

        self.by_sid = HashMap::new();
        tracing::info!(destroyed, "session directory shut down");
    }

    fn release(&mut self, session: &Session) {
        self.count -= 1;
        self.shared_size = self.shared_size.saturating_sub(session.shared_size());
        self.shared_files = self.shared_files.saturating_sub(session.shared_files());
    }
}

fn earliest(index: &KeyIndex, key: &str) -> Option<u64> {
    index.get(key).and_then(|seqs| seqs.first().copied())
}

fn unindex(index: &mut KeyIndex, key: &str, seq: u64) {
    if let Some(seqs) = index.get_mut(key) {
        seqs.remove(&seq);
        if seqs.is_empty() {
            index.remove(key);
        }
    }
}
