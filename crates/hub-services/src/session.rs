//! Session records: the per-connection state the directory indexes.

use std::sync::Arc;

use hub_core::message::{Command, Message};
use hub_core::Sid;

use crate::sink::OutboundSink;

/// Authorization level of a session.
///
/// `None` doubles as the "already disconnecting" marker: no departure
/// notice is ever sent for a session carrying it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Credentials {
    #[default]
    None,
    Bot,
    Guest,
    User,
    Operator,
    Super,
    Link,
    Admin,
}

/// Where a session is in the join handshake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Protocol,
    Identify,
    Verify,
    /// Logged in. Only sessions in this state receive broadcasts.
    Normal,
    Cleanup,
    Disconnected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QuitReason {
    #[default]
    Unknown,
    Disconnected,
    Kicked,
    Banned,
    Timeout,
    SendQueue,
    MemoryError,
    SocketError,
    ProtocolError,
    LogonError,
    UpdateError,
    HubDisabled,
    GhostTimeout,
}

impl QuitReason {
    /// Ban and kick are announced with the disconnect flag.
    pub fn is_forced(self) -> bool {
        matches!(self, QuitReason::Banned | QuitReason::Kicked)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionFlags {
    /// Set while a full presence snapshot is queued for this session.
    pub receiving_snapshot: bool,
}

/// One connected client.
pub struct Session {
    sid: Sid,
    pub cid: String,
    pub nick: String,
    pub credentials: Credentials,
    pub state: SessionState,
    pub quit_reason: QuitReason,
    pub flags: SessionFlags,
    /// Presence payload pushed to other sessions.
    pub info: Arc<Message>,
    pub sink: Arc<dyn OutboundSink>,
    // Changed only through the directory so hub totals stay in step.
    shared_size: u64,
    shared_files: u64,
}

impl Session {
    pub fn new(
        sid: Sid,
        cid: impl Into<String>,
        nick: impl Into<String>,
        sink: Arc<dyn OutboundSink>,
    ) -> Self {
        let mut info = Message::new(Command::BINF);
        info.add_argument(sid.to_string());
        Self {
            sid,
            cid: cid.into(),
            nick: nick.into(),
            credentials: Credentials::None,
            state: SessionState::Protocol,
            quit_reason: QuitReason::Unknown,
            flags: SessionFlags::default(),
            info: Arc::new(info),
            sink,
            shared_size: 0,
            shared_files: 0,
        }
    }

    /// Set the reported share before the session enters the directory.
    pub fn with_share(mut self, size: u64, files: u64) -> Self {
        self.shared_size = size;
        self.shared_files = files;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_info(mut self, info: Message) -> Self {
        self.info = Arc::new(info);
        self
    }

    pub fn sid(&self) -> Sid {
        self.sid
    }

    pub fn shared_size(&self) -> u64 {
        self.shared_size
    }

    pub fn shared_files(&self) -> u64 {
        self.shared_files
    }

    pub(crate) fn set_share(&mut self, size: u64, files: u64) {
        self.shared_size = size;
        self.shared_files = files;
    }

    pub fn is_logged_in(&self) -> bool {
        self.state == SessionState::Normal
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            sid: self.sid,
            cid: self.cid.clone(),
            nick: self.nick.clone(),
            credentials: self.credentials,
            state: self.state,
            shared_size: self.shared_size,
            shared_files: self.shared_files,
            receiving_snapshot: self.flags.receiving_snapshot,
        }
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("sid", &self.sid)
            .field("cid", &self.cid)
            .field("nick", &self.nick)
            .field("credentials", &self.credentials)
            .field("state", &self.state)
            .field("quit_reason", &self.quit_reason)
            .field("shared_size", &self.shared_size)
            .field("shared_files", &self.shared_files)
            .finish_non_exhaustive()
    }
}

/// Owned copy of a session's identity, handed out across task boundaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub sid: Sid,
    pub cid: String,
    pub nick: String,
    pub credentials: Credentials,
    pub state: SessionState,
    pub shared_size: u64,
    pub shared_files: u64,
    /// Presence snapshot still queued on the session's outbound path.
    pub receiving_snapshot: bool,
}
