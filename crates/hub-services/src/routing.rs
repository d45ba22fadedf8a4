//! Routing: deliver messages to one session or to every logged-in session.
//!
//! Two broadcast shapes with different failure handling:
//!   route_to_all          : best effort, a refused recipient is skipped
//!   send_presence_snapshot: one target, stops at the first refusal

use std::sync::Arc;

use hub_core::message::{Command, Message, QUIT_FLAG_DISCONNECT};

use crate::directory::SessionDirectory;
use crate::session::Session;

/// Queue `msg` on the target's outbound path.
pub fn route_to_user(target: &Session, msg: &Arc<Message>) -> bool {
    let accepted = target.sink.send(Arc::clone(msg));
    if !accepted {
        tracing::trace!(sid = %target.sid(), command = %msg.command(), "message refused");
    }
    accepted
}

/// Deliver `msg` to every logged-in session. Returns how many accepted it.
pub fn route_to_all(directory: &SessionDirectory, msg: &Arc<Message>) -> usize {
    let mut delivered = 0;
    for session in directory.logged_in() {
        if route_to_user(session, msg) {
            delivered += 1;
        }
    }
    delivered
}

/// Push the presence payload of every logged-in session to `target`.
///
/// `target` is the joining session and is not in `directory` yet. The
/// snapshot mark stays set if the target still has a backlog afterwards;
/// the connection task clears it once the queue drains.
pub fn send_presence_snapshot(directory: &SessionDirectory, target: &mut Session) -> bool {
    target.flags.receiving_snapshot = true;

    let mut ok = true;
    for session in directory.logged_in() {
        ok = route_to_user(target, &session.info);
        if !ok {
            tracing::debug!(
                sid = %target.sid(),
                stopped_at = %session.sid(),
                "presence snapshot aborted"
            );
            break;
        }
    }

    if target.sink.queue_len() == 0 {
        target.flags.receiving_snapshot = false;
    }
    ok
}

/// Build the quit notice for a departing session.
pub fn departure_notice(leaving: &Session) -> Message {
    let mut msg = Message::with_capacity(Command::IQUI, 2);
    msg.add_argument(leaving.sid().to_string());
    if leaving.quit_reason.is_forced() {
        msg.add_argument(QUIT_FLAG_DISCONNECT);
    }
    msg
}

/// Tell every logged-in session that `leaving` is gone.
pub fn send_departure_notice(directory: &SessionDirectory, leaving: &Session) -> usize {
    let msg = Arc::new(departure_notice(leaving));
    let delivered = route_to_all(directory, &msg);
    tracing::debug!(
        sid = %leaving.sid(),
        reason = ?leaving.quit_reason,
        delivered,
        "departure notice sent"
    );
    delivered
}

/// Announce a session's presence payload to every logged-in session.
pub fn route_info_update(directory: &SessionDirectory, session: &Session) -> usize {
    route_to_all(directory, &session.info)
}
