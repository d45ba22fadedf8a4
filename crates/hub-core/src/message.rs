//! Protocol messages as seen by the routing core.
//!
//! The core never parses payloads. A message is a four-letter command tag
//! plus a list of string arguments; it is built once, handed to routing
//! (shared between recipients as `Arc<Message>`) and dropped afterwards.

use std::fmt;

/// Argument appended to a quit notice when the session was forcibly removed.
pub const QUIT_FLAG_DISCONNECT: &str = "DI1";

/// Four-letter command tag, e.g. `IQUI` or `BINF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Command([u8; 4]);

impl Command {
    /// Hub → client: a session has left.
    pub const IQUI: Command = Command(*b"IQUI");
    /// Broadcast presence/info of a session.
    pub const BINF: Command = Command(*b"BINF");
    /// Hub → client: hub's own info.
    pub const IINF: Command = Command(*b"IINF");
    /// Hub → client: status line.
    pub const ISTA: Command = Command(*b"ISTA");

    pub const fn new(tag: [u8; 4]) -> Self {
        Self(tag)
    }

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for b in self.0 {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    command: Command,
    args: Vec<String>,
}

impl Message {
    pub fn new(command: Command) -> Self {
        Self {
            command,
            args: Vec::new(),
        }
    }

    /// Pre-size the argument list when the caller knows how many follow.
    pub fn with_capacity(command: Command, args: usize) -> Self {
        Self {
            command,
            args: Vec::with_capacity(args),
        }
    }

    pub fn add_argument(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    pub fn command(&self) -> Command {
        self.command
    }

    pub fn arguments(&self) -> &[String] {
        &self.args
    }

    pub fn has_argument(&self, arg: &str) -> bool {
        self.args.iter().any(|a| a == arg)
    }
}

/// Renders the message as a single protocol line, arguments escaped
/// (`\s` for space, `\n` for newline, `\\` for backslash).
impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command)?;
        for arg in &self.args {
            f.write_str(" ")?;
            for c in arg.chars() {
                match c {
                    ' ' => f.write_str("\\s")?,
                    '\n' => f.write_str("\\n")?,
                    '\\' => f.write_str("\\\\")?,
                    other => write!(f, "{other}")?,
                }
            }
        }
        f.write_str("\n")
    }
}
