//! Session identifiers.
//!
//! A SID is a 20-bit value assigned by the hub when a session joins. On the
//! wire it is always four base32 characters, most significant first:
//!
//!   1        → "AAAB"
//!   SID_MAX-1 → "7777"
//!
//! SID 0 is never handed out.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Exclusive upper bound for SID values (20 bits).
pub const SID_MAX: u32 = 1 << 20;

const BASE32_ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Short unique identifier of a connected session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sid(u32);

impl Sid {
    /// Returns `None` for 0 and for anything that does not fit in 20 bits.
    pub fn new(value: u32) -> Option<Self> {
        if value == 0 || value >= SID_MAX {
            None
        } else {
            Some(Self(value))
        }
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Four-character base32 rendering.
    pub fn encode(self) -> [u8; 4] {
        let mut out = [0u8; 4];
        let mut v = self.0;
        for slot in out.iter_mut().rev() {
            *slot = BASE32_ALPHABET[(v % 32) as usize];
            v /= 32;
        }
        out
    }
}

impl fmt::Display for Sid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let bytes = self.encode();
        // Alphabet is pure ASCII.
        f.write_str(std::str::from_utf8(&bytes).map_err(|_| fmt::Error)?)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SidParseError {
    #[error("sid must be exactly 4 characters, got {0}")]
    BadLength(usize),
    #[error("invalid base32 character {0:?} in sid")]
    BadChar(char),
    #[error("sid 0 is reserved")]
    Zero,
}

impl FromStr for Sid {
    type Err = SidParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 4 {
            return Err(SidParseError::BadLength(s.len()));
        }
        let mut value = 0u32;
        for c in s.chars() {
            let digit = match c {
                'A'..='Z' => c as u32 - 'A' as u32,
                '2'..='7' => c as u32 - '2' as u32 + 26,
                other => return Err(SidParseError::BadChar(other)),
            };
            value = value * 32 + digit;
        }
        Sid::new(value).ok_or(SidParseError::Zero)
    }
}
