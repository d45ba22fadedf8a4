//! SID allocation.
//!
//! Policies:
//!   Monotonic: counter from 1, never reused, `None` once SID_MAX is reached
//!   Reuse    : counter from 1, wraps at SID_MAX, skips live sessions

use hub_core::config::SidPolicy;
use hub_core::{Sid, SID_MAX};

#[derive(Debug)]
pub struct SidAllocator {
    next: u32,
    policy: SidPolicy,
}

impl SidAllocator {
    pub fn new(policy: SidPolicy) -> Self {
        Self { next: 1, policy }
    }

    #[cfg(test)]
    fn starting_at(policy: SidPolicy, next: u32) -> Self {
        Self { next, policy }
    }

    pub fn policy(&self) -> SidPolicy {
        self.policy
    }

    /// Next value the allocator will try.
    pub fn cursor(&self) -> u32 {
        self.next
    }

    /// Hand out a SID. `is_live` is only consulted under `SidPolicy::Reuse`.
    pub fn allocate(&mut self, is_live: impl Fn(Sid) -> bool) -> Option<Sid> {
        match self.policy {
            SidPolicy::Monotonic => {
                let sid = Sid::new(self.next)?;
                self.next += 1;
                Some(sid)
            }
            SidPolicy::Reuse => {
                for _ in 1..SID_MAX {
                    if self.next >= SID_MAX {
                        self.next = 1;
                    }
                    let candidate = Sid::new(self.next)?;
                    self.next += 1;
                    if !is_live(candidate) {
                        return Some(candidate);
                    }
                }
                None
            }
        }
    }
}
