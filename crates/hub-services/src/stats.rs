//! Hub-wide traffic statistics, refreshed once per statistics interval.

use std::fmt;
use std::time::Duration;

use crate::traffic::TrafficSource;

/// Snapshot of hub traffic. Rates are bytes per second over the last
/// interval, totals are bytes since process start.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HubStats {
    pub net_tx: u64,
    pub net_rx: u64,
    pub net_tx_peak: u64,
    pub net_rx_peak: u64,
    pub net_tx_total: u64,
    pub net_rx_total: u64,
}

impl HubStats {
    /// Fold one interval of traffic into the snapshot and reset the source.
    ///
    /// Rates use integer division; anything below one byte per second of
    /// the remainder is dropped.
    pub fn update(&mut self, source: &dyn TrafficSource, interval: Duration) {
        let secs = interval.as_secs().max(1);
        let (since_reset, since_start) = source.take();

        self.net_tx = since_reset.tx / secs;
        self.net_rx = since_reset.rx / secs;
        self.net_tx_peak = self.net_tx_peak.max(self.net_tx);
        self.net_rx_peak = self.net_rx_peak.max(self.net_rx);
        self.net_tx_total = since_start.tx;
        self.net_rx_total = since_start.rx;
    }

    /// One summary line per interval.
    pub fn log_summary(&self, users: usize, peak_users: usize) {
        tracing::info!(
            users,
            peak_users,
            net_tx = %Rate(self.net_tx),
            net_rx = %Rate(self.net_rx),
            peak_tx = %Rate(self.net_tx_peak),
            peak_rx = %Rate(self.net_rx_peak),
            "statistics"
        );
    }
}

/// Byte rate formatted for humans: `B/s` under 1 KiB, `KB/s` above.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rate(pub u64);

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0 < 1024 {
            write!(f, "{} B/s", self.0)
        } else {
            write!(f, "{} KB/s", self.0 / 1024)
        }
    }
}
