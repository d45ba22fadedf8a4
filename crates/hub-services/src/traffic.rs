//! Network traffic counters.
//!
//! Connection tasks add to the counters as bytes move; the hub samples them
//! once per statistics interval and resets the interval half.

use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TrafficSample {
    pub tx: u64,
    pub rx: u64,
}

pub trait TrafficSource: Send + Sync {
    /// Returns (bytes since last reset, bytes since process start).
    fn sample(&self) -> (TrafficSample, TrafficSample);

    /// Start a new interval.
    fn reset(&self);

    /// Sample and start a new interval in one step. Sources that can do
    /// this atomically should, so bytes recorded in between are not lost.
    fn take(&self) -> (TrafficSample, TrafficSample) {
        let sample = self.sample();
        self.reset();
        sample
    }
}

#[derive(Debug, Default)]
pub struct NetStats {
    interval_tx: AtomicU64,
    interval_rx: AtomicU64,
    total_tx: AtomicU64,
    total_rx: AtomicU64,
}

impl NetStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tx(&self, bytes: u64) {
        self.interval_tx.fetch_add(bytes, Ordering::Relaxed);
        self.total_tx.fetch_add(bytes, Ordering::Relaxed);
    }

    pub fn record_rx(&self, bytes: u64) {
        self.interval_rx.fetch_add(bytes, Ordering::Relaxed);
        self.total_rx.fetch_add(bytes, Ordering::Relaxed);
    }
}

impl TrafficSource for NetStats {
    fn sample(&self) -> (TrafficSample, TrafficSample) {
        let interval = TrafficSample {
            tx: self.interval_tx.load(Ordering::Relaxed),
            rx: self.interval_rx.load(Ordering::Relaxed),
        };
        let total = TrafficSample {
            tx: self.total_tx.load(Ordering::Relaxed),
            rx: self.total_rx.load(Ordering::Relaxed),
        };
        (interval, total)
    }

    fn reset(&self) {
        self.interval_tx.store(0, Ordering::Relaxed);
        self.interval_rx.store(0, Ordering::Relaxed);
    }

    fn take(&self) -> (TrafficSample, TrafficSample) {
        let interval = TrafficSample {
            tx: self.interval_tx.swap(0, Ordering::Relaxed),
            rx: self.interval_rx.swap(0, Ordering::Relaxed),
        };
        let total = TrafficSample {
            tx: self.total_tx.load(Ordering::Relaxed),
            rx: self.total_rx.load(Ordering::Relaxed),
        };
        (interval, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_clears_interval_but_not_totals() {
        let net = NetStats::new();
        net.record_tx(100);
        net.record_rx(40);

        let (interval, total) = net.sample();
        assert_eq!(interval, TrafficSample { tx: 100, rx: 40 });
        assert_eq!(total, interval);

        net.reset();
        net.record_tx(5);
        let (interval, total) = net.sample();
        assert_eq!(interval, TrafficSample { tx: 5, rx: 0 });
        assert_eq!(total, TrafficSample { tx: 105, rx: 40 });
    }

    #[test]
    fn take_starts_a_new_interval() {
        let net = NetStats::new();
        net.record_rx(700);

        let (interval, total) = net.take();
        assert_eq!(interval.rx, 700);
        assert_eq!(total.rx, 700);

        net.record_rx(3);
        let (interval, total) = net.take();
        assert_eq!(interval.rx, 3);
        assert_eq!(total.rx, 703);
    }

    /// A source with only `sample` and `reset` still gets a working `take`.
    #[test]
    fn default_take_samples_then_resets() {
        struct Fixed(std::sync::Mutex<u64>);
        impl TrafficSource for Fixed {
            fn sample(&self) -> (TrafficSample, TrafficSample) {
                let tx = *self.0.lock().unwrap();
                (TrafficSample { tx, rx: 0 }, TrafficSample { tx: 100, rx: 0 })
            }
            fn reset(&self) {
                *self.0.lock().unwrap() = 0;
            }
        }

        let source = Fixed(std::sync::Mutex::new(42));
        assert_eq!(source.take().0.tx, 42);
        assert_eq!(source.sample().0.tx, 0);
    }
}
