//! Session counters for logs and the teardown summary.

use std::sync::atomic::{AtomicU64, Ordering};

/// Thread-safe counters for one verification session.
#[derive(Debug, Default)]
pub struct ClientStats {
    /// Video segments handed to the channel.
    pub segments_sent: AtomicU64,
    /// Motion samples collected from the sensor.
    pub samples_collected: AtomicU64,
    /// Telemetry batches handed to the channel.
    pub batches_sent: AtomicU64,
    /// Transport reopens after an outage.
    pub reconnects: AtomicU64,
    /// Control messages received from the backend.
    pub control_messages: AtomicU64,
}

impl ClientStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_segment(&self) {
        self.segments_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_samples(&self, count: u64) {
        self.samples_collected.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_batch(&self) {
        self.batches_sent.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_reconnect(&self) {
        self.reconnects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_control_message(&self) {
        self.control_messages.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            segments_sent: self.segments_sent.load(Ordering::Relaxed),
            samples_collected: self.samples_collected.load(Ordering::Relaxed),
            batches_sent: self.batches_sent.load(Ordering::Relaxed),
            reconnects: self.reconnects.load(Ordering::Relaxed),
            control_messages: self.control_messages.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the counters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatsSnapshot {
    pub segments_sent: u64,
    pub samples_collected: u64,
    pub batches_sent: u64,
    pub reconnects: u64,
    pub control_messages: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate_into_the_snapshot() {
        let stats = ClientStats::new();
        stats.record_segment();
        stats.record_segment();
        stats.record_samples(10);
        stats.record_batch();
        stats.record_reconnect();
        stats.record_control_message();

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.segments_sent, 2);
        assert_eq!(snapshot.samples_collected, 10);
        assert_eq!(snapshot.batches_sent, 1);
        assert_eq!(snapshot.reconnects, 1);
        assert_eq!(snapshot.control_messages, 1);
    }
}
