//! Telemetry batching.

use parallax_types::MotionSample;

/// Default motion samples per transport batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Collects motion samples into transport batches.
///
/// Every sample pushed leaves exactly once, in push order: `push` hands out
/// a batch the moment it fills, and `flush` hands out the short remainder on
/// terminal events. The buffer never holds more than one batch.
#[derive(Debug)]
pub struct TelemetryBuffer {
    batch_size: usize,
    samples: Vec<MotionSample>,
}

impl TelemetryBuffer {
    pub fn new(batch_size: usize) -> Self {
        let batch_size = batch_size.max(1);
        Self {
            batch_size,
            samples: Vec::with_capacity(batch_size),
        }
    }

    /// Add one sample. Returns the completed batch when this push fills it.
    pub fn push(&mut self, sample: MotionSample) -> Option<Vec<MotionSample>> {
        self.samples.push(sample);
        if self.samples.len() >= self.batch_size {
            Some(std::mem::take(&mut self.samples))
        } else {
            None
        }
    }

    /// Hand out whatever is buffered, possibly short of a full batch.
    pub fn flush(&mut self) -> Option<Vec<MotionSample>> {
        if self.samples.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.samples))
        }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_types::{Acceleration, RotationRate};

    fn sample(ts: f64) -> MotionSample {
        MotionSample::new(ts, Acceleration::default(), RotationRate::default())
    }

    #[test]
    fn push_hands_out_exactly_full_batches() {
        let mut buffer = TelemetryBuffer::new(3);
        assert!(buffer.push(sample(1.0)).is_none());
        assert!(buffer.push(sample(2.0)).is_none());

        let batch = buffer.push(sample(3.0)).expect("third push fills the batch");
        assert_eq!(batch.len(), 3);
        assert_eq!(batch[0].timestamp, 1.0);
        assert_eq!(batch[2].timestamp, 3.0);
        assert!(buffer.is_empty());
    }

    #[test]
    fn flush_hands_out_the_short_remainder() {
        let mut buffer = TelemetryBuffer::new(10);
        buffer.push(sample(1.0));
        buffer.push(sample(2.0));

        let remainder = buffer.flush().expect("two samples pending");
        assert_eq!(remainder.len(), 2);
        assert!(buffer.flush().is_none());
    }

    #[test]
    fn flush_of_an_empty_buffer_is_nothing() {
        let mut buffer = TelemetryBuffer::new(10);
        assert!(buffer.flush().is_none());
    }

    #[test]
    fn zero_batch_size_degrades_to_one() {
        let mut buffer = TelemetryBuffer::new(0);
        assert!(buffer.push(sample(1.0)).is_some());
    }
}
