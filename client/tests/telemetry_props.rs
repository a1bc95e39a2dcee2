use proptest::prelude::*;

use parallax_client::TelemetryBuffer;
use parallax_types::{Acceleration, MotionSample, RotationRate};

fn sample(ts: f64) -> MotionSample {
    MotionSample::new(ts, Acceleration::default(), RotationRate::default())
}

proptest! {
    /// Batching partitions the input: pushing any sample stream and then
    /// flushing yields batches whose concatenation is exactly the input, in
    /// order, with every batch full except possibly the last.
    #[test]
    fn batches_partition_the_sample_stream(
        count in 0usize..200,
        batch_size in 1usize..20,
    ) {
        let samples: Vec<MotionSample> = (0..count).map(|i| sample(i as f64)).collect();

        let mut buffer = TelemetryBuffer::new(batch_size);
        let mut batches = Vec::new();
        for s in &samples {
            if let Some(batch) = buffer.push(*s) {
                batches.push(batch);
            }
        }
        if let Some(batch) = buffer.flush() {
            batches.push(batch);
        }

        if let Some((last, full)) = batches.split_last() {
            for batch in full {
                prop_assert_eq!(batch.len(), batch_size);
            }
            prop_assert!(last.len() <= batch_size);
            prop_assert!(!last.is_empty());
        }

        let rejoined: Vec<MotionSample> = batches.into_iter().flatten().collect();
        prop_assert_eq!(rejoined, samples);

        // Nothing is held back after a flush.
        prop_assert!(buffer.is_empty());
    }

    /// A zero batch size degrades to one sample per batch rather than a
    /// buffer that can never fill.
    #[test]
    fn zero_batch_size_still_drains(count in 1usize..50) {
        let mut buffer = TelemetryBuffer::new(0);
        let mut emitted = 0usize;
        for i in 0..count {
            if let Some(batch) = buffer.push(sample(i as f64)) {
                emitted += batch.len();
            }
        }
        prop_assert_eq!(emitted, count);
        prop_assert!(buffer.flush().is_none());
    }
}
