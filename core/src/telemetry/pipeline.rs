//! Record and publish cycle

use crate::error::BufferFull;
use crate::protocol::SessionIdentity;

use super::batch;
use super::sample::{Sample, SampleBuffer};

/// Destination for encoded data batches
pub trait TelemetrySink {
    /// Publish one batch; `false` if it was not accepted
    fn publish_batch(&mut self, payload: &[u8]) -> bool;
}

/// What [`TelemetryPipeline::maybe_publish`] did with the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BatchOutcome {
    /// Buffer not full yet; nothing happened
    Filling,
    /// Batch accepted by the sink
    Published,
    /// Publish attempted and refused; batch dropped
    Failed,
    /// Not transmitting; batch discarded without a publish call
    Discarded,
}

/// Buffers one module's samples and hands full batches to a sink
#[derive(Debug)]
pub struct TelemetryPipeline {
    channels: &'static [&'static str],
    buffer: SampleBuffer,
}

impl TelemetryPipeline {
    /// Create a pipeline for a module with the given channel names
    pub fn new(channels: &'static [&'static str], capacity: usize) -> Self {
        Self {
            channels,
            buffer: SampleBuffer::new(capacity),
        }
    }

    /// Change the buffer capacity
    ///
    /// A different capacity reallocates the buffer and discards any partial
    /// batch. The same capacity is a no-op. Returns whether the buffer was
    /// replaced.
    pub fn resize(&mut self, capacity: usize) -> bool {
        if capacity.max(1) == self.buffer.capacity() {
            return false;
        }
        if !self.buffer.is_empty() {
            debug!("Discarding {} buffered samples on resize", self.buffer.len());
        }
        self.buffer = SampleBuffer::new(capacity);
        true
    }

    /// Append a sample
    ///
    /// # Errors
    ///
    /// Returns [`BufferFull`] if the previous batch was not flushed with
    /// [`maybe_publish`](Self::maybe_publish).
    pub fn record(&mut self, sample: Sample) -> Result<(), BufferFull> {
        self.buffer.push(sample)
    }

    /// Flush the buffer once it is full
    ///
    /// Publishes through `sink` only while `session` is transmitting. The
    /// buffer is cleared after every flush, whether or not the publish
    /// succeeded.
    pub fn maybe_publish<S: TelemetrySink>(
        &mut self,
        session: &SessionIdentity,
        sink: &mut S,
    ) -> BatchOutcome {
        if !self.buffer.is_full() {
            return BatchOutcome::Filling;
        }

        let outcome = if !session.transmit_enabled() {
            BatchOutcome::Discarded
        } else {
            match batch::encode(session, self.channels, self.buffer.samples()) {
                Some(payload) if sink.publish_batch(&payload) => {
                    debug!("Published batch of {} samples", self.buffer.len());
                    BatchOutcome::Published
                }
                Some(_) => BatchOutcome::Failed,
                None => {
                    error!("Failed to encode batch");
                    BatchOutcome::Failed
                }
            }
        };

        self.buffer.clear();
        outcome
    }

    /// Channel names, in value order
    pub fn channels(&self) -> &'static [&'static str] {
        self.channels
    }

    /// The underlying buffer
    pub fn buffer(&self) -> &SampleBuffer {
        &self.buffer
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::sample::values;
    use std::vec::Vec;

    #[derive(Default)]
    struct Sink {
        accept: bool,
        batches: Vec<Vec<u8>>,
    }

    impl TelemetrySink for Sink {
        fn publish_batch(&mut self, payload: &[u8]) -> bool {
            self.batches.push(payload.to_vec());
            self.accept
        }
    }

    fn transmitting() -> SessionIdentity {
        let mut session = SessionIdentity::default();
        session.start(Some(1), Some(2));
        session
    }

    fn fill(pipeline: &mut TelemetryPipeline, count: u64) {
        for ts in 0..count {
            pipeline.record(Sample::new(ts, values(&[1.0]))).unwrap();
        }
    }

    #[test]
    fn test_full_buffer_publishes_once_then_resets() {
        let mut pipeline = TelemetryPipeline::new(&["v"], 3);
        let mut sink = Sink {
            accept: true,
            ..Default::default()
        };
        let session = transmitting();

        for ts in 0..2 {
            pipeline.record(Sample::new(ts, values(&[1.0]))).unwrap();
            assert_eq!(pipeline.maybe_publish(&session, &mut sink), BatchOutcome::Filling);
        }
        pipeline.record(Sample::new(2, values(&[1.0]))).unwrap();
        assert_eq!(pipeline.maybe_publish(&session, &mut sink), BatchOutcome::Published);
        assert_eq!(sink.batches.len(), 1);
        assert!(pipeline.buffer().is_empty());

        assert_eq!(pipeline.maybe_publish(&session, &mut sink), BatchOutcome::Filling);
        assert_eq!(sink.batches.len(), 1);
    }

    #[test]
    fn test_failed_publish_drops_batch() {
        let mut pipeline = TelemetryPipeline::new(&["v"], 2);
        let mut sink = Sink::default();
        fill(&mut pipeline, 2);

        assert_eq!(
            pipeline.maybe_publish(&transmitting(), &mut sink),
            BatchOutcome::Failed
        );
        assert_eq!(sink.batches.len(), 1);
        assert!(pipeline.buffer().is_empty());
    }

    #[test]
    fn test_not_transmitting_discards_without_publishing() {
        let mut pipeline = TelemetryPipeline::new(&["v"], 2);
        let mut sink = Sink {
            accept: true,
            ..Default::default()
        };
        fill(&mut pipeline, 2);

        assert_eq!(
            pipeline.maybe_publish(&SessionIdentity::default(), &mut sink),
            BatchOutcome::Discarded
        );
        assert!(sink.batches.is_empty());
        assert!(pipeline.buffer().is_empty());
    }

    #[test]
    fn test_record_refuses_when_full() {
        let mut pipeline = TelemetryPipeline::new(&["v"], 1);
        fill(&mut pipeline, 1);
        assert_eq!(
            pipeline.record(Sample::new(9, values(&[1.0]))),
            Err(BufferFull)
        );
        assert_eq!(pipeline.buffer().len(), 1);
    }

    #[test]
    fn test_resize_discards_partial_batch_only_on_change() {
        let mut pipeline = TelemetryPipeline::new(&["v"], 4);
        fill(&mut pipeline, 2);

        assert!(!pipeline.resize(4));
        assert_eq!(pipeline.buffer().len(), 2);

        assert!(pipeline.resize(8));
        assert!(pipeline.buffer().is_empty());
        assert_eq!(pipeline.buffer().capacity(), 8);
    }
}
