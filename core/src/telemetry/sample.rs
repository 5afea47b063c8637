//! Samples and the sample buffer

use alloc::vec::Vec;

use crate::error::BufferFull;

/// Most channels a single sample carries
pub const MAX_CHANNELS: usize = 3;

/// Channel values of one sample; NaN marks a failed acquisition
pub type Values = heapless::Vec<f32, MAX_CHANNELS>;

/// Build a [`Values`] from a slice, keeping at most [`MAX_CHANNELS`] values
pub fn values(readings: &[f32]) -> Values {
    readings.iter().copied().take(MAX_CHANNELS).collect()
}

/// One timestamped reading across all channels of a module
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// Wall-clock time of the acquisition, milliseconds since the Unix epoch
    pub timestamp_ms: u64,
    /// One value per channel, in channel order
    pub values: Values,
}

impl Sample {
    /// Create a sample
    pub fn new(timestamp_ms: u64, values: Values) -> Self {
        Self {
            timestamp_ms,
            values,
        }
    }
}

/// Clamp a requested buffer size to `[1, ceiling]`
///
/// ```
/// use node_core::telemetry::sample::clamp_capacity;
///
/// assert_eq!(clamp_capacity(0, 2000), 1);
/// assert_eq!(clamp_capacity(50, 2000), 50);
/// assert_eq!(clamp_capacity(5000, 1000), 1000);
/// ```
pub fn clamp_capacity(requested: usize, ceiling: usize) -> usize {
    requested.clamp(1, ceiling.max(1))
}

/// Append-only buffer of samples with a fixed capacity
///
/// Storage is allocated once per capacity; [`clear`](Self::clear) keeps the
/// allocation.
#[derive(Debug)]
pub struct SampleBuffer {
    samples: Vec<Sample>,
    capacity: usize,
}

impl SampleBuffer {
    /// Create an empty buffer holding at most `capacity` samples (at least 1)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `sample`
    ///
    /// # Errors
    ///
    /// Returns [`BufferFull`] if the buffer already holds `capacity` samples.
    pub fn push(&mut self, sample: Sample) -> Result<(), BufferFull> {
        if self.is_full() {
            return Err(BufferFull);
        }
        self.samples.push(sample);
        Ok(())
    }

    /// Whether the buffer holds `capacity` samples
    pub fn is_full(&self) -> bool {
        self.samples.len() >= self.capacity
    }

    /// Number of buffered samples
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether no samples are buffered
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Buffered samples, oldest first
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Drop all buffered samples
    pub fn clear(&mut self) {
        self.samples.clear();
    }
}
