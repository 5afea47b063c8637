//! Time sources
//!
//! The control loop needs two clocks: a monotonic one for scheduling
//! (reconnect throttling, sampling cadence, heartbeats) and a wall clock for
//! the timestamps attached to published samples.

/// Millisecond time source
pub trait Clock {
    /// Milliseconds since boot
    ///
    /// Must never go backwards. Used for every interval comparison and for
    /// the `ts` field of heartbeat and config-sync messages.
    fn monotonic_ms(&self) -> u64;

    /// Milliseconds since the Unix epoch
    ///
    /// Returns 0 (or a boot-relative value) until the board's time
    /// synchronization has completed. Used for sample timestamps.
    fn epoch_ms(&self) -> u64;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn monotonic_ms(&self) -> u64 {
        (**self).monotonic_ms()
    }

    fn epoch_ms(&self) -> u64 {
        (**self).epoch_ms()
    }
}
