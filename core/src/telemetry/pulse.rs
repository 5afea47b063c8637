//! Interrupt-fed pulse counting
//!
//! The edge interrupt only ever increments a [`PulseCounter`]; the control
//! loop takes the accumulated count once per sampling tick with a single
//! atomic swap, so no pulse is lost or counted twice.

use core::sync::atomic::{AtomicU32, Ordering};

/// Pulse count shared between an edge interrupt and the control loop
#[derive(Debug, Default)]
pub struct PulseCounter {
    count: AtomicU32,
}

impl PulseCounter {
    /// Create a counter at zero (usable in a `static`)
    pub const fn new() -> Self {
        Self {
            count: AtomicU32::new(0),
        }
    }

    /// Count one pulse; called from interrupt context
    pub fn record(&self) {
        self.count.fetch_add(1, Ordering::Release);
    }

    /// Return the pulses counted since the previous call and reset to zero
    pub fn take(&self) -> u32 {
        self.count.swap(0, Ordering::AcqRel)
    }
}

/// Measures the window each pulse count was accumulated over
#[derive(Debug, Default)]
pub struct PulseWindow {
    last_ms: Option<u64>,
}

impl PulseWindow {
    /// Seconds elapsed since the previous call
    ///
    /// The first call has no previous tick and returns `fallback_ms`
    /// (the configured interval). A zero-length window also falls back, so
    /// rates never divide by zero.
    pub fn elapsed_s(&mut self, now_ms: u64, fallback_ms: u32) -> f32 {
        let elapsed_ms = match self.last_ms {
            Some(last) => now_ms.saturating_sub(last),
            None => u64::from(fallback_ms),
        };
        self.last_ms = Some(now_ms);
        if elapsed_ms == 0 {
            return fallback_ms.max(1) as f32 / 1000.0;
        }
        elapsed_ms as f32 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_take_resets() {
        let counter = PulseCounter::new();
        counter.record();
        counter.record();
        assert_eq!(counter.take(), 2);
        assert_eq!(counter.take(), 0);
    }

    #[test]
    fn test_concurrent_producer_loses_nothing() {
        const PULSES: u32 = 200_000;
        let counter = Arc::new(PulseCounter::new());
        let done = Arc::new(AtomicBool::new(false));

        let producer = {
            let counter = Arc::clone(&counter);
            let done = Arc::clone(&done);
            thread::spawn(move || {
                for _ in 0..PULSES {
                    counter.record();
                }
                done.store(true, Ordering::Release);
            })
        };

        let mut total: u64 = 0;
        let mut snapshots = 0;
        while !done.load(Ordering::Acquire) {
            total += u64::from(counter.take());
            snapshots += 1;
        }
        producer.join().unwrap();
        total += u64::from(counter.take());

        assert_eq!(total, u64::from(PULSES));
        assert!(snapshots > 0);
    }

    #[test]
    fn test_window_measures_elapsed_time() {
        let mut window = PulseWindow::default();
        assert_eq!(window.elapsed_s(10_000, 1000), 1.0);
        assert_eq!(window.elapsed_s(10_500, 1000), 0.5);
        assert_eq!(window.elapsed_s(12_500, 1000), 2.0);
        assert_eq!(window.elapsed_s(12_500, 1000), 1.0);
    }
}
