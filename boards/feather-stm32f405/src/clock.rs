#![deny(unsafe_code)]
#![deny(warnings)]
//! Monotonic and wall-clock time
//!
//! - **Monotonic**: `embassy_time::Instant` in milliseconds since boot
//! - **Wall clock**: monotonic + a Unix offset captured at SNTP calibration
//!
//! Until the first successful sync, [`BoardClock::epoch_ms`] falls back to
//! the monotonic reading so samples still carry increasing timestamps.

use core::cell::Cell;

use critical_section::Mutex;
use embassy_time::Instant;
use hal_abstractions::Clock;

/// Unix milliseconds minus monotonic milliseconds at the last calibration
///
/// ARMv7-M has no 64-bit atomics, so the offset sits behind a critical
/// section instead.
static EPOCH_OFFSET_MS: Mutex<Cell<Option<u64>>> = Mutex::new(Cell::new(None));

fn monotonic_now_ms() -> u64 {
    Instant::now().as_millis()
}

/// Calibrate the wall clock
///
/// Called by the SNTP client with the Unix time observed "now".
pub fn calibrate(unix_ms: u64) {
    let offset = unix_ms.saturating_sub(monotonic_now_ms());
    critical_section::with(|cs| EPOCH_OFFSET_MS.borrow(cs).set(Some(offset)));
}

/// Board clock handed to the control plane
#[derive(Debug, Clone, Copy, Default)]
pub struct BoardClock;

impl Clock for BoardClock {
    fn monotonic_ms(&self) -> u64 {
        monotonic_now_ms()
    }

    fn epoch_ms(&self) -> u64 {
        let now = monotonic_now_ms();
        match critical_section::with(|cs| EPOCH_OFFSET_MS.borrow(cs).get()) {
            Some(offset) => now + offset,
            None => now,
        }
    }
}
