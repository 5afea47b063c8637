//! Median-of-N oversampling
//!
//! Range finders occasionally return outliers or fail a measurement. Within
//! one sampling tick the distance module takes up to [`MAX_WINDOW`] raw
//! readings, drops the failed ones and records the median of the rest.

use hal_abstractions::DelayNs;

/// Largest number of raw readings per tick
pub const MAX_WINDOW: usize = 10;

/// Pause between consecutive raw readings of one window, in microseconds
pub const READ_SPACING_US: u32 = 500;

/// Readings collected during one tick
pub type OversampleWindow = heapless::Vec<u16, MAX_WINDOW>;

/// Number of raw readings that fit one sampling interval
///
/// `interval_ms / cost_ms`, clamped to `[1, MAX_WINDOW]`; always 1 when
/// oversampling is disabled.
///
/// ```
/// use node_core::telemetry::oversample::window_size;
///
/// assert_eq!(window_size(50, 10, true), 5);
/// assert_eq!(window_size(1000, 10, true), 10);
/// assert_eq!(window_size(5, 10, true), 1);
/// assert_eq!(window_size(50, 10, false), 1);
/// ```
pub fn window_size(interval_ms: u32, cost_ms: u32, enabled: bool) -> usize {
    if !enabled {
        return 1;
    }
    let n = interval_ms.checked_div(cost_ms).unwrap_or(MAX_WINDOW as u32);
    (n as usize).clamp(1, MAX_WINDOW)
}

/// Median of the valid readings
///
/// For an even count the two middle values are averaged in integer
/// arithmetic before conversion. Returns NaN when `readings` is empty.
pub fn median(readings: &mut [u16]) -> f32 {
    if readings.is_empty() {
        return f32::NAN;
    }
    readings.sort_unstable();
    let mid = readings.len() / 2;
    if readings.len() % 2 == 1 {
        f32::from(readings[mid])
    } else {
        let sum = u32::from(readings[mid - 1]) + u32::from(readings[mid]);
        (sum / 2) as f32
    }
}

/// Take `n` readings with `read`, spaced by [`READ_SPACING_US`], and reduce
/// them to their median
///
/// Failed readings (`None`) are skipped; if every reading fails the result
/// is NaN.
pub fn acquire<D, F>(n: usize, delay: &mut D, mut read: F) -> f32
where
    D: DelayNs,
    F: FnMut() -> Option<u16>,
{
    let n = n.clamp(1, MAX_WINDOW);
    let mut window = OversampleWindow::new();
    for i in 0..n {
        if i > 0 {
            delay.delay_us(READ_SPACING_US);
        }
        if let Some(reading) = read() {
            // n <= MAX_WINDOW, cannot overflow
            let _ = window.push(reading);
        }
    }
    median(&mut window)
}
