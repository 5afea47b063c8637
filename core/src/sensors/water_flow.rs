//! Hall-effect water flow meter
//!
//! Config keys: `buffer_size` (100) and `sampling_interval_ms` (500). The
//! meter emits [`PULSES_PER_LITRE`] pulses per litre of flow.

use crate::config::ConfigDocument;
use crate::error::SensorError;
use crate::telemetry::sample::values;
use crate::telemetry::{PulseCounter, PulseWindow, Values};

use super::{SamplingSettings, SensorModule};

/// Flow meter calibration
pub const PULSES_PER_LITRE: f32 = 75.0;

/// Flow rate module
pub struct WaterFlow<'a> {
    pulses: &'a PulseCounter,
    window: PulseWindow,
    interval_ms: u32,
}

impl<'a> WaterFlow<'a> {
    /// Measure flow from `pulses`
    pub fn new(pulses: &'a PulseCounter) -> Self {
        Self {
            pulses,
            window: PulseWindow::default(),
            interval_ms: 500,
        }
    }
}

impl SensorModule for WaterFlow<'_> {
    const NAME: &'static str = "water_flow";
    const CHANNELS: &'static [&'static str] = &["flow_rate_lpm"];
    const MAX_BUFFER_SIZE: usize = 2000;

    fn init(&mut self) -> Result<(), SensorError> {
        self.pulses.take();
        Ok(())
    }

    fn configure(&mut self, document: &ConfigDocument) -> SamplingSettings {
        let settings = SamplingSettings::from_document(document, 100, 500, Self::MAX_BUFFER_SIZE);
        self.interval_ms = settings.interval_ms;
        settings
    }

    fn acquire(&mut self, now_ms: u64) -> Values {
        let pulses = self.pulses.take();
        let window_s = self.window.elapsed_s(now_ms, self.interval_ms);
        let litres = pulses as f32 / PULSES_PER_LITRE;
        values(&[litres / window_s * 60.0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::doc;
    use serde_json::json;

    #[test]
    fn test_flow_rate() {
        let counter = PulseCounter::new();
        let mut module = WaterFlow::new(&counter);
        let settings = module.configure(&doc(json!({})));
        assert_eq!(settings.buffer_size, 100);
        assert_eq!(settings.interval_ms, 500);

        for _ in 0..75 {
            counter.record();
        }
        // One litre in half a second
        assert_eq!(module.acquire(10_000).as_slice(), &[120.0]);

        for _ in 0..150 {
            counter.record();
        }
        // Two litres over the measured 2 s window
        assert_eq!(module.acquire(12_000).as_slice(), &[60.0]);
        assert_eq!(module.acquire(12_500).as_slice(), &[0.0]);
    }
}
