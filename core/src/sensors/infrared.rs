//! Infrared tachometer
//!
//! Config keys: `buffer_size` (5), `sampling_interval_ms` (1000) and
//! `pulses_per_rev` (1). The reflective sensor pulses once per marker; the
//! board's edge interrupt feeds a [`PulseCounter`].
//!
//! `rpm = pulses * 60 / (window_s * pulses_per_rev)`

use crate::config::{fields, ConfigDocument};
use crate::error::SensorError;
use crate::telemetry::sample::values;
use crate::telemetry::{PulseCounter, PulseWindow, Values};

use super::{SamplingSettings, SensorModule};

const DEFAULT_PULSES_PER_REV: u8 = 1;

/// RPM module
pub struct Infrared<'a> {
    pulses: &'a PulseCounter,
    window: PulseWindow,
    interval_ms: u32,
    pulses_per_rev: u8,
}

impl<'a> Infrared<'a> {
    /// Count revolutions from `pulses`
    pub fn new(pulses: &'a PulseCounter) -> Self {
        Self {
            pulses,
            window: PulseWindow::default(),
            interval_ms: 1000,
            pulses_per_rev: DEFAULT_PULSES_PER_REV,
        }
    }
}

impl SensorModule for Infrared<'_> {
    const NAME: &'static str = "infrared";
    const CHANNELS: &'static [&'static str] = &["RPM"];
    const MAX_BUFFER_SIZE: usize = 1000;

    fn init(&mut self) -> Result<(), SensorError> {
        // Pulses seen before sampling starts belong to no window
        self.pulses.take();
        Ok(())
    }

    fn configure(&mut self, document: &ConfigDocument) -> SamplingSettings {
        let settings = SamplingSettings::from_document(document, 5, 1000, Self::MAX_BUFFER_SIZE);
        self.interval_ms = settings.interval_ms;
        self.pulses_per_rev = fields::u8_field(document, "pulses_per_rev")
            .filter(|ppr| *ppr > 0)
            .unwrap_or(DEFAULT_PULSES_PER_REV);
        settings
    }

    fn acquire(&mut self, now_ms: u64) -> Values {
        let pulses = self.pulses.take();
        let window_s = self.window.elapsed_s(now_ms, self.interval_ms);
        let rpm = (pulses as f32 * 60.0) / (window_s * f32::from(self.pulses_per_rev));
        values(&[rpm])
    }
}
