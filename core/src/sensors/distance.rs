//! Time-of-flight distance
//!
//! Config keys: `buffer_size` (100), `sampling_interval_ms` (50) and
//! `oversampling` (true). With oversampling on, each tick takes as many
//! readings as fit in the interval (at most ten) and records their median.

use hal_abstractions::{DelayNs, RangeFinder};

use crate::config::{fields, ConfigDocument};
use crate::error::SensorError;
use crate::telemetry::oversample;
use crate::telemetry::sample::values;
use crate::telemetry::Values;

use super::{SamplingSettings, SensorModule};

/// Distance module
pub struct Distance<R, D> {
    finder: R,
    delay: D,
    oversampling: bool,
    window: usize,
}

impl<R: RangeFinder, D: DelayNs> Distance<R, D> {
    /// Wrap `finder`; `delay` spaces the oversampled readings
    pub fn new(finder: R, delay: D) -> Self {
        Self {
            finder,
            delay,
            oversampling: true,
            window: 1,
        }
    }

    /// Readings taken per sample
    pub fn window(&self) -> usize {
        self.window
    }
}

impl<R: RangeFinder, D: DelayNs> SensorModule for Distance<R, D> {
    const NAME: &'static str = "distance";
    const CHANNELS: &'static [&'static str] = &["distance_mm"];
    const MAX_BUFFER_SIZE: usize = 2000;

    fn init(&mut self) -> Result<(), SensorError> {
        self.finder
            .init()
            .map_err(|_| SensorError::InitFailed("range finder"))
    }

    fn configure(&mut self, document: &ConfigDocument) -> SamplingSettings {
        let settings = SamplingSettings::from_document(document, 100, 50, Self::MAX_BUFFER_SIZE);
        self.oversampling = fields::bool_field(document, "oversampling").unwrap_or(true);
        self.window = oversample::window_size(
            settings.interval_ms,
            self.finder.estimated_cost_per_reading_ms(),
            self.oversampling,
        );
        settings
    }

    fn acquire(&mut self, _now_ms: u64) -> Values {
        let finder = &mut self.finder;
        let mm = oversample::acquire(self.window, &mut self.delay, || finder.read_mm());
        values(&[mm])
    }
}
