//! Three-axis accelerometer
//!
//! Config keys: `buffer_size` (10), `sampling_frequency_Hz` (200),
//! `range_g` (16; one of 2, 4, 8, 16) and `sensitivity` (0.000488 g per
//! count). Values are raw counts scaled by the sensitivity.

use hal_abstractions::AccelerometerDriver;

use crate::config::{fields, ConfigDocument};
use crate::error::SensorError;
use crate::telemetry::sample::{clamp_capacity, values};
use crate::telemetry::Values;

use super::{SamplingSettings, SensorModule};

const DEFAULT_BUFFER_SIZE: usize = 10;
const DEFAULT_FREQUENCY_HZ: u32 = 200;
const DEFAULT_RANGE_G: u8 = 16;
const DEFAULT_SENSITIVITY: f32 = 0.000488;

/// Accelerometer module
pub struct Accelerometer<D> {
    driver: D,
    range_g: u8,
    sensitivity: f32,
    initialized: bool,
}

impl<D: AccelerometerDriver> Accelerometer<D> {
    /// Wrap `driver`
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            range_g: DEFAULT_RANGE_G,
            sensitivity: DEFAULT_SENSITIVITY,
            initialized: false,
        }
    }

    /// Full-scale range currently selected
    pub fn range_g(&self) -> u8 {
        self.range_g
    }

    /// The underlying driver
    pub fn driver(&self) -> &D {
        &self.driver
    }
}

impl<D: AccelerometerDriver> SensorModule for Accelerometer<D> {
    const NAME: &'static str = "accelerometer";
    const CHANNELS: &'static [&'static str] = &["x", "y", "z"];
    const MAX_BUFFER_SIZE: usize = 2000;

    fn init(&mut self) -> Result<(), SensorError> {
        self.driver
            .init()
            .map_err(|_| SensorError::InitFailed("accelerometer"))?;
        self.driver.set_range(self.range_g);
        self.initialized = true;
        Ok(())
    }

    fn configure(&mut self, document: &ConfigDocument) -> SamplingSettings {
        let buffer = fields::u16_field(document, "buffer_size")
            .map(usize::from)
            .unwrap_or(DEFAULT_BUFFER_SIZE);
        let frequency = fields::u32_field(document, "sampling_frequency_Hz")
            .filter(|hz| *hz > 0)
            .unwrap_or(DEFAULT_FREQUENCY_HZ);

        let range_g = fields::u8_field(document, "range_g")
            .filter(|g| matches!(g, 2 | 4 | 8 | 16))
            .unwrap_or(DEFAULT_RANGE_G);
        if range_g != self.range_g {
            self.range_g = range_g;
            if self.initialized {
                self.driver.set_range(range_g);
            }
        }

        self.sensitivity = fields::f32_field(document, "sensitivity")
            .filter(|s| s.is_finite() && *s > 0.0)
            .unwrap_or(DEFAULT_SENSITIVITY);

        SamplingSettings {
            buffer_size: clamp_capacity(buffer, Self::MAX_BUFFER_SIZE),
            interval_ms: 1000 / frequency,
        }
    }

    fn acquire(&mut self, _now_ms: u64) -> Values {
        match self.driver.read_raw() {
            Some(counts) => {
                let g = counts.map(|c| f32::from(c) * self.sensitivity);
                values(&g)
            }
            None => values(&[f32::NAN; 3]),
        }
    }
}
