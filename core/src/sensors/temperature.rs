//! Infrared thermometer
//!
//! Config keys: `buffer_size` (5) and `sampling_interval_ms` (1000).

use hal_abstractions::Thermometer;

use crate::config::ConfigDocument;
use crate::error::SensorError;
use crate::telemetry::sample::values;
use crate::telemetry::Values;

use super::{SamplingSettings, SensorModule};

/// Temperature module
pub struct Temperature<T> {
    thermometer: T,
}

impl<T: Thermometer> Temperature<T> {
    /// Wrap `thermometer`
    pub fn new(thermometer: T) -> Self {
        Self { thermometer }
    }
}

impl<T: Thermometer> SensorModule for Temperature<T> {
    const NAME: &'static str = "temperature";
    const CHANNELS: &'static [&'static str] = &["object_temperature_c", "ambient_temperature_c"];
    const MAX_BUFFER_SIZE: usize = 1000;

    fn init(&mut self) -> Result<(), SensorError> {
        self.thermometer
            .init()
            .map_err(|_| SensorError::InitFailed("thermometer"))
    }

    fn configure(&mut self, document: &ConfigDocument) -> SamplingSettings {
        SamplingSettings::from_document(document, 5, 1000, Self::MAX_BUFFER_SIZE)
    }

    fn acquire(&mut self, _now_ms: u64) -> Values {
        let (object, ambient) = self.thermometer.read_celsius().unwrap_or((f32::NAN, f32::NAN));
        values(&[object, ambient])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::doc;
    use hal_abstractions::InitError;
    use serde_json::json;

    struct FakeThermometer(Option<(f32, f32)>);

    impl Thermometer for FakeThermometer {
        fn init(&mut self) -> Result<(), InitError> {
            Err(InitError)
        }

        fn read_celsius(&mut self) -> Option<(f32, f32)> {
            self.0
        }
    }

    #[test]
    fn test_reads_both_channels() {
        let mut module = Temperature::new(FakeThermometer(Some((36.5, 21.0))));
        assert_eq!(module.acquire(0).as_slice(), &[36.5, 21.0]);
    }

    #[test]
    fn test_failed_read_is_nan() {
        let mut module = Temperature::new(FakeThermometer(None));
        let v = module.acquire(0);
        assert_eq!(v.len(), 2);
        assert!(v[0].is_nan() && v[1].is_nan());
    }

    #[test]
    fn test_settings_ceiling() {
        let mut module = Temperature::new(FakeThermometer(None));
        let settings = module.configure(&doc(json!({"buffer_size": 1500})));
        assert_eq!(settings.buffer_size, 1000);
        assert_eq!(settings.interval_ms, 1000);
        assert_eq!(module.init(), Err(SensorError::InitFailed("thermometer")));
    }
}
