#![deny(unsafe_code)]
#![deny(warnings)]
//! Sensor modules
//!
//! A node firmware image carries exactly one sensor module. Each module
//! implements [`SensorModule`]: it owns its driver, knows its channel names
//! and buffer ceiling, and derives its sampling settings from the module
//! configuration document.
//!
//! [`Sampler`] wraps a module with the sampling cadence and the telemetry
//! pipeline. It is the [`ConfigObserver`] of the node's configuration store,
//! so every config change is applied before the next sampling tick.
//!
//! | Module | Config | Channels | Ceiling |
//! |---|---|---|---|
//! | [`accelerometer`] | `accelerometer` | x, y, z | 2000 |
//! | [`distance`] | `distance` | distance_mm | 2000 |
//! | [`temperature`] | `temperature` | object/ambient °C | 1000 |
//! | [`infrared`] | `infrared` | RPM | 1000 |
//! | [`water_flow`] | `water_flow` | flow_rate_lpm | 2000 |

pub mod accelerometer;
pub mod distance;
pub mod infrared;
pub mod temperature;
pub mod water_flow;

pub use accelerometer::Accelerometer;
pub use distance::Distance;
pub use infrared::Infrared;
pub use temperature::Temperature;
pub use water_flow::WaterFlow;

use crate::config::{fields, ConfigDocument, ConfigObserver};
use crate::error::SensorError;
use crate::protocol::SessionIdentity;
use crate::telemetry::sample::clamp_capacity;
use crate::telemetry::{BatchOutcome, Sample, TelemetryPipeline, TelemetrySink, Values};

/// Cadence and buffering derived from a module document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SamplingSettings {
    /// Samples per batch, already clamped to the module ceiling
    pub buffer_size: usize,
    /// Time between two samples, in milliseconds
    pub interval_ms: u32,
}

impl SamplingSettings {
    /// Read `buffer_size` and `sampling_interval_ms` from `document`
    ///
    /// Missing or ill-typed fields fall back to the given defaults; the
    /// buffer size is clamped to `[1, ceiling]`.
    pub fn from_document(
        document: &ConfigDocument,
        default_buffer: u16,
        default_interval_ms: u32,
        ceiling: usize,
    ) -> Self {
        let buffer = fields::u16_field(document, "buffer_size").unwrap_or(default_buffer);
        Self {
            buffer_size: clamp_capacity(usize::from(buffer), ceiling),
            interval_ms: fields::u32_field(document, "sampling_interval_ms")
                .unwrap_or(default_interval_ms),
        }
    }
}

/// One kind of sensor attached to the node
pub trait SensorModule {
    /// Module name; selects the `/<NAME>/config.json` document
    const NAME: &'static str;

    /// Channel names, in value order
    const CHANNELS: &'static [&'static str];

    /// Largest accepted `buffer_size`
    const MAX_BUFFER_SIZE: usize;

    /// Bring up the sensor
    ///
    /// # Errors
    ///
    /// An error is fatal: the board halts rather than publish garbage.
    fn init(&mut self) -> Result<(), SensorError>;

    /// Apply `document` and return the resulting sampling settings
    fn configure(&mut self, document: &ConfigDocument) -> SamplingSettings;

    /// Take one sample
    ///
    /// `now_ms` is the monotonic time of this tick. Failed acquisitions
    /// produce NaN values, never an error.
    fn acquire(&mut self, now_ms: u64) -> Values;
}

/// A sensor module with its sampling cadence and telemetry pipeline
pub struct Sampler<M> {
    module: M,
    settings: SamplingSettings,
    pipeline: TelemetryPipeline,
    last_sample_ms: Option<u64>,
}

impl<M: SensorModule> Sampler<M> {
    /// Wrap `module`, configured with its defaults
    pub fn new(mut module: M) -> Self {
        let settings = module.configure(&ConfigDocument::new());
        Self {
            module,
            settings,
            pipeline: TelemetryPipeline::new(M::CHANNELS, settings.buffer_size),
            last_sample_ms: None,
        }
    }

    /// Bring up the sensor
    pub fn init(&mut self) -> Result<(), SensorError> {
        self.module.init()
    }

    /// Sample if the interval has elapsed, then flush a full batch
    ///
    /// Returns `None` when no sample was due.
    pub fn poll<S: TelemetrySink>(
        &mut self,
        now_ms: u64,
        epoch_ms: u64,
        session: &SessionIdentity,
        sink: &mut S,
    ) -> Option<BatchOutcome> {
        if let Some(last) = self.last_sample_ms {
            if now_ms.saturating_sub(last) < u64::from(self.settings.interval_ms) {
                return None;
            }
        }
        self.last_sample_ms = Some(now_ms);

        let values = self.module.acquire(now_ms);
        if let Err(e) = self.pipeline.record(Sample::new(epoch_ms, values)) {
            warn!("Sample dropped: {}", e);
        }

        let outcome = self.pipeline.maybe_publish(session, sink);
        if outcome == BatchOutcome::Failed {
            warn!("Batch dropped after failed publish");
        }
        Some(outcome)
    }

    /// Current sampling settings
    pub fn settings(&self) -> SamplingSettings {
        self.settings
    }

    /// The telemetry pipeline
    pub fn pipeline(&self) -> &TelemetryPipeline {
        &self.pipeline
    }

    /// The wrapped module
    pub fn module(&self) -> &M {
        &self.module
    }

    /// The wrapped module, mutably
    pub fn module_mut(&mut self) -> &mut M {
        &mut self.module
    }
}

impl<M: SensorModule> ConfigObserver for Sampler<M> {
    fn on_config_changed(&mut self, document: &ConfigDocument) {
        self.settings = self.module.configure(document);
        if self.pipeline.resize(self.settings.buffer_size) {
            info!(
                "{} buffer resized to {}",
                M::NAME,
                self.settings.buffer_size
            );
        }
        debug!(
            "{} sampling every {} ms",
            M::NAME,
            self.settings.interval_ms
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::sample::values;
    use crate::testing::doc;
    use serde_json::json;
    use std::vec::Vec;

    struct Counter {
        next: f32,
        inits: usize,
    }

    impl SensorModule for Counter {
        const NAME: &'static str = "counter";
        const CHANNELS: &'static [&'static str] = &["n"];
        const MAX_BUFFER_SIZE: usize = 50;

        fn init(&mut self) -> Result<(), SensorError> {
            self.inits += 1;
            Ok(())
        }

        fn configure(&mut self, document: &ConfigDocument) -> SamplingSettings {
            SamplingSettings::from_document(document, 4, 100, Self::MAX_BUFFER_SIZE)
        }

        fn acquire(&mut self, _now_ms: u64) -> Values {
            self.next += 1.0;
            values(&[self.next])
        }
    }

    #[derive(Default)]
    struct Sink {
        batches: Vec<Vec<u8>>,
    }

    impl TelemetrySink for Sink {
        fn publish_batch(&mut self, payload: &[u8]) -> bool {
            self.batches.push(payload.to_vec());
            true
        }
    }

    fn sampler() -> Sampler<Counter> {
        Sampler::new(Counter {
            next: 0.0,
            inits: 0,
        })
    }

    #[test]
    fn test_settings_defaults_and_clamping() {
        let d = doc(json!({}));
        assert_eq!(
            SamplingSettings::from_document(&d, 5, 1000, 1000),
            SamplingSettings {
                buffer_size: 5,
                interval_ms: 1000
            }
        );

        let d = doc(json!({"buffer_size": 0, "sampling_interval_ms": 20}));
        assert_eq!(SamplingSettings::from_document(&d, 5, 1000, 1000).buffer_size, 1);

        let d = doc(json!({"buffer_size": 5000}));
        assert_eq!(SamplingSettings::from_document(&d, 5, 1000, 1000).buffer_size, 1000);

        let d = doc(json!({"buffer_size": "big", "sampling_interval_ms": -1}));
        assert_eq!(
            SamplingSettings::from_document(&d, 5, 1000, 1000),
            SamplingSettings {
                buffer_size: 5,
                interval_ms: 1000
            }
        );
    }

    #[test]
    fn test_new_uses_module_defaults() {
        let sampler = sampler();
        assert_eq!(sampler.settings().buffer_size, 4);
        assert_eq!(sampler.pipeline().buffer().capacity(), 4);
    }

    #[test]
    fn test_poll_respects_interval() {
        let mut sampler = sampler();
        let mut sink = Sink::default();
        let session = SessionIdentity::default();

        assert!(sampler.poll(1_000, 0, &session, &mut sink).is_some());
        assert!(sampler.poll(1_050, 0, &session, &mut sink).is_none());
        assert!(sampler.poll(1_099, 0, &session, &mut sink).is_none());
        assert!(sampler.poll(1_100, 0, &session, &mut sink).is_some());
        assert_eq!(sampler.pipeline().buffer().len(), 2);
    }

    #[test]
    fn test_poll_publishes_full_batch() {
        let mut sampler = sampler();
        let mut sink = Sink::default();
        let mut session = SessionIdentity::default();
        session.start(Some(1), None);

        let mut outcomes = Vec::new();
        for i in 0..4u64 {
            outcomes.push(sampler.poll(i * 100, 1_700_000_000_000 + i, &session, &mut sink));
        }
        assert_eq!(
            outcomes,
            [
                Some(BatchOutcome::Filling),
                Some(BatchOutcome::Filling),
                Some(BatchOutcome::Filling),
                Some(BatchOutcome::Published)
            ]
        );
        let batch: serde_json::Value = serde_json::from_slice(&sink.batches[0]).unwrap();
        assert_eq!(batch["values"], json!([[1.0], [2.0], [3.0], [4.0]]));
        assert_eq!(batch["channels"], json!(["n"]));
        assert_eq!(batch["timestamps"][3], json!(1_700_000_000_003u64));
    }

    #[test]
    fn test_config_change_resizes_buffer() {
        let mut sampler = sampler();
        let mut sink = Sink::default();
        sampler.poll(0, 0, &SessionIdentity::default(), &mut sink);

        sampler.on_config_changed(&doc(json!({"sampling_interval_ms": 10})));
        assert_eq!(sampler.pipeline().buffer().len(), 1);
        assert_eq!(sampler.settings().interval_ms, 10);

        sampler.on_config_changed(&doc(json!({"buffer_size": 80})));
        assert_eq!(sampler.pipeline().buffer().len(), 0);
        assert_eq!(sampler.pipeline().buffer().capacity(), 50);
    }

    #[test]
    fn test_init_reaches_module() {
        let mut sampler = sampler();
        sampler.init().unwrap();
        assert_eq!(sampler.module().inits, 1);
    }
}
