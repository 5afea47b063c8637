#![deny(unsafe_code)]
#![deny(warnings)]
//! Telemetry acquisition and batching
//!
//! Samples flow through a fixed-capacity buffer into JSON batches:
//!
//! ```text
//!  sensor read ──► [oversample/median] ──► Sample ──► SampleBuffer
//!                                                        │ full
//!                                                        ▼
//!                              TelemetrySink ◄── batch JSON (if transmitting)
//!                                                        │
//!                                                   buffer reset
//! ```
//!
//! - **`sample`**: `Sample` and the bounded `SampleBuffer`
//! - **`pipeline`**: `TelemetryPipeline`, the record/publish cycle
//! - **`batch`**: wire encoding of a full buffer
//! - **`oversample`**: median-of-N acquisition for noisy range finders
//! - **`pulse`**: interrupt-fed pulse counting for rate channels
//!
//! A batch is attempted exactly once. Whatever the outcome, the buffer is
//! cleared so memory stays bounded while the broker is unreachable.

pub mod batch;
pub mod oversample;
pub mod pipeline;
pub mod pulse;
pub mod sample;

pub use pipeline::{BatchOutcome, TelemetryPipeline, TelemetrySink};
pub use pulse::{PulseCounter, PulseWindow};
pub use sample::{Sample, SampleBuffer, Values, MAX_CHANNELS};
