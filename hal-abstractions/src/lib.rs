//! Hardware abstraction traits for sensor node firmware
//!
//! This crate defines traits that abstract over hardware differences
//! between boards. BSPs implement these traits; `node-core` consumes them.
//!
//! Every trait here is deliberately non-blocking (or bounded-blocking for
//! sensor reads) so the control loop in `node-core` can poll them from a
//! single cooperative task.

#![no_std]
#![deny(unsafe_code)]
#![deny(warnings)]

pub mod clock;
pub mod indicator;
pub mod network;
pub mod sensor;
pub mod storage;
pub mod system;

pub use clock::Clock;
pub use indicator::{Indication, StatusIndicator};
pub use network::BrokerTransport;
pub use sensor::{AccelerometerDriver, InitError, RangeFinder, Thermometer};
pub use storage::BlobStore;
pub use system::SystemControl;

// Re-exported so boards and core agree on a single delay trait version.
pub use embedded_hal::delay::DelayNs;
