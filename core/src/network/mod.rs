#![deny(warnings)]
//! Broker connectivity
//!
//! This module keeps one MQTT session per node alive and hides reconnect
//! churn from the rest of the control plane:
//! - **`config`**: link timing parameters with `Default` implementations
//! - **`connectivity`**: `ConnectivityManager`, the connect/reconnect state
//!   machine and the only publisher to the broker
//! - **`messages`**: heartbeat and config-sync message bodies
//! - **`topics`**: per-device topic names
//!
//! The transport itself is a [`hal_abstractions::BrokerTransport`] supplied
//! by the board.

pub mod config;
pub mod connectivity;
pub mod messages;
pub mod topics;

pub use config::LinkConfig;
pub use connectivity::{ConnectionState, ConnectivityManager, TickOutcome};
pub use messages::ConfigSource;
pub use topics::Topics;
