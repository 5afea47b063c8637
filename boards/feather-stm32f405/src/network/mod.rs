#![deny(warnings)]
//! Network module with trait-based client architecture
//!
//! This module provides the board's network side of the control plane:
//! - **`client`**: `NetworkClient` trait for protocol implementations
//! - **`config`**: Configuration structs with `Default` implementations
//! - **`error`**: Simple error enum for network operations
//! - **`link`**: `BrokerTransport` bridge between the control loop and MQTT
//! - **`manager`**: DHCP wait and host resolution
//! - **`mqtt`**: MQTT v5.0 broker session implementing `NetworkClient`
//! - **`sntp`**: SNTP client implementing `NetworkClient`
//!
//! ## Architecture
//!
//! `node-core` is synchronous and polled from the control loop task, while
//! embassy-net sockets are async and `!Send`, so they stay inside the
//! network task. `link` is the only thing both sides touch.

pub mod client;
pub mod config;
pub mod error;
pub mod link;
pub mod manager;
pub mod mqtt;
pub mod sntp;

// Re-export commonly used types
pub use client::NetworkClient;
pub use config::{MqttConfig, NetworkConfig, SntpConfig};
pub use link::MqttLink;
pub use mqtt::MqttSession;
pub use sntp::SntpClient;
