//! Platform-agnostic control plane for sensor node firmware
//!
//! A node reads one sensor, batches the readings and publishes them to an
//! MQTT broker, while accepting start/stop and configuration commands from
//! an operator backend. This crate holds all of that logic; it has NO
//! hardware dependencies. Boards implement the traits in `hal-abstractions`
//! and drive a [`node::Node`] from their main loop.
//!
//! - **`config`**: configuration documents, merge and persistence
//! - **`network`**: broker session state machine, topics, message bodies
//! - **`protocol`**: remote command parsing and session identity
//! - **`telemetry`**: sample buffering, batching, oversampling, pulse counting
//! - **`sensors`**: the supported sensor modules
//! - **`node`**: the cooperative control loop tying it together

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]
#![deny(warnings)]

extern crate alloc;

#[macro_use]
mod fmt;

pub mod config;
pub mod error;
pub mod network;
pub mod node;
pub mod protocol;
pub mod sensors;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use node::{Node, NodeParts};
