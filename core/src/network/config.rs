#![deny(unsafe_code)]
#![deny(warnings)]
//! Link configuration structures

/// Broker link timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LinkConfig {
    /// Minimum time between two connection attempts, in milliseconds
    pub reconnect_interval_ms: u64,
    /// Heartbeat period, in milliseconds
    pub heartbeat_interval_ms: u64,
    /// Delay between a successful `update_config` announcement and the
    /// requested restart, in milliseconds
    pub restart_grace_ms: u64,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            reconnect_interval_ms: 500,
            heartbeat_interval_ms: 10_000,
            restart_grace_ms: 500,
        }
    }
}
