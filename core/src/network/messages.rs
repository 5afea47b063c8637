#![deny(unsafe_code)]
#![deny(warnings)]
//! Outbound control messages
//!
//! Wire formats:
//!
//! ```text
//! heartbeat: {"alive":true,"ts":<monotonic ms>}
//! config:    {"source":"boot"|"update"|"request","ts":<monotonic ms>,"config":{...}}
//! ```

use alloc::vec::Vec;

use serde::Serialize;

use crate::config::ConfigDocument;

/// Why a configuration snapshot is being published
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[serde(rename_all = "lowercase")]
pub enum ConfigSource {
    /// First publish after a (re)connect
    Boot,
    /// Result of an `update_config` command
    Update,
    /// Answer to a `get_config` command
    Request,
}

impl ConfigSource {
    /// Wire name of the source
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Boot => "boot",
            Self::Update => "update",
            Self::Request => "request",
        }
    }
}

#[derive(Serialize)]
struct Heartbeat {
    alive: bool,
    ts: u64,
}

#[derive(Serialize)]
struct ConfigSync<'a> {
    source: ConfigSource,
    ts: u64,
    config: &'a ConfigDocument,
}

/// Serialize a heartbeat stamped with `ts`
pub fn heartbeat(ts: u64) -> Option<Vec<u8>> {
    serde_json::to_vec(&Heartbeat { alive: true, ts }).ok()
}

/// Serialize a configuration snapshot
pub fn config_sync(source: ConfigSource, ts: u64, config: &ConfigDocument) -> Option<Vec<u8>> {
    serde_json::to_vec(&ConfigSync { source, ts, config }).ok()
}
