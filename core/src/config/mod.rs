#![deny(unsafe_code)]
#![deny(warnings)]
//! Device configuration
//!
//! Two JSON documents make up a node's configuration:
//!
//! - **common** (`/common/config.json`): broker address, network and time
//!   sync parameters, shared by every sensor build. Read-only at runtime and
//!   parsed into [`CommonConfig`].
//! - **module** (`/<module>/config.json`): sensor tuning parameters. Kept as a
//!   free-form [`ConfigDocument`] so the backend can add keys the firmware
//!   does not know about; remote `update_config` commands merge into it.
//!
//! Typed access to module settings goes through the helpers in [`fields`],
//! which resolve missing or ill-typed values to `None` so each module can
//! substitute its documented default.

pub mod common;
pub mod fields;
pub mod store;

use alloc::format;
use alloc::string::String;

pub use common::CommonConfig;
pub use store::ConfigStore;

/// A configuration document: a JSON object, keys in insertion order
pub type ConfigDocument = serde_json::Map<String, serde_json::Value>;

/// Location of the shared configuration document
pub const COMMON_CONFIG_PATH: &str = "/common/config.json";

/// Largest configuration document accepted from storage, in bytes
pub const MAX_DOCUMENT_SIZE: usize = 4096;

/// Storage location of a module's configuration document
///
/// ```
/// assert_eq!(node_core::config::module_config_path("distance"), "/distance/config.json");
/// ```
pub fn module_config_path(module: &str) -> String {
    format!("/{}/config.json", module)
}

/// Receives the full module document whenever it changes
///
/// Registered with [`ConfigStore::new`]. Called once after boot-time load
/// and synchronously after every merge, before the next sampling tick.
pub trait ConfigObserver {
    /// React to a new configuration document
    fn on_config_changed(&mut self, document: &ConfigDocument);
}
