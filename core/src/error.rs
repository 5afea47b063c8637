//! Control plane error types
//!
//! None of these are fatal to the control loop: each is logged at the
//! boundary where it is handled (see the callers) and the loop carries on.
//! Only [`SensorError`] from a module's `init` is allowed to halt a board.

use embedded_io::ErrorKind;

/// Why a storage operation failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageFault {
    /// No blob with that name exists
    NotFound,
    /// The blob does not fit the read buffer or the storage area
    TooLarge,
    /// Any other storage failure
    Other,
}

impl From<ErrorKind> for StorageFault {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NotFound => Self::NotFound,
            ErrorKind::OutOfMemory => Self::TooLarge,
            _ => Self::Other,
        }
    }
}

/// Configuration load/persist errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The underlying blob store failed
    Storage(StorageFault),
    /// The stored document is not valid JSON
    Parse,
    /// The stored document is valid JSON but not an object
    NotAnObject,
    /// The document could not be serialized
    Serialize,
    /// The merged document would not fit the load buffer
    DocumentTooLarge,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Storage(StorageFault::NotFound) => write!(f, "Config document not found"),
            Self::Storage(StorageFault::TooLarge) => write!(f, "Config document too large"),
            Self::Storage(StorageFault::Other) => write!(f, "Config storage error"),
            Self::Parse => write!(f, "Config document is not valid JSON"),
            Self::NotAnObject => write!(f, "Config document is not a JSON object"),
            Self::Serialize => write!(f, "Config document serialization failed"),
            Self::DocumentTooLarge => write!(f, "Config document exceeds size limit"),
        }
    }
}

impl core::error::Error for ConfigError {}

/// Inbound command rejection reasons
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Payload is not valid UTF-8 JSON
    InvalidJson,
    /// Payload is JSON but not an object
    NotAnObject,
    /// No string `cmd` field
    MissingCommand,
    /// `update_config` without an object `config` field
    InvalidConfigField,
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidJson => write!(f, "Invalid JSON command"),
            Self::NotAnObject => write!(f, "Command is not a JSON object"),
            Self::MissingCommand => write!(f, "No cmd field in JSON"),
            Self::InvalidConfigField => write!(f, "Invalid config field in JSON"),
        }
    }
}

impl core::error::Error for ProtocolError {}

/// Topic construction errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TopicError {
    /// Device name or suffix contains `+`, `#` or NUL
    InvalidCharacters,
    /// Topic does not fit the fixed-size buffer
    TooLong,
}

impl core::fmt::Display for TopicError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidCharacters => write!(f, "Topic contains invalid MQTT characters"),
            Self::TooLong => write!(f, "Topic too long"),
        }
    }
}

impl core::error::Error for TopicError {}

/// A sample was recorded into a buffer that is already full
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BufferFull;

impl core::fmt::Display for BufferFull {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Sample buffer full")
    }
}

impl core::error::Error for BufferFull {}

/// Sensor bring-up failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SensorError {
    /// The sensor did not respond to initialization
    InitFailed(&'static str),
}

impl core::fmt::Display for SensorError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InitFailed(sensor) => write!(f, "{} init failed", sensor),
        }
    }
}

impl core::error::Error for SensorError {}
