#![deny(unsafe_code)]
#![deny(warnings)]
//! Per-device MQTT topic names
//!
//! Every node publishes and subscribes under `sensors/{device}/`:
//!
//! | Topic | Direction | Retained |
//! |---|---|---|
//! | `sensors/{device}/data` | publish | no |
//! | `sensors/{device}/heartbeat` | publish | no |
//! | `sensors/{device}/cmd` | subscribe | - |
//! | `sensors/{device}/config` | publish | yes |

use heapless::String;

use crate::error::TopicError;

/// Maximum MQTT topic length
///
/// Format: "sensors/{device}/heartbeat"; 8 + 32 + 10 = 50 chars, use 64 for
/// safety.
pub const MAX_TOPIC_LEN: usize = 64;

/// Topic string with a fixed capacity
pub type Topic = String<MAX_TOPIC_LEN>;

/// All topics of one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topics {
    /// Telemetry batches
    pub data: Topic,
    /// Liveness messages
    pub heartbeat: Topic,
    /// Inbound commands
    pub cmd: Topic,
    /// Retained configuration snapshots
    pub config: Topic,
}

impl Topics {
    /// Build the topic set for `device`
    ///
    /// # Errors
    ///
    /// Returns a [`TopicError`] if the device name contains MQTT wildcard or
    /// NUL characters, or is too long for [`MAX_TOPIC_LEN`].
    pub fn new(device: &str) -> Result<Self, TopicError> {
        Ok(Self {
            data: format_topic(device, "data")?,
            heartbeat: format_topic(device, "heartbeat")?,
            cmd: format_topic(device, "cmd")?,
            config: format_topic(device, "config")?,
        })
    }
}

/// Format a device topic
///
/// Returns a topic string in the format `sensors/{device}/{subtopic}`.
///
/// # Example
///
/// ```
/// let topic = node_core::network::topics::format_topic("dist_1", "data").unwrap();
/// assert_eq!(topic.as_str(), "sensors/dist_1/data");
/// ```
pub fn format_topic(device: &str, subtopic: &str) -> Result<Topic, TopicError> {
    // MQTT topic names cannot contain wildcards (+, #) or null characters
    let invalid = |s: &str| s.contains('+') || s.contains('#') || s.contains('\0');
    if device.is_empty() || invalid(device) || invalid(subtopic) {
        return Err(TopicError::InvalidCharacters);
    }

    let mut topic = Topic::new();
    topic
        .push_str("sensors/")
        .map_err(|_| TopicError::TooLong)?;
    topic.push_str(device).map_err(|_| TopicError::TooLong)?;
    topic.push('/').map_err(|_| TopicError::TooLong)?;
    topic.push_str(subtopic).map_err(|_| TopicError::TooLong)?;

    Ok(topic)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_device_topics() {
        let topics = Topics::new("acc_1").unwrap();
        assert_eq!(topics.data.as_str(), "sensors/acc_1/data");
        assert_eq!(topics.heartbeat.as_str(), "sensors/acc_1/heartbeat");
        assert_eq!(topics.cmd.as_str(), "sensors/acc_1/cmd");
        assert_eq!(topics.config.as_str(), "sensors/acc_1/config");
    }

    #[test]
    fn test_format_topic_buffer_overflow() {
        let long_id = "this_is_a_very_long_device_name_that_cannot_fit_in_a_topic_buffer";
        assert_eq!(format_topic(long_id, "heartbeat"), Err(TopicError::TooLong));
    }

    #[test]
    fn test_format_topic_invalid_characters() {
        assert_eq!(
            format_topic("dist+1", "data"),
            Err(TopicError::InvalidCharacters)
        );
        assert_eq!(
            format_topic("dist#1", "data"),
            Err(TopicError::InvalidCharacters)
        );
        assert_eq!(
            format_topic("dist_1", "da+ta"),
            Err(TopicError::InvalidCharacters)
        );
        assert_eq!(format_topic("", "data"), Err(TopicError::InvalidCharacters));
    }
}
