//! Shared (common) configuration document

use alloc::string::{String, ToString};

use super::fields::{i32_field, str_field, u16_field};
use super::ConfigDocument;

/// Node-wide settings from `/common/config.json`
///
/// Every field falls back to its default when missing or ill-typed; a node
/// with no common document at all still boots (and keeps retrying an empty
/// broker address until the document is provisioned).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonConfig {
    /// Broker host name or IP address (`mqtt_server`)
    pub mqtt_server: String,
    /// Broker TCP port (`mqtt_port`)
    pub mqtt_port: u16,
    /// NTP server (`ntp_server`); defaults to the broker address
    pub ntp_server: String,
    /// Offset from UTC in seconds (`gmt_offset_sec`)
    pub gmt_offset_sec: i32,
    /// Daylight saving offset in seconds (`daylight_offset_sec`)
    pub daylight_offset_sec: i32,
    /// Wireless network name for boards with a WiFi link (`wifi_ssid`)
    pub wifi_ssid: String,
    /// Wireless network passphrase (`wifi_password`)
    pub wifi_password: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            mqtt_server: String::new(),
            mqtt_port: 1883,
            ntp_server: String::new(),
            gmt_offset_sec: 3600,
            daylight_offset_sec: 3600,
            wifi_ssid: String::new(),
            wifi_password: String::new(),
        }
    }
}

impl CommonConfig {
    /// Build the typed record from a parsed common document
    pub fn from_document(document: &ConfigDocument) -> Self {
        let defaults = Self::default();
        let mqtt_server = str_field(document, "mqtt_server")
            .map(ToString::to_string)
            .unwrap_or(defaults.mqtt_server);

        // An empty NTP entry means "use the broker host"
        let ntp_server = match str_field(document, "ntp_server") {
            Some(server) if !server.is_empty() => server.to_string(),
            _ => mqtt_server.clone(),
        };

        Self {
            mqtt_port: u16_field(document, "mqtt_port").unwrap_or(defaults.mqtt_port),
            gmt_offset_sec: i32_field(document, "gmt_offset_sec")
                .unwrap_or(defaults.gmt_offset_sec),
            daylight_offset_sec: i32_field(document, "daylight_offset_sec")
                .unwrap_or(defaults.daylight_offset_sec),
            wifi_ssid: str_field(document, "wifi_ssid")
                .map(ToString::to_string)
                .unwrap_or(defaults.wifi_ssid),
            wifi_password: str_field(document, "wifi_password")
                .map(ToString::to_string)
                .unwrap_or(defaults.wifi_password),
            mqtt_server,
            ntp_server,
        }
    }

    /// Total offset from UTC including daylight saving, in seconds
    pub fn utc_offset_sec(&self) -> i32 {
        self.gmt_offset_sec.saturating_add(self.daylight_offset_sec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> ConfigDocument {
        match value {
            serde_json::Value::Object(map) => map,
            _ => panic!("test document must be an object"),
        }
    }

    #[test]
    fn test_default_config() {
        let config = CommonConfig::default();
        assert_eq!(config.mqtt_port, 1883);
        assert_eq!(config.gmt_offset_sec, 3600);
        assert_eq!(config.daylight_offset_sec, 3600);
        assert!(config.mqtt_server.is_empty());
    }

    #[test]
    fn test_ntp_server_defaults_to_broker() {
        let config = CommonConfig::from_document(&doc(json!({
            "mqtt_server": "192.168.1.10",
            "ntp_server": ""
        })));
        assert_eq!(config.ntp_server, "192.168.1.10");

        let config = CommonConfig::from_document(&doc(json!({
            "mqtt_server": "192.168.1.10",
            "ntp_server": "pool.ntp.org"
        })));
        assert_eq!(config.ntp_server, "pool.ntp.org");
    }

    #[test]
    fn test_ill_typed_fields_use_defaults() {
        let config = CommonConfig::from_document(&doc(json!({
            "mqtt_server": "broker.local",
            "mqtt_port": "1883",
            "gmt_offset_sec": 0,
            "daylight_offset_sec": 1.5
        })));
        assert_eq!(config.mqtt_server, "broker.local");
        assert_eq!(config.mqtt_port, 1883);
        assert_eq!(config.gmt_offset_sec, 0);
        assert_eq!(config.daylight_offset_sec, 3600);
        assert_eq!(config.utc_offset_sec(), 3600);
    }
}
