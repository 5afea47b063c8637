#![deny(unsafe_code)]
#![deny(warnings)]
//! Network configuration structures

use alloc::string::String;

/// SNTP client configuration
#[derive(Debug, Clone)]
pub struct SntpConfig {
    /// Server from the common configuration, tried first
    pub server: String,
    /// Servers to fall back on (in order)
    pub fallback_servers: &'static [&'static str],
    /// Request timeout in milliseconds
    pub timeout_ms: u64,
    /// Number of retry attempts per server
    pub retry_count: usize,
    /// Maximum accepted stratum level (1-15)
    pub max_stratum: u8,
}

impl Default for SntpConfig {
    fn default() -> Self {
        Self {
            server: String::from("pool.ntp.org"),
            fallback_servers: &["time.google.com", "time.cloudflare.com"],
            timeout_ms: 5000,
            retry_count: 3,
            max_stratum: 3,
        }
    }
}

/// MQTT session configuration
#[derive(Debug, Clone)]
pub struct MqttConfig {
    /// Broker hostname or dotted IPv4 address
    pub broker_host: String,
    /// Broker port (1883 for plain MQTT)
    pub broker_port: u16,
    /// Keep-alive interval in seconds
    pub keep_alive_secs: u16,
}

impl Default for MqttConfig {
    fn default() -> Self {
        Self {
            broker_host: String::from("192.168.1.1"),
            broker_port: 1883,
            keep_alive_secs: 60,
        }
    }
}

/// Network stack configuration
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// MAC address for Ethernet
    pub mac_addr: [u8; 6],
    /// Random seed for network stack
    pub seed: u64,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            mac_addr: [0x02, 0x00, 0x00, 0x12, 0x34, 0x56],
            seed: 0x1234_5678_u64,
        }
    }
}
