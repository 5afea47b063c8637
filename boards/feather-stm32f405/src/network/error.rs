#![deny(unsafe_code)]
#![deny(warnings)]
//! Network client error types

use defmt::Format;

/// Network client operation errors
#[derive(Debug, Clone, Copy, Format)]
pub enum NetworkError {
    /// The W5500 did not come up
    EthernetInit,
    /// DNS resolution failed
    DnsError,
    /// Socket bind/connect error
    SocketError,
    /// Request timeout
    Timeout,
    /// Invalid response from server
    InvalidResponse,
    /// Server error (e.g., invalid stratum for NTP)
    ServerError,
    /// All configured servers failed
    AllServersFailed,
    /// MQTT connection failed
    MqttConnectionFailed,
    /// MQTT session dropped after connecting
    MqttSessionLost,
}

impl core::fmt::Display for NetworkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::EthernetInit => write!(f, "Ethernet controller init failed"),
            Self::DnsError => write!(f, "DNS resolution failed"),
            Self::SocketError => write!(f, "Socket error"),
            Self::Timeout => write!(f, "Request timeout"),
            Self::InvalidResponse => write!(f, "Invalid response"),
            Self::ServerError => write!(f, "Server error"),
            Self::AllServersFailed => write!(f, "All servers failed"),
            Self::MqttConnectionFailed => write!(f, "MQTT connection failed"),
            Self::MqttSessionLost => write!(f, "MQTT session lost"),
        }
    }
}

// Implement core::error::Error for no_std compatibility
impl core::error::Error for NetworkError {}
