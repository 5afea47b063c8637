#![deny(unsafe_code)]
#![deny(warnings)]
//! SNTP client implementing NetworkClient trait
//!
//! A successful exchange calibrates [`crate::clock`], which turns sample
//! timestamps into Unix milliseconds.

use defmt::{error, info, warn, Debug2Format};
use embassy_futures::select::{select, Either};
use embassy_net::udp::{PacketMetadata, UdpSocket};
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{Duration, Instant, Timer};

use crate::clock;

use super::client::NetworkClient;
use super::config::SntpConfig;
use super::error::NetworkError;
use super::manager;

/// Seconds between the NTP era (1900) and the Unix epoch (1970)
const NTP_UNIX_OFFSET_SECS: u64 = 2_208_988_800;

/// Convert an NTP transmit timestamp to Unix milliseconds
fn ntp_to_unix_ms(secs: u32, frac: u32) -> u64 {
    let unix_secs = (secs as u64).saturating_sub(NTP_UNIX_OFFSET_SECS);
    let millis = ((frac as u64) * 1000) >> 32;
    unix_secs * 1000 + millis
}

/// SNTP client for time synchronization
pub struct SntpClient {
    config: SntpConfig,
}

impl SntpClient {
    pub fn with_config(config: SntpConfig) -> Self {
        Self { config }
    }

    /// Try the configured server, then the fallbacks
    async fn sync(&self, stack: &Stack<'static>) -> Result<u64, NetworkError> {
        info!("Starting SNTP synchronization");
        let servers = core::iter::once(self.config.server.as_str())
            .chain(self.config.fallback_servers.iter().copied());

        for server in servers {
            for attempt in 0..self.config.retry_count {
                info!(
                    "Attempting SNTP sync with {} (attempt {})",
                    server,
                    attempt + 1
                );
                match self.sntp_request(stack, server).await {
                    Ok(unix_ms) => {
                        clock::calibrate(unix_ms);
                        info!("Wall-clock calibrated: {} ms since epoch", unix_ms);
                        return Ok(unix_ms);
                    }
                    Err(e) => {
                        warn!("SNTP sync failed: {:?}, retrying...", e);
                        Timer::after_millis(2000).await;
                    }
                }
            }
        }
        error!("All SNTP sync attempts failed");
        Err(NetworkError::AllServersFailed)
    }

    async fn sntp_request(&self, stack: &Stack<'static>, server: &str) -> Result<u64, NetworkError> {
        let server_ip = manager::resolve(stack, server).await?;
        let server_endpoint = IpEndpoint::new(server_ip, 123);
        info!("Resolved {} to {}", server, Debug2Format(&server_endpoint));

        let mut rx_meta = [PacketMetadata::EMPTY; 2];
        let mut rx_buffer = [0u8; 64];
        let mut tx_meta = [PacketMetadata::EMPTY; 2];
        let mut tx_buffer = [0u8; 64];
        let mut socket = UdpSocket::new(
            *stack,
            &mut rx_meta,
            &mut rx_buffer,
            &mut tx_meta,
            &mut tx_buffer,
        );
        socket.bind(0).map_err(|_| NetworkError::SocketError)?;

        // NTP request: LI=0, VN=3, Mode=3 (Client)
        let mut ntp_packet = [0u8; 48];
        ntp_packet[0] = 0x1B;
        let transmit_time = Instant::now();
        socket
            .send_to(&ntp_packet, server_endpoint)
            .await
            .map_err(|_| NetworkError::SocketError)?;

        let mut response = [0u8; 48];
        let timeout = Timer::after(Duration::from_millis(self.config.timeout_ms));
        let (recv_len, from_addr) = match select(timeout, socket.recv_from(&mut response)).await {
            Either::First(_) => return Err(NetworkError::Timeout),
            Either::Second(result) => result.map_err(|_| NetworkError::SocketError)?,
        };
        let rtt = Instant::now().duration_since(transmit_time);

        if recv_len < 48 || from_addr.endpoint.addr != server_ip {
            return Err(NetworkError::InvalidResponse);
        }

        let stratum = response[1];
        if stratum == 0 || stratum > self.config.max_stratum {
            warn!(
                "Invalid stratum {} (max {})",
                stratum, self.config.max_stratum
            );
            return Err(NetworkError::ServerError);
        }

        let tx_secs = u32::from_be_bytes([response[40], response[41], response[42], response[43]]);
        let tx_frac = u32::from_be_bytes([response[44], response[45], response[46], response[47]]);

        // Half the round trip approximates the reply's time in flight
        let unix_ms = ntp_to_unix_ms(tx_secs, tx_frac) + rtt.as_millis() / 2;
        info!(
            "NTP time: {} ms since epoch (stratum {}, RTT {} ms)",
            unix_ms,
            stratum,
            rtt.as_millis()
        );
        Ok(unix_ms)
    }
}

impl NetworkClient for SntpClient {
    type Output = u64;

    async fn run(&mut self, stack: &Stack<'static>) -> Result<Self::Output, NetworkError> {
        self.sync(stack).await
    }
}
