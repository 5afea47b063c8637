#![deny(unsafe_code)]
#![deny(warnings)]
//! Network stack helpers shared by the protocol clients

use core::net::Ipv4Addr;

use defmt::{error, info, Debug2Format};
use embassy_net::dns::DnsQueryType;
use embassy_net::{IpAddress, Stack};

use super::error::NetworkError;

/// Wait for network configuration (DHCP) and log IP address
pub async fn wait_for_config(stack: &Stack<'_>) {
    info!("Waiting for DHCP...");
    stack.wait_config_up().await;
    info!("Network is UP!");

    if let Some(config) = stack.config_v4() {
        let ip = config.address.address();
        let octets = ip.octets();
        info!(
            "IP: {}.{}.{}.{}",
            octets[0], octets[1], octets[2], octets[3]
        );

        if let Some(gateway) = config.gateway {
            let gw_octets = gateway.octets();
            info!(
                "Gateway: {}.{}.{}.{}",
                gw_octets[0], gw_octets[1], gw_octets[2], gw_octets[3]
            );
        }
    }
}

/// Resolve `host` to an address
///
/// Dotted IPv4 literals are used as-is; anything else goes through DNS.
pub async fn resolve(stack: &Stack<'_>, host: &str) -> Result<IpAddress, NetworkError> {
    if let Ok(ip) = host.parse::<Ipv4Addr>() {
        return Ok(IpAddress::Ipv4(ip));
    }

    stack
        .dns_query(host, DnsQueryType::A)
        .await
        .map_err(|e| {
            error!("DNS query for {} failed: {:?}", host, Debug2Format(&e));
            NetworkError::DnsError
        })?
        .first()
        .copied()
        .ok_or_else(|| {
            error!("DNS returned no results for {}", host);
            NetworkError::DnsError
        })
}
