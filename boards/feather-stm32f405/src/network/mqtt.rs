#![deny(unsafe_code)]
#![deny(warnings)]
//! MQTT v5.0 broker session over plain TCP
//!
//! One [`MqttSession::run`] is one broker connection: resolve, TCP connect,
//! CONNECT/CONNACK, then pump the bridge in [`super::link`] until something
//! fails. Everything is QoS 0.
//!
//! # Memory
//!
//! - MQTT write/receive buffers: 8 KB each
//! - TCP buffers: 4 KB each
//!
//! All of them live in the session future, which RTIC keeps in static
//! storage for the network task.

use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::Ordering;

use defmt::{debug, error, info, warn, Debug2Format};
use embassy_futures::select::{select3, Either3};
use embassy_net::tcp::TcpSocket;
use embassy_net::{IpEndpoint, Stack};
use embassy_time::{Duration, Timer};
use rust_mqtt::client::client::MqttClient;
use rust_mqtt::client::client_config::{ClientConfig, MqttVersion};
use rust_mqtt::packet::v5::publish_packet::QualityOfService;
use rust_mqtt::utils::rng_generator::CountingRng;

use super::client::NetworkClient;
use super::config::MqttConfig;
use super::error::NetworkError;
use super::link::{self, Outbound, MAX_PACKET_SIZE};
use super::manager;

const TCP_BUFFER_SIZE: usize = 4096;

/// What woke the session up, owned so the client is free again
enum Event {
    Message(Vec<u8>),
    Outbound(Outbound),
    PingDue,
}

/// MQTT v5.0 session for one client id
pub struct MqttSession {
    config: MqttConfig,
    client_id: String,
}

impl MqttSession {
    pub fn new(config: MqttConfig, client_id: String) -> Self {
        Self { config, client_id }
    }

    async fn session(&self, stack: &Stack<'static>) -> Result<(), NetworkError> {
        info!(
            "Connecting to MQTT broker at {}:{}",
            self.config.broker_host.as_str(),
            self.config.broker_port
        );
        let server_ip = manager::resolve(stack, &self.config.broker_host).await?;
        let endpoint = IpEndpoint::new(server_ip, self.config.broker_port);

        let mut rx_buffer = [0u8; TCP_BUFFER_SIZE];
        let mut tx_buffer = [0u8; TCP_BUFFER_SIZE];
        let mut socket = TcpSocket::new(*stack, &mut rx_buffer, &mut tx_buffer);
        socket.set_timeout(Some(Duration::from_secs(
            u64::from(self.config.keep_alive_secs) * 3 / 2,
        )));
        socket.connect(endpoint).await.map_err(|e| {
            error!("TCP connect failed: {:?}", Debug2Format(&e));
            NetworkError::SocketError
        })?;
        info!("TCP connection established to {}", Debug2Format(&endpoint));

        let mut mqtt_config = ClientConfig::new(MqttVersion::MQTTv5, CountingRng(20000));
        mqtt_config.add_max_subscribe_qos(QualityOfService::QoS0);
        mqtt_config.add_client_id(&self.client_id);
        mqtt_config.max_packet_size = MAX_PACKET_SIZE as u32;
        mqtt_config.keep_alive = self.config.keep_alive_secs;

        let mut write_buffer = [0u8; MAX_PACKET_SIZE];
        let mut recv_buffer = [0u8; MAX_PACKET_SIZE];
        let mut client = MqttClient::<_, 5, _>::new(
            socket,
            &mut write_buffer,
            MAX_PACKET_SIZE,
            &mut recv_buffer,
            MAX_PACKET_SIZE,
            mqtt_config,
        );

        client.connect_to_broker().await.map_err(|e| {
            error!("MQTT connect failed: {:?}", Debug2Format(&e));
            NetworkError::MqttConnectionFailed
        })?;
        info!("MQTT connection established as {}", self.client_id.as_str());
        link::CONNECTED.store(true, Ordering::Release);

        let ping_every = Duration::from_secs(u64::from(self.config.keep_alive_secs / 2).max(1));
        loop {
            let event = match select3(
                client.receive_message(),
                link::OUTBOUND.receive(),
                Timer::after(ping_every),
            )
            .await
            {
                Either3::First(Ok((topic, payload))) => {
                    debug!("Received {} bytes on {}", payload.len(), topic);
                    Event::Message(Vec::from(payload))
                }
                Either3::First(Err(e)) => {
                    warn!("MQTT receive failed: {:?}", Debug2Format(&e));
                    return Err(NetworkError::MqttSessionLost);
                }
                Either3::Second(outbound) => Event::Outbound(outbound),
                Either3::Third(()) => Event::PingDue,
            };

            let result = match event {
                Event::Message(payload) => {
                    if link::INBOUND.try_send(payload).is_err() {
                        warn!("Inbound queue full, dropping command");
                    }
                    Ok(())
                }
                Event::Outbound(Outbound::Subscribe(topic)) => {
                    info!("Subscribing to {}", topic.as_str());
                    client.subscribe_to_topic(&topic).await
                }
                Event::Outbound(Outbound::Publish {
                    topic,
                    payload,
                    retain,
                }) => {
                    client
                        .send_message(&topic, &payload, QualityOfService::QoS0, retain)
                        .await
                }
                Event::PingDue => client.send_ping().await,
            };

            if let Err(e) = result {
                warn!("MQTT session error: {:?}", Debug2Format(&e));
                return Err(NetworkError::MqttSessionLost);
            }
        }
    }
}

impl NetworkClient for MqttSession {
    type Output = ();

    /// Run one broker session; returns only when it ends
    async fn run(&mut self, stack: &Stack<'static>) -> Result<Self::Output, NetworkError> {
        let result = self.session(stack).await;
        link::session_ended();
        result
    }
}
