#![deny(unsafe_code)]
#![deny(warnings)]
//! Broker transport bridge between the control loop and the MQTT session
//!
//! The control loop polls [`MqttLink`] synchronously; the MQTT session runs
//! as async code inside the network task. They meet in these statics:
//!
//! - **`CONNECTED`**: set by the session once CONNACK arrives, cleared when
//!   the session ends
//! - **`CONNECT_REQUEST`**: client id the control loop wants to connect as
//! - **`OUTBOUND`**: subscribes and publishes waiting for the session
//! - **`INBOUND`**: command payloads waiting for the control loop
//!
//! Publishing only enqueues, so `publish` returning `true` means the packet
//! was accepted for sending on a live session.

use alloc::string::String;
use alloc::vec::Vec;
use core::sync::atomic::{AtomicBool, Ordering};

use defmt::warn;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use hal_abstractions::BrokerTransport;

/// Largest MQTT packet the session buffers can hold
pub const MAX_PACKET_SIZE: usize = 8 * 1024;

/// Work queued for the MQTT session
pub enum Outbound {
    Subscribe(String),
    Publish {
        topic: String,
        payload: Vec<u8>,
        retain: bool,
    },
}

pub static CONNECTED: AtomicBool = AtomicBool::new(false);
pub static CONNECT_REQUEST: Signal<CriticalSectionRawMutex, String> = Signal::new();
pub static OUTBOUND: Channel<CriticalSectionRawMutex, Outbound, 2> = Channel::new();
pub static INBOUND: Channel<CriticalSectionRawMutex, Vec<u8>, 4> = Channel::new();

/// Mark the session as gone and drop work queued for it
pub fn session_ended() {
    CONNECTED.store(false, Ordering::Release);
    OUTBOUND.clear();
}

/// Control-loop side of the bridge
#[derive(Debug, Default)]
pub struct MqttLink;

impl BrokerTransport for MqttLink {
    fn is_connected(&self) -> bool {
        CONNECTED.load(Ordering::Acquire)
    }

    /// Ask the session to connect; reports success once a later attempt
    /// finds the session up
    fn connect(&mut self, client_id: &str) -> bool {
        if self.is_connected() {
            return true;
        }
        CONNECT_REQUEST.signal(String::from(client_id));
        false
    }

    fn subscribe(&mut self, topic: &str) -> bool {
        OUTBOUND
            .try_send(Outbound::Subscribe(String::from(topic)))
            .is_ok()
    }

    // The network task services the socket.
    fn service(&mut self) {}

    fn receive(&mut self, buf: &mut [u8]) -> Option<usize> {
        while let Ok(message) = INBOUND.try_receive() {
            if message.len() <= buf.len() {
                buf[..message.len()].copy_from_slice(&message);
                return Some(message.len());
            }
            warn!("Dropping {} byte command, too large", message.len());
        }
        None
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> bool {
        if !self.is_connected() {
            return false;
        }
        let queued = OUTBOUND
            .try_send(Outbound::Publish {
                topic: String::from(topic),
                payload: Vec::from(payload),
                retain,
            })
            .is_ok();
        if !queued {
            warn!("Outbound queue full, dropping publish to {}", topic);
        }
        queued
    }

    fn max_packet_size(&self) -> usize {
        MAX_PACKET_SIZE
    }
}
