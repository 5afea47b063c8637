#![deny(unsafe_code)]
#![deny(warnings)]
//! Broker session state machine
//!
//! ```text
//!              connect() ok
//!  Disconnected ──────────────► Connected
//!       ▲  │                        │
//!       │  │ attempt (≥ 500 ms      │ transport reports
//!       │  ▼  since the last one)   │ link down
//!     Connecting ◄──────────────────┘ (via Disconnected)
//! ```
//!
//! Reconnects are throttled by comparing elapsed monotonic time, never by
//! waiting. A tick that had to (re)connect returns without servicing the
//! link, so reconnect logic never interleaves with message handling.
//!
//! Every successful connect re-subscribes to the command topic and raises a
//! one-shot *pending config publish* obligation. The node discharges it on
//! the next serviced tick so the announcement goes out over a link that has
//! already been serviced once, not from inside the connect path.

use alloc::string::{String, ToString};

use hal_abstractions::BrokerTransport;

use crate::config::ConfigDocument;
use crate::error::TopicError;
use crate::telemetry::TelemetrySink;

use super::config::LinkConfig;
use super::messages::{self, ConfigSource};
use super::topics::Topics;

/// Broker session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// No session, next attempt pending
    Disconnected,
    /// An attempt is in progress
    Connecting,
    /// Session established
    Connected,
}

/// What one [`ConnectivityManager::tick`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TickOutcome {
    /// Offline and the retry interval has not elapsed
    Throttled,
    /// A connection attempt was made and failed
    ConnectFailed,
    /// A connection attempt succeeded; the link was not serviced this tick
    Connected,
    /// The link was up and has been serviced
    Serviced,
}

/// Owns the node's single broker session
pub struct ConnectivityManager<T> {
    transport: T,
    config: LinkConfig,
    client_id: String,
    topics: Topics,
    state: ConnectionState,
    last_attempt_ms: Option<u64>,
    config_publish_pending: bool,
    last_heartbeat_ms: u64,
}

impl<T: BrokerTransport> ConnectivityManager<T> {
    /// Create a manager for `device`
    ///
    /// The device name doubles as MQTT client ID and topic prefix.
    ///
    /// # Errors
    ///
    /// Returns a [`TopicError`] if `device` is not usable in a topic name.
    pub fn new(transport: T, device: &str, config: LinkConfig) -> Result<Self, TopicError> {
        Ok(Self {
            transport,
            config,
            client_id: device.to_string(),
            topics: Topics::new(device)?,
            state: ConnectionState::Disconnected,
            last_attempt_ms: None,
            config_publish_pending: false,
            last_heartbeat_ms: 0,
        })
    }

    /// Current session state
    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether the session is up right now
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected && self.transport.is_connected()
    }

    /// Device topics
    pub fn topics(&self) -> &Topics {
        &self.topics
    }

    /// Whether a configuration announcement is still owed to the broker
    pub fn config_publish_pending(&self) -> bool {
        self.config_publish_pending
    }

    /// Establish the session if it is down
    ///
    /// Idempotent: returns `true` immediately when already connected. Makes
    /// at most one attempt per `reconnect_interval_ms`; throttled calls
    /// return `false` without touching the transport.
    pub fn connect(&mut self, now_ms: u64) -> bool {
        if self.is_connected() {
            return true;
        }
        if !self.retry_due(now_ms) {
            return false;
        }

        self.last_attempt_ms = Some(now_ms);
        self.state = ConnectionState::Connecting;
        info!("Connecting to MQTT as {}...", self.client_id.as_str());

        if !self.transport.connect(&self.client_id) {
            debug!("MQTT connect attempt failed");
            self.state = ConnectionState::Disconnected;
            return false;
        }

        info!("MQTT connected");
        if !self.transport.subscribe(&self.topics.cmd) {
            warn!("Failed to subscribe to {}", self.topics.cmd.as_str());
        }
        self.state = ConnectionState::Connected;
        self.config_publish_pending = true;
        true
    }

    /// Run one link-maintenance step
    ///
    /// Offline: attempt a (throttled) reconnect and return without servicing.
    /// Online: service pending traffic.
    pub fn tick(&mut self, now_ms: u64) -> TickOutcome {
        if !self.is_connected() {
            if self.state == ConnectionState::Connected {
                warn!("MQTT connection lost");
                self.state = ConnectionState::Disconnected;
            }
            if !self.retry_due(now_ms) {
                return TickOutcome::Throttled;
            }
            return if self.connect(now_ms) {
                TickOutcome::Connected
            } else {
                TickOutcome::ConnectFailed
            };
        }

        self.transport.service();
        TickOutcome::Serviced
    }

    /// Pop the next inbound command payload into `buf`
    pub fn receive(&mut self, buf: &mut [u8]) -> Option<usize> {
        if !self.is_connected() {
            return None;
        }
        self.transport.receive(buf)
    }

    /// Publish `payload` on `topic`
    ///
    /// Fails fast (returns `false`) when disconnected or when the payload is
    /// larger than the transport buffer. Never retries.
    pub fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> bool {
        if !self.is_connected() {
            return false;
        }
        let limit = self.transport.max_packet_size();
        if payload.len() > limit {
            warn!(
                "Publish to {} refused: payload size {} exceeds buffer {}",
                topic,
                payload.len(),
                limit
            );
            return false;
        }
        self.transport.publish(topic, payload, retain)
    }

    /// Publish a retained configuration snapshot
    pub fn publish_config(
        &mut self,
        source: ConfigSource,
        document: &ConfigDocument,
        now_ms: u64,
    ) -> bool {
        if !self.is_connected() {
            return false;
        }
        let Some(payload) = messages::config_sync(source, now_ms, document) else {
            error!("Failed to serialize config snapshot");
            return false;
        };

        let topic = self.topics.config.clone();
        let ok = self.publish(&topic, &payload, true);
        if ok {
            info!("Published current config ({})", source.as_str());
        }
        ok
    }

    /// Announce the configuration once after a (re)connect
    ///
    /// Clears the obligation only when the publish succeeds; otherwise it is
    /// retried on the next serviced tick.
    pub fn discharge_pending_config(&mut self, document: &ConfigDocument, now_ms: u64) -> bool {
        if !self.config_publish_pending {
            return false;
        }
        if self.publish_config(ConfigSource::Boot, document, now_ms) {
            self.config_publish_pending = false;
            return true;
        }
        false
    }

    /// Emit a heartbeat if the heartbeat period has elapsed
    ///
    /// Independent of the transmit state. Skipped (without consuming the
    /// period) while disconnected.
    pub fn heartbeat(&mut self, now_ms: u64) -> bool {
        if !self.is_connected() {
            return false;
        }
        if now_ms.saturating_sub(self.last_heartbeat_ms) <= self.config.heartbeat_interval_ms {
            return false;
        }
        self.last_heartbeat_ms = now_ms;

        let Some(payload) = messages::heartbeat(now_ms) else {
            return false;
        };
        let topic = self.topics.heartbeat.clone();
        self.publish(&topic, &payload, false)
    }

    /// The underlying transport
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The underlying transport, mutably
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn retry_due(&self, now_ms: u64) -> bool {
        match self.last_attempt_ms {
            Some(last) => now_ms.saturating_sub(last) >= self.config.reconnect_interval_ms,
            None => true,
        }
    }
}

impl<T: BrokerTransport> TelemetrySink for ConnectivityManager<T> {
    fn publish_batch(&mut self, payload: &[u8]) -> bool {
        let topic = self.topics.data.clone();
        let ok = self.publish(&topic, payload, false);
        if !ok {
            warn!("Data publish failed ({} bytes)", payload.len());
        }
        ok
    }
}
