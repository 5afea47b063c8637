//! Message broker transport
//!
//! A `BrokerTransport` is the board's view of one MQTT session. All methods
//! must return promptly: boards that run the MQTT client in a separate async
//! task implement them on top of channels and atomics rather than awaiting
//! the network.

/// Non-blocking publish/subscribe transport to a message broker
pub trait BrokerTransport {
    /// Whether the broker session is currently up
    fn is_connected(&self) -> bool;

    /// Start (or complete) a connection attempt using `client_id`
    ///
    /// Returns `true` once the session is established. A `false` return
    /// means "not connected yet"; the caller retries later.
    fn connect(&mut self, client_id: &str) -> bool;

    /// Subscribe to `topic`; returns `false` if the request could not be
    /// queued
    fn subscribe(&mut self, topic: &str) -> bool;

    /// Service pending inbound/outbound traffic
    fn service(&mut self);

    /// Pop the next inbound message payload into `buf`
    ///
    /// Returns the payload length, or `None` when no message is pending.
    /// Payloads longer than `buf` are dropped by the transport.
    fn receive(&mut self, buf: &mut [u8]) -> Option<usize>;

    /// Publish `payload` on `topic`
    ///
    /// Returns `false` if the message was not accepted (disconnected, queue
    /// full, payload too large). Never retries.
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> bool;

    /// Largest payload the transport accepts, in bytes
    fn max_packet_size(&self) -> usize;
}
