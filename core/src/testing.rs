//! In-memory fakes shared by the unit tests

#![allow(dead_code)]

use std::cell::Cell;
use std::collections::{BTreeMap, VecDeque};
use std::string::{String, ToString};
use std::vec::Vec;

use embedded_io::ErrorKind;
use hal_abstractions::{
    BlobStore, BrokerTransport, Clock, DelayNs, Indication, InitError, RangeFinder,
    StatusIndicator, SystemControl,
};
use serde_json::Value;

use crate::config::{ConfigDocument, ConfigObserver};

/// Unwrap a `json!` object literal into a document
pub fn doc(value: Value) -> ConfigDocument {
    match value {
        Value::Object(map) => map,
        other => panic!("test document must be an object, got {other}"),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryStoreError(pub ErrorKind);

impl core::fmt::Display for MemoryStoreError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "memory store error: {:?}", self.0)
    }
}

impl core::error::Error for MemoryStoreError {}

impl embedded_io::Error for MemoryStoreError {
    fn kind(&self) -> ErrorKind {
        self.0
    }
}

/// RAM-backed blob store
#[derive(Debug, Default)]
pub struct MemoryStore {
    blobs: BTreeMap<String, Vec<u8>>,
    pub fail_writes: bool,
}

impl MemoryStore {
    pub fn insert(&mut self, name: &str, bytes: &[u8]) {
        self.blobs.insert(name.to_string(), bytes.to_vec());
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.blobs.get(name).cloned()
    }
}

impl BlobStore for MemoryStore {
    type Error = MemoryStoreError;

    fn read(&mut self, name: &str, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let blob = self
            .blobs
            .get(name)
            .ok_or(MemoryStoreError(ErrorKind::NotFound))?;
        if blob.len() > buf.len() {
            return Err(MemoryStoreError(ErrorKind::OutOfMemory));
        }
        buf[..blob.len()].copy_from_slice(blob);
        Ok(blob.len())
    }

    fn write(&mut self, name: &str, bytes: &[u8]) -> Result<(), Self::Error> {
        if self.fail_writes {
            return Err(MemoryStoreError(ErrorKind::Other));
        }
        self.insert(name, bytes);
        Ok(())
    }
}

/// Scriptable broker
#[derive(Debug)]
pub struct FakeTransport {
    /// Whether connection attempts succeed
    pub broker_up: bool,
    /// Whether publishes are acknowledged
    pub accept_publish: bool,
    pub max_packet: usize,
    pub link_up: bool,
    pub connect_attempts: usize,
    pub service_calls: usize,
    pub client_ids: Vec<String>,
    pub subscriptions: Vec<String>,
    pub inbox: VecDeque<Vec<u8>>,
    pub published: Vec<(String, Vec<u8>, bool)>,
}

impl Default for FakeTransport {
    fn default() -> Self {
        Self {
            broker_up: true,
            accept_publish: true,
            max_packet: 16384,
            link_up: false,
            connect_attempts: 0,
            service_calls: 0,
            client_ids: Vec::new(),
            subscriptions: Vec::new(),
            inbox: VecDeque::new(),
            published: Vec::new(),
        }
    }
}

impl FakeTransport {
    pub fn drop_link(&mut self) {
        self.link_up = false;
    }

    /// Queue an inbound command
    pub fn push_command(&mut self, value: Value) {
        self.inbox.push_back(serde_json::to_vec(&value).unwrap());
    }

    /// Payloads published on topics ending in `suffix`, parsed as JSON
    pub fn published_on(&self, suffix: &str) -> Vec<Value> {
        self.published
            .iter()
            .filter(|(topic, _, _)| topic.ends_with(suffix))
            .map(|(_, payload, _)| serde_json::from_slice(payload).unwrap())
            .collect()
    }
}

impl BrokerTransport for FakeTransport {
    fn is_connected(&self) -> bool {
        self.link_up
    }

    fn connect(&mut self, client_id: &str) -> bool {
        self.connect_attempts += 1;
        self.client_ids.push(client_id.to_string());
        self.link_up = self.broker_up;
        self.link_up
    }

    fn subscribe(&mut self, topic: &str) -> bool {
        self.subscriptions.push(topic.to_string());
        true
    }

    fn service(&mut self) {
        self.service_calls += 1;
    }

    fn receive(&mut self, buf: &mut [u8]) -> Option<usize> {
        let message = self.inbox.pop_front()?;
        let len = message.len().min(buf.len());
        buf[..len].copy_from_slice(&message[..len]);
        Some(len)
    }

    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> bool {
        if !self.link_up || !self.accept_publish {
            return false;
        }
        self.published
            .push((topic.to_string(), payload.to_vec(), retain));
        true
    }

    fn max_packet_size(&self) -> usize {
        self.max_packet
    }
}

/// Manually advanced clock; wall time is monotonic time plus a fixed offset
#[derive(Debug, Default)]
pub struct FakeClock {
    now_ms: Cell<u64>,
    pub epoch_offset_ms: u64,
}

impl FakeClock {
    pub fn at(now_ms: u64) -> Self {
        Self {
            now_ms: Cell::new(now_ms),
            epoch_offset_ms: 1_700_000_000_000,
        }
    }

    pub fn advance(&self, ms: u64) {
        self.now_ms.set(self.now_ms.get() + ms);
    }
}

impl Clock for FakeClock {
    fn monotonic_ms(&self) -> u64 {
        self.now_ms.get()
    }

    fn epoch_ms(&self) -> u64 {
        self.now_ms.get() + self.epoch_offset_ms
    }
}

#[derive(Debug, Default)]
pub struct RecordingIndicator {
    pub signals: Vec<Indication>,
}

impl StatusIndicator for RecordingIndicator {
    fn signal(&mut self, indication: Indication) {
        self.signals.push(indication);
    }
}

#[derive(Debug, Default)]
pub struct RecordingSystem {
    pub restarts: usize,
}

impl SystemControl for RecordingSystem {
    fn restart(&mut self) {
        self.restarts += 1;
    }
}

#[derive(Debug, Default)]
pub struct RecordingObserver {
    pub changes: Vec<ConfigDocument>,
}

impl ConfigObserver for RecordingObserver {
    fn on_config_changed(&mut self, document: &ConfigDocument) {
        self.changes.push(document.clone());
    }
}

/// Delay that returns immediately and counts requested nanoseconds
#[derive(Debug, Default)]
pub struct NoDelay {
    pub total_ns: u64,
}

impl DelayNs for NoDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
    }
}

/// Range finder that always reports the same distance
#[derive(Debug)]
pub struct FixedRange {
    pub present: bool,
    pub mm: Option<u16>,
}

impl Default for FixedRange {
    fn default() -> Self {
        Self {
            present: true,
            mm: Some(250),
        }
    }
}

impl RangeFinder for FixedRange {
    fn init(&mut self) -> Result<(), InitError> {
        if self.present {
            Ok(())
        } else {
            Err(InitError)
        }
    }

    fn read_mm(&mut self) -> Option<u16> {
        self.mm
    }
}
