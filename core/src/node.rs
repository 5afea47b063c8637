#![deny(unsafe_code)]
#![deny(warnings)]
//! Node control loop
//!
//! [`Node`] owns one instance of every control-plane component plus the
//! board's collaborators, and runs them cooperatively. Each [`Node::poll`]
//! is one iteration:
//!
//! 1. link maintenance ([`ConnectivityManager::tick`])
//! 2. inbound commands, FIFO (only on a serviced tick)
//! 3. pending boot config announcement (only on a serviced tick)
//! 4. sampling and batch publishing
//! 5. heartbeat
//! 6. scheduled restart
//!
//! Nothing in the loop blocks: retries and the restart grace period are
//! elapsed-time comparisons against [`Clock::monotonic_ms`].

use alloc::vec;
use alloc::vec::Vec;

use hal_abstractions::{
    BlobStore, BrokerTransport, Clock, Indication, StatusIndicator, SystemControl,
};

use crate::config::{ConfigDocument, ConfigStore};
use crate::error::{ConfigError, SensorError, TopicError};
use crate::network::{ConfigSource, ConnectivityManager, LinkConfig, TickOutcome};
use crate::protocol::{CommandProtocol, Directive};
use crate::sensors::{Sampler, SensorModule};
use crate::telemetry::BatchOutcome;

/// Largest inbound command accepted, in bytes
pub const MAX_COMMAND_SIZE: usize = 4096;

/// Board collaborators handed to [`Node::new`]
pub struct NodeParts<C, T, S, M, I, Y> {
    pub clock: C,
    pub transport: T,
    pub storage: S,
    pub module: M,
    pub indicator: I,
    pub system: Y,
}

/// A sensor node: one broker session, one sensor module
pub struct Node<C, T, S, M, I, Y> {
    clock: C,
    link: ConnectivityManager<T>,
    config: ConfigStore<S, Sampler<M>>,
    protocol: CommandProtocol,
    indicator: I,
    system: Y,
    restart_grace_ms: u64,
    restart_at_ms: Option<u64>,
    inbound: Vec<u8>,
}

impl<C, T, S, M, I, Y> Node<C, T, S, M, I, Y>
where
    C: Clock,
    T: BrokerTransport,
    S: BlobStore,
    M: SensorModule,
    I: StatusIndicator,
    Y: SystemControl,
{
    /// Assemble a node named `device`
    ///
    /// # Errors
    ///
    /// Returns a [`TopicError`] if `device` cannot be used in topic names.
    pub fn new(
        device: &str,
        parts: NodeParts<C, T, S, M, I, Y>,
        link_config: LinkConfig,
    ) -> Result<Self, TopicError> {
        Ok(Self {
            clock: parts.clock,
            link: ConnectivityManager::new(parts.transport, device, link_config)?,
            config: ConfigStore::new(parts.storage, M::NAME, Sampler::new(parts.module)),
            protocol: CommandProtocol::new(),
            indicator: parts.indicator,
            system: parts.system,
            restart_grace_ms: link_config.restart_grace_ms,
            restart_at_ms: None,
            inbound: vec![0; MAX_COMMAND_SIZE],
        })
    }

    /// Load configuration, bring up the sensor and make the first connect
    /// attempt
    ///
    /// # Errors
    ///
    /// A sensor that fails to initialize is fatal; the board should halt.
    pub fn boot(&mut self) -> Result<(), SensorError> {
        self.config.load();
        self.config.observer_mut().init()?;
        info!("{} sensor initialized", M::NAME);

        let now = self.clock.monotonic_ms();
        self.indicator.signal(Indication::Connecting);
        if self.link.connect(now) {
            self.indicator.signal(Indication::Connected);
        }
        Ok(())
    }

    /// Run one control-loop iteration
    pub fn poll(&mut self) {
        let now = self.clock.monotonic_ms();

        match self.link.tick(now) {
            TickOutcome::Throttled => {}
            TickOutcome::ConnectFailed => self.indicator.signal(Indication::Connecting),
            TickOutcome::Connected => self.indicator.signal(Indication::Connected),
            TickOutcome::Serviced => {
                self.process_commands(now);
                self.link
                    .discharge_pending_config(self.config.document(), now);
            }
        }

        let session = *self.protocol.session();
        let epoch_ms = self.clock.epoch_ms();
        let outcome = self
            .config
            .observer_mut()
            .poll(now, epoch_ms, &session, &mut self.link);
        if outcome == Some(BatchOutcome::Published) {
            self.indicator.signal(Indication::DataSent);
        }

        self.link.heartbeat(now);

        if let Some(at) = self.restart_at_ms {
            if now >= at {
                info!("Restarting to apply config");
                self.restart_at_ms = None;
                self.system.restart();
            }
        }
    }

    fn process_commands(&mut self, now: u64) {
        while let Some(len) = self.link.receive(&mut self.inbound) {
            if let Some(directive) = self.protocol.handle(&self.inbound[..len]) {
                self.execute(directive, now);
            }
        }
    }

    fn execute(&mut self, directive: Directive, now: u64) {
        match directive {
            Directive::Identify => {
                info!("Identify requested");
                self.indicator.signal(Indication::Identify);
            }
            Directive::ApplyConfig { config, restart } => self.apply_config(config, restart, now),
            Directive::PublishConfig => {
                self.link
                    .publish_config(ConfigSource::Request, self.config.document(), now);
            }
        }
    }

    fn apply_config(&mut self, patch: ConfigDocument, restart: bool, now: u64) {
        match self.config.merge(patch) {
            Ok(()) => info!("Config merged and saved"),
            Err(ConfigError::DocumentTooLarge) => {
                warn!("Config update rejected: document too large");
                return;
            }
            // Memory stays authoritative; the store logged the failure
            Err(e) => warn!("Config merged but not saved: {}", e),
        }

        let published = self
            .link
            .publish_config(ConfigSource::Update, self.config.document(), now);

        if published && restart {
            let at = now + self.restart_grace_ms;
            info!("Restart scheduled at {} ms", at);
            self.restart_at_ms = Some(at);
        }
    }

    /// Restart deadline, if one is pending
    pub fn restart_at_ms(&self) -> Option<u64> {
        self.restart_at_ms
    }

    /// The broker session
    pub fn link(&self) -> &ConnectivityManager<T> {
        &self.link
    }

    /// The broker session, mutably
    pub fn link_mut(&mut self) -> &mut ConnectivityManager<T> {
        &mut self.link
    }

    /// The configuration store
    pub fn config(&self) -> &ConfigStore<S, Sampler<M>> {
        &self.config
    }

    /// The sensor module with its pipeline
    pub fn sampler(&self) -> &Sampler<M> {
        self.config.observer()
    }

    /// The command protocol
    pub fn protocol(&self) -> &CommandProtocol {
        &self.protocol
    }

    /// The status indicator
    pub fn indicator(&self) -> &I {
        &self.indicator
    }

    /// System control
    pub fn system(&self) -> &Y {
        &self.system
    }
}
