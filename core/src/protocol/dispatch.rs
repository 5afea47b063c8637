//! Command dispatch

use crate::config::ConfigDocument;

use super::command::Command;
use super::session::SessionIdentity;

/// Work a command asks of components outside the protocol
#[derive(Debug, Clone, PartialEq)]
pub enum Directive {
    /// Show the identify indication
    Identify,
    /// Merge `config`, persist it, publish the result as `update`, and
    /// restart after the grace period if `restart` is set and the publish
    /// succeeded
    ApplyConfig { config: ConfigDocument, restart: bool },
    /// Publish the current configuration as `request`
    PublishConfig,
}

/// Applies inbound commands to the session identity
///
/// Rejected commands are logged here and never reach the caller.
#[derive(Debug, Default)]
pub struct CommandProtocol {
    session: SessionIdentity,
}

impl CommandProtocol {
    /// Create an idle protocol (not transmitting, no ids)
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle one raw command payload
    ///
    /// Session commands take effect immediately. Anything else is returned
    /// as a [`Directive`] for the node to carry out.
    pub fn handle(&mut self, payload: &[u8]) -> Option<Directive> {
        let command = match Command::parse(payload) {
            Ok(command) => command,
            Err(e) => {
                warn!("Command rejected: {}", e);
                return None;
            }
        };

        match command {
            Command::Identify => Some(Directive::Identify),
            Command::Start { run_id, test_id } => {
                self.session.start(run_id, test_id);
                info!(
                    "Data transmission enabled for run_id {:?}, test_id {:?}",
                    self.session.run_id(),
                    self.session.test_id()
                );
                None
            }
            Command::Stop { run_id, test_id } => {
                if self.session.stop(run_id, test_id) {
                    info!("Data transmission disabled");
                } else {
                    warn!("Stop ignored: run_id/test_id mismatch");
                }
                None
            }
            Command::UpdateConfig { config, restart } => {
                if self.session.transmit_enabled() {
                    warn!("Config update ignored: transmission is enabled");
                    return None;
                }
                Some(Directive::ApplyConfig { config, restart })
            }
            Command::GetConfig => Some(Directive::PublishConfig),
            Command::Unknown(name) => {
                warn!("Unknown command: {}", name.as_str());
                None
            }
        }
    }

    /// Current session identity
    pub fn session(&self) -> &SessionIdentity {
        &self.session
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::doc;
    use serde_json::{json, Value};

    fn send(protocol: &mut CommandProtocol, value: Value) -> Option<Directive> {
        protocol.handle(&serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn test_transmit_follows_start_and_stop() {
        let mut protocol = CommandProtocol::new();
        assert!(!protocol.session().transmit_enabled());

        assert_eq!(send(&mut protocol, json!({"cmd": "start", "run_id": 1})), None);
        assert!(protocol.session().transmit_enabled());

        send(&mut protocol, json!({"cmd": "stop"}));
        assert!(!protocol.session().transmit_enabled());

        send(&mut protocol, json!({"cmd": "start", "run_id": 2, "test_id": 9}));
        send(&mut protocol, json!({"cmd": "start", "run_id": 3, "test_id": 9}));
        send(&mut protocol, json!({"cmd": "stop", "run_id": 2}));
        assert!(protocol.session().transmit_enabled());
        send(&mut protocol, json!({"cmd": "stop", "run_id": 3, "test_id": 9}));
        assert!(!protocol.session().transmit_enabled());
    }

    #[test]
    fn test_mismatched_stop_keeps_transmitting() {
        let mut protocol = CommandProtocol::new();
        send(&mut protocol, json!({"cmd": "start", "run_id": 7, "test_id": 3}));
        send(&mut protocol, json!({"cmd": "stop", "run_id": 7, "test_id": 4}));
        assert!(protocol.session().transmit_enabled());
        assert_eq!(protocol.session().test_id(), Some(3));
    }

    #[test]
    fn test_bare_start_resumes_previous_run() {
        let mut protocol = CommandProtocol::new();
        send(&mut protocol, json!({"cmd": "start", "run_id": 7, "test_id": 3}));
        send(&mut protocol, json!({"cmd": "stop", "run_id": 7, "test_id": 3}));
        send(&mut protocol, json!({"cmd": "start"}));
        assert_eq!(protocol.session().run_id(), Some(7));

        send(&mut protocol, json!({"cmd": "stop", "run_id": 7, "test_id": 3}));
        assert!(!protocol.session().transmit_enabled());
    }

    #[test]
    fn test_update_config_while_transmitting_is_ignored() {
        let mut protocol = CommandProtocol::new();
        send(&mut protocol, json!({"cmd": "start"}));
        let directive = send(
            &mut protocol,
            json!({"cmd": "update_config", "config": {"buffer_size": 1}}),
        );
        assert_eq!(directive, None);
    }

    #[test]
    fn test_update_config_when_idle() {
        let mut protocol = CommandProtocol::new();
        let directive = send(
            &mut protocol,
            json!({"cmd": "update_config", "config": {"buffer_size": 1}, "restart": true}),
        );
        assert_eq!(
            directive,
            Some(Directive::ApplyConfig {
                config: doc(json!({"buffer_size": 1})),
                restart: true
            })
        );
    }

    #[test]
    fn test_directives_for_identify_and_get_config() {
        let mut protocol = CommandProtocol::new();
        assert_eq!(
            send(&mut protocol, json!({"cmd": "identify"})),
            Some(Directive::Identify)
        );
        assert_eq!(
            send(&mut protocol, json!({"cmd": "get_config"})),
            Some(Directive::PublishConfig)
        );
    }

    #[test]
    fn test_rejected_input_has_no_side_effects() {
        let mut protocol = CommandProtocol::new();
        send(&mut protocol, json!({"cmd": "start", "run_id": 5}));
        let before = *protocol.session();

        assert_eq!(protocol.handle(b"not json"), None);
        assert_eq!(protocol.handle(b"42"), None);
        assert_eq!(send(&mut protocol, json!({"run_id": 1})), None);
        assert_eq!(send(&mut protocol, json!({"cmd": "explode"})), None);
        assert_eq!(*protocol.session(), before);
    }
}
