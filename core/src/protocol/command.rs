//! Command parsing

use alloc::string::{String, ToString};

use serde_json::Value;

use crate::config::{fields, ConfigDocument};
use crate::error::ProtocolError;

/// A validated inbound command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Blink the identify pattern
    Identify,
    /// Begin a collection session
    Start {
        run_id: Option<i32>,
        test_id: Option<i32>,
    },
    /// End the active collection session
    Stop {
        run_id: Option<i32>,
        test_id: Option<i32>,
    },
    /// Merge `config` into the module document
    UpdateConfig { config: ConfigDocument, restart: bool },
    /// Publish the current module document
    GetConfig,
    /// Well-formed command with an unrecognized name
    Unknown(String),
}

impl Command {
    /// Parse a raw command payload
    ///
    /// Ids that are present but not integers in `i32` range are treated as
    /// absent. A missing or non-boolean `restart` means `false`.
    ///
    /// # Errors
    ///
    /// Rejects payloads that are not a JSON object with a string `cmd`, and
    /// `update_config` commands whose `config` is not an object.
    pub fn parse(payload: &[u8]) -> Result<Self, ProtocolError> {
        let value: Value =
            serde_json::from_slice(payload).map_err(|_| ProtocolError::InvalidJson)?;
        let Value::Object(mut message) = value else {
            return Err(ProtocolError::NotAnObject);
        };

        let name = fields::str_field(&message, "cmd")
            .ok_or(ProtocolError::MissingCommand)?
            .to_string();

        let command = match name.as_str() {
            "identify" => Self::Identify,
            "start" => Self::Start {
                run_id: fields::i32_field(&message, "run_id"),
                test_id: fields::i32_field(&message, "test_id"),
            },
            "stop" => Self::Stop {
                run_id: fields::i32_field(&message, "run_id"),
                test_id: fields::i32_field(&message, "test_id"),
            },
            "update_config" => {
                let restart = fields::bool_field(&message, "restart").unwrap_or(false);
                match message.remove("config") {
                    Some(Value::Object(config)) => Self::UpdateConfig { config, restart },
                    _ => return Err(ProtocolError::InvalidConfigField),
                }
            }
            "get_config" => Self::GetConfig,
            _ => Self::Unknown(name),
        };
        Ok(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::doc;
    use serde_json::json;

    fn parse(value: Value) -> Result<Command, ProtocolError> {
        Command::parse(&serde_json::to_vec(&value).unwrap())
    }

    #[test]
    fn test_parse_simple_commands() {
        assert_eq!(parse(json!({"cmd": "identify"})), Ok(Command::Identify));
        assert_eq!(parse(json!({"cmd": "get_config"})), Ok(Command::GetConfig));
        assert_eq!(
            parse(json!({"cmd": "reboot"})),
            Ok(Command::Unknown("reboot".to_string()))
        );
    }

    #[test]
    fn test_parse_start_ids() {
        assert_eq!(
            parse(json!({"cmd": "start", "run_id": 7, "test_id": 3})),
            Ok(Command::Start {
                run_id: Some(7),
                test_id: Some(3)
            })
        );
        assert_eq!(
            parse(json!({"cmd": "start"})),
            Ok(Command::Start {
                run_id: None,
                test_id: None
            })
        );
    }

    #[test]
    fn test_non_integer_ids_are_absent() {
        let cases = [
            json!({"cmd": "stop", "run_id": "7", "test_id": 3.5}),
            json!({"cmd": "stop", "run_id": 4_000_000_000u64, "test_id": null}),
            json!({"cmd": "stop", "run_id": true, "test_id": [1]}),
        ];
        for case in cases {
            assert_eq!(
                parse(case),
                Ok(Command::Stop {
                    run_id: None,
                    test_id: None
                })
            );
        }
    }

    #[test]
    fn test_parse_update_config() {
        assert_eq!(
            parse(json!({"cmd": "update_config", "config": {"buffer_size": 20}, "restart": true})),
            Ok(Command::UpdateConfig {
                config: doc(json!({"buffer_size": 20})),
                restart: true
            })
        );
        assert_eq!(
            parse(json!({"cmd": "update_config", "config": {}, "restart": "yes"})),
            Ok(Command::UpdateConfig {
                config: doc(json!({})),
                restart: false
            })
        );
    }

    #[test]
    fn test_update_config_requires_object() {
        assert_eq!(
            parse(json!({"cmd": "update_config", "config": [1, 2]})),
            Err(ProtocolError::InvalidConfigField)
        );
        assert_eq!(
            parse(json!({"cmd": "update_config"})),
            Err(ProtocolError::InvalidConfigField)
        );
    }

    #[test]
    fn test_malformed_payloads() {
        assert_eq!(Command::parse(b"{cmd:"), Err(ProtocolError::InvalidJson));
        assert_eq!(Command::parse(&[0xff, 0xfe]), Err(ProtocolError::InvalidJson));
        assert_eq!(Command::parse(b"[\"start\"]"), Err(ProtocolError::NotAnObject));
        assert_eq!(Command::parse(b"{}"), Err(ProtocolError::MissingCommand));
        assert_eq!(
            Command::parse(b"{\"cmd\": 5}"),
            Err(ProtocolError::MissingCommand)
        );
    }
}
