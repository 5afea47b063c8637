#![deny(unsafe_code)]
#![deny(warnings)]
//! Remote command protocol
//!
//! Operators drive a node by publishing JSON commands to
//! `sensors/<device>/cmd`:
//!
//! ```text
//! {"cmd": "identify" | "start" | "stop" | "update_config" | "get_config",
//!  "run_id": int?, "test_id": int?, "config": {...}?, "restart": bool?}
//! ```
//!
//! - **`command`**: payload parsing and validation
//! - **`session`**: the run/test identity and transmit gate
//! - **`dispatch`**: `CommandProtocol`, which applies commands to the
//!   session and hands everything that touches other components back to the
//!   node as a [`Directive`]
//!
//! The protocol never performs I/O itself. That keeps command handling free
//! of borrows on the broker session it was received from.

pub mod command;
pub mod dispatch;
pub mod session;

pub use command::Command;
pub use dispatch::{CommandProtocol, Directive};
pub use session::SessionIdentity;
