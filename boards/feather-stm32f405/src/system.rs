#![deny(unsafe_code)]
#![deny(warnings)]
//! Device restart

use hal_abstractions::SystemControl;

/// Restarts through the Cortex-M system reset request
#[derive(Debug, Default)]
pub struct SystemReset;

impl SystemControl for SystemReset {
    fn restart(&mut self) {
        defmt::warn!("Restarting");
        cortex_m::peripheral::SCB::sys_reset();
    }
}
