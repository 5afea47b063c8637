//! Visual status indication
//!
//! The LED patterns themselves belong to the board; the control plane only
//! says which condition to show.

/// Conditions the control plane reports to the status indicator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Indication {
    /// Operator asked the node to identify itself
    Identify,
    /// A broker connection attempt is in progress
    Connecting,
    /// The broker session was (re)established
    Connected,
    /// A telemetry batch was published
    DataSent,
}

/// Status indicator (LED, buzzer, ...)
pub trait StatusIndicator {
    /// Show `indication`
    ///
    /// Must not block; animations are advanced by the board.
    fn signal(&mut self, indication: Indication);
}

/// Indicator that shows nothing
impl StatusIndicator for () {
    fn signal(&mut self, _indication: Indication) {}
}
