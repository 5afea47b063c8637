//! Collection session identity

/// Run/test identity of the current collection session
///
/// `transmit_enabled` is true only between an accepted `start` and an
/// accepted `stop`. The ids tag every published batch and guard `stop`:
/// an operator can only end the session it started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SessionIdentity {
    run_id: Option<i32>,
    test_id: Option<i32>,
    transmit_enabled: bool,
}

impl SessionIdentity {
    /// Begin transmitting under the given ids
    ///
    /// A given id replaces the stored one; an absent id keeps it, so a bare
    /// `start` resumes the previous run under its ids.
    pub fn start(&mut self, run_id: Option<i32>, test_id: Option<i32>) {
        if run_id.is_some() {
            self.run_id = run_id;
        }
        if test_id.is_some() {
            self.test_id = test_id;
        }
        self.transmit_enabled = true;
    }

    /// Stop transmitting if the given ids match the active session
    ///
    /// An id that is not given matches anything. Returns `false` (and leaves
    /// the session untouched) on a mismatch.
    pub fn stop(&mut self, run_id: Option<i32>, test_id: Option<i32>) -> bool {
        let matches = |given: Option<i32>, active: Option<i32>| {
            given.is_none() || given == active
        };
        if !matches(run_id, self.run_id) || !matches(test_id, self.test_id) {
            return false;
        }
        self.transmit_enabled = false;
        true
    }

    /// Whether batches are currently published
    pub fn transmit_enabled(&self) -> bool {
        self.transmit_enabled
    }

    /// Active run id
    pub fn run_id(&self) -> Option<i32> {
        self.run_id
    }

    /// Active test id
    pub fn test_id(&self) -> Option<i32> {
        self.test_id
    }
}
