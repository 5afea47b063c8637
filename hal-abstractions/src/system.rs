//! System-level control

/// Operations on the node as a whole
pub trait SystemControl {
    /// Reset the node
    ///
    /// On hardware this does not return. Test doubles record the request.
    fn restart(&mut self);
}
