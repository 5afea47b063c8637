#![deny(unsafe_code)]
#![deny(warnings)]
//! Network client trait
//!
//! Both protocol clients on this board (SNTP and the MQTT session) run on the
//! same embassy-net stack inside the network task. Each implements
//! `NetworkClient` so the task can drive them with the same retry loop.

use super::error::NetworkError;

/// Trait for network protocol clients
///
/// Implementors log their own failures and return them; the caller decides
/// when to try again.
///
/// # Example Implementation
/// ```ignore
/// struct SntpClient { config: SntpConfig }
///
/// impl NetworkClient for SntpClient {
///     type Output = u64;
///     async fn run(&mut self, stack: &Stack<'static>) -> Result<Self::Output, NetworkError> {
///         // One SNTP exchange, returns Unix milliseconds
///     }
/// }
/// ```
pub trait NetworkClient {
    /// Output type for successful client operation
    type Output;

    /// Run the client operation once
    ///
    /// For SNTP this is one sync; for MQTT it is one broker session, which
    /// only returns when the session ends.
    fn run(
        &mut self,
        stack: &embassy_net::Stack<'static>,
    ) -> impl core::future::Future<Output = Result<Self::Output, NetworkError>>;
}
