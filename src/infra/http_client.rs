//! HTTP client factory with consistent timeout configuration.
//!
//! Both adapters (backend API and payment provider) build their clients here
//! so a hung endpoint can never stall a payment flow indefinitely.

use reqwest::Client;
use std::time::Duration;

/// Default connect timeout (TCP handshake + TLS).
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default request timeout (total request/response time).
///
/// Plan changes and payment confirmations are expected to complete within
/// seconds; anything slower is surfaced as an error rather than left pending.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Build an HTTP client with default timeouts.
///
/// Panics if the client cannot be built (e.g., TLS misconfiguration). This is
/// acceptable for singleton constructors since the billing client cannot
/// function without HTTP at all.
pub fn build_client() -> Client {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
        .expect("Failed to build HTTP client")
}

/// Build an HTTP client with default timeouts, returning Result for fallible
/// contexts.
pub fn try_build_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .timeout(DEFAULT_REQUEST_TIMEOUT)
        .build()
}
