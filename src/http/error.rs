//! Errors raised while fetching a URL.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    /// Connection, DNS, TLS or body read failure.
    #[error("request failed: {0}")]
    Transport(#[from] wreq::Error),

    #[error("request timed out after {}s", .0.as_secs_f32())]
    Timeout(Duration),

    /// Final status after retries was not a success.
    #[error("{url} returned status {status}")]
    Status { status: u16, url: String },
}
