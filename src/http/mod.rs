//! HTTP retrieval shared by every site adapter.

pub mod client;
pub mod error;

pub use client::{FetchedBytes, Fetcher, HttpClient, RetryPolicy, Throttle};
pub use error::FetchError;
