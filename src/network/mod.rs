//! HTTP networking module
//!
//! Provides HTTP client functionality for making requests to providers.

mod client;
mod request;

pub use client::HttpClient;
pub use request::{HttpMethod, ProviderRequest, ProviderResponse, RequestBody};
