//! HTTP client abstraction used by the release and weather lookups.

mod client;

pub use client::{HttpClient, HttpRequest, HttpResponse, REQUEST_TIMEOUT_SECS, ReqwestClient};

#[cfg(test)]
pub use client::MockHttpClient;
