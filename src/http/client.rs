//! Single-shot HTTP GET with a fixed timeout.
//!
//! Callers issue at most one request per operation, so there is no retry
//! loop here: a failed request is reported and the next operation tries again.

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Per-request timeout handed to the underlying client.
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// An outbound GET request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

/// A response that made it back, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Abstract HTTP client injected into the services.
///
/// `Err` means the request never completed (connection refused, DNS, timeout).
/// Non-2xx statuses are returned as `Ok` so callers can decide what they mean.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

#[async_trait]
impl<T: HttpClient + ?Sized> HttpClient for Arc<T> {
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        (**self).get(request).await
    }
}

/// `HttpClient` backed by reqwest.
#[derive(Clone, Debug)]
pub struct ReqwestClient {
    client: Client,
}

impl ReqwestClient {
    /// Wraps an already configured reqwest Client.
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Builds a client with the fixed timeout and the given User-Agent.
    pub fn with_user_agent(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(user_agent)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self::new(client))
    }

    /// Returns a reference to the underlying reqwest Client.
    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    // The query string may carry credentials, so only the URL is recorded.
    #[tracing::instrument(skip(self, request), fields(url = %request.url))]
    async fn get(&self, request: &HttpRequest) -> Result<HttpResponse> {
        debug!("GET {}...", request.url);

        let mut builder = self.client.get(&request.url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.send().await.context("Failed to send request")?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        debug!("GET {} returned HTTP {}", request.url, status);

        Ok(HttpResponse { status, body })
    }
}
