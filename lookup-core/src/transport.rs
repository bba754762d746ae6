use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};
use tracing::debug;

use crate::{config::Config, error::LookupError, path::join_url};

/// A settled HTTP exchange: status plus the complete body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl FetchedResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self { status, body: body.into() }
    }
}

/// First stage of a lookup: turn a request path into a settled response.
#[async_trait]
pub trait WeatherTransport: Send + Sync + Debug {
    async fn fetch(&self, path: &str) -> Result<FetchedResponse, LookupError>;
}

#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    http: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> Result<Self, LookupError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().map_err(LookupError::Client)?;

        Ok(Self { base_url: base_url.into(), http })
    }

    pub fn from_config(config: &Config) -> Result<Self, LookupError> {
        Self::new(config.base_url.clone(), config.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl WeatherTransport for HttpTransport {
    async fn fetch(&self, path: &str) -> Result<FetchedResponse, LookupError> {
        let url = join_url(&self.base_url, path);
        debug!(url = %url, "Fetching weather");

        let res = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| LookupError::fetch(path, e))?;

        // No status check: an error status with a JSON body still renders.
        let status = res.status().as_u16();
        let body = res.bytes().await.map_err(|e| LookupError::fetch(path, e))?;

        debug!(status, len = body.len(), "Weather response settled");
        Ok(FetchedResponse { status, body: body.to_vec() })
    }
}
