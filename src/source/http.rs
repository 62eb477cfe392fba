//! HTTP/HTTPS range fetcher.
//!
//! Reads are served with `Range` requests, so only the bytes a stream asks
//! for cross the network.

use super::remote::slice_full_body;
use super::{ByteRange, RangeFetcher};
use crate::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, header};
use url::Url;

/// Range fetcher for a single HTTP/HTTPS URL.
pub struct HttpFetcher {
    client: Client,
    url: Url,
}

impl HttpFetcher {
    pub fn new(url: Url) -> Result<Self> {
        let client = Client::builder()
            .build()
            .map_err(|e| Error::Remote(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self::with_client(client, url))
    }

    /// Use a preconfigured client (proxies, timeouts, auth headers).
    pub fn with_client(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Get the content length of the URL via HEAD request.
    async fn head_length(&self) -> Result<Option<u64>> {
        let response = self
            .client
            .head(self.url.clone())
            .send()
            .await
            .map_err(|e| Error::Remote(format!("HTTP HEAD request failed: {}", e)))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound(self.url.to_string()));
        }
        if !response.status().is_success() {
            return Ok(None);
        }

        Ok(response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok()))
    }

    /// Get the content length from the `Content-Range` total of a one byte
    /// ranged GET.
    async fn probe_length(&self) -> Result<Option<u64>> {
        let response = self
            .client
            .get(self.url.clone())
            .header(header::RANGE, ByteRange::new(0, 1).header_value())
            .send()
            .await
            .map_err(|e| Error::Remote(format!("HTTP GET request failed: {}", e)))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(Error::NotFound(self.url.to_string())),
            StatusCode::PARTIAL_CONTENT | StatusCode::RANGE_NOT_SATISFIABLE => Ok(response
                .headers()
                .get(header::CONTENT_RANGE)
                .and_then(|v| v.to_str().ok())
                .and_then(content_range_total)),
            status if status.is_success() => Ok(response.content_length()),
            status => Err(Error::Remote(format!(
                "HTTP GET {} returned {}",
                self.url, status
            ))),
        }
    }
}

#[async_trait]
impl RangeFetcher for HttpFetcher {
    async fn content_length(&self) -> Result<Option<u64>> {
        match self.head_length().await? {
            Some(length) => Ok(Some(length)),
            None => self.probe_length().await,
        }
    }

    async fn fetch(&self, range: ByteRange) -> Result<Bytes> {
        if range.is_empty() {
            return Ok(Bytes::new());
        }

        tracing::trace!("GET {} {}", self.url, range.header_value());

        let response = self
            .client
            .get(self.url.clone())
            .header(header::RANGE, range.header_value())
            .send()
            .await
            .map_err(|e| Error::Remote(format!("HTTP GET request failed: {}", e)))?;

        let status = response.status();
        match status {
            StatusCode::RANGE_NOT_SATISFIABLE => return Ok(Bytes::new()),
            StatusCode::NOT_FOUND => return Err(Error::NotFound(self.url.to_string())),
            _ if !status.is_success() => {
                return Err(Error::Remote(format!(
                    "HTTP GET {} returned {}",
                    self.url, status
                )));
            }
            _ => {}
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Remote(format!("failed to read HTTP response: {}", e)))?;

        if status == StatusCode::PARTIAL_CONTENT {
            let wanted = range.len().unwrap_or(body.len() as u64) as usize;
            Ok(body.slice(..wanted.min(body.len())))
        } else {
            // Server ignored the Range header and sent the whole object
            slice_full_body(body, range)
        }
    }

    fn describe(&self) -> String {
        self.url.to_string()
    }
}

/// Parse the total from a `Content-Range` value such as `bytes 0-0/1234`.
fn content_range_total(value: &str) -> Option<u64> {
    let (_, total) = value.rsplit_once('/')?;
    total.trim().parse().ok()
}
