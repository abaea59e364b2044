//! HTTP retrieval, the single point of network I/O
//!
//! Every request carries the subscription cookie. Gateway failures (502/504)
//! and connection errors are retried with backoff; any other non-2xx status is
//! fatal for the calling step. Multi-URL fetches run in fixed-size batches:
//! members of a batch are in flight together, batches run one after another,
//! and results come back in input order.
//!
//! The fetch timeout bounds connecting and waiting for response headers.
//! Bodies are streamed by the caller without a deadline, so a long batch of
//! large files is never cut off mid-transfer.

use crate::config::{Config, RetryConfig};
use crate::error::{Error, Result};
use crate::logger::Logger;
use crate::page::HtmlPage;
use crate::retry::fetch_with_retry;
use crate::types::format_counter;
use futures::future::try_join_all;
use reqwest::header::COOKIE;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Authenticated HTTP client with retry and batched fan-out
pub struct Fetcher {
    client: reqwest::Client,
    auth_cookie: String,
    chunk_size: usize,
    response_timeout: Duration,
    retry: RetryConfig,
    logger: Arc<dyn Logger>,
}

impl Fetcher {
    /// Create a fetcher from the run configuration
    ///
    /// # Errors
    /// Returns a config error if the HTTP client cannot be built
    pub fn new(config: &Config, logger: Arc<dyn Logger>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(config.fetch.timeout)
            .user_agent(config.fetch.user_agent.as_str())
            .build()
            .map_err(|e| Error::Config {
                message: format!("failed to create HTTP client: {}", e),
                key: Some("fetch".to_string()),
            })?;

        Ok(Self {
            client,
            auth_cookie: config.auth_cookie.clone(),
            chunk_size: config.fetch.chunk_size.max(1),
            response_timeout: config.fetch.timeout,
            retry: config.retry.clone(),
            logger,
        })
    }

    /// GET a URL, retrying gateway failures
    ///
    /// # Errors
    /// `Error::Fetch` when the final status is not 2xx, `Error::Timeout` when
    /// no headers arrived in time, `Error::Network` when the request could not
    /// be completed
    pub async fn fetch_response(&self, url: &str) -> Result<reqwest::Response> {
        fetch_with_retry(&self.retry, || self.send(url))
            .await
            .inspect_err(|_| self.logger.error(&format!("Could not fetch url: {}", url)))
    }

    async fn send(&self, url: &str) -> Result<reqwest::Response> {
        tracing::debug!(url, "GET");
        let request = self.client.get(url).header(COOKIE, &self.auth_cookie).send();
        let response = tokio::time::timeout(self.response_timeout, request)
            .await
            .map_err(|_| Error::Timeout {
                url: url.to_string(),
                after: self.response_timeout,
            })?
            .map_err(|source| Error::Network {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Fetch {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    /// GET a URL and parse the body as HTML
    pub async fn fetch_html(&self, url: &str) -> Result<HtmlPage> {
        let response = self.fetch_response(url).await?;
        let body = response.text().await.map_err(|source| {
            self.logger.error(&format!("Could not read body of url: {}", url));
            Error::Network {
                url: url.to_string(),
                source,
            }
        })?;
        HtmlPage::parse(url, &body).inspect_err(|e| self.logger.error(&e.to_string()))
    }

    /// Fetch and parse many pages, batch by batch, preserving input order
    ///
    /// Logs `(i/n) <label>` before each batch. The first failure aborts the call.
    pub async fn fetch_html_chunked(&self, urls: &[String], label: &str) -> Result<Vec<HtmlPage>> {
        self.fetch_chunked(urls, label, |url| self.fetch_html(url))
            .await
    }

    /// Open responses for many URLs, batch by batch, preserving input order
    pub async fn fetch_responses_chunked(
        &self,
        urls: &[String],
        label: &str,
    ) -> Result<Vec<reqwest::Response>> {
        self.fetch_chunked(urls, label, |url| self.fetch_response(url))
            .await
    }

    async fn fetch_chunked<'a, T, F, Fut>(
        &self,
        urls: &'a [String],
        label: &str,
        fetch: F,
    ) -> Result<Vec<T>>
    where
        F: Fn(&'a str) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let chunks: Vec<&'a [String]> = urls.chunks(self.chunk_size).collect();
        let total = chunks.len();
        let mut results = Vec::with_capacity(urls.len());

        for (index, chunk) in chunks.into_iter().enumerate() {
            self.logger
                .info(&format!("{} {}", format_counter(index + 1, total), label));
            let fetched = try_join_all(chunk.iter().map(|url| fetch(url.as_str()))).await?;
            results.extend(fetched);
        }

        Ok(results)
    }
}
