// src/utils/http.rs

//! HTTP client utilities.
//!
//! Every catalog request goes through [`Transport`], which retries server-side
//! failures with exponential backoff and turns everything else into an error
//! that aborts the crawl.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{AppError, Result};
use crate::models::HttpConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &HttpConfig) -> Result<Client> {
    let client = Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// What to do with a response status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusAction {
    Accept,
    Retry,
    Abort,
}

impl StatusAction {
    pub fn classify(status: StatusCode) -> Self {
        if status.is_success() {
            Self::Accept
        } else if status.is_server_error() {
            Self::Retry
        } else {
            Self::Abort
        }
    }
}

/// Delay before retry number `attempt` (0-based): `base * 2^attempt`.
pub fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt))
}

/// Retry-aware JSON transport sharing one connection pool.
#[derive(Debug)]
pub struct Transport {
    client: Client,
    max_retries: u32,
    backoff_base: Duration,
    requests: AtomicUsize,
}

impl Transport {
    pub fn new(config: &HttpConfig) -> Result<Self> {
        Ok(Self::with_client(
            create_async_client(config)?,
            config.max_retries,
            Duration::from_millis(config.backoff_base_ms),
        ))
    }

    pub fn with_client(client: Client, max_retries: u32, backoff_base: Duration) -> Self {
        Self {
            client,
            max_retries,
            backoff_base,
            requests: AtomicUsize::new(0),
        }
    }

    /// Number of HTTP requests sent so far, retries included.
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::Relaxed)
    }

    /// GET `url` and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T> {
        let mut attempt = 0;
        loop {
            self.requests.fetch_add(1, Ordering::Relaxed);
            log::debug!("GET {url} {query:?}");
            let response = self.client.get(url).query(query).send().await?;
            let status = response.status();

            match StatusAction::classify(status) {
                StatusAction::Accept => return Ok(response.json().await?),
                StatusAction::Retry if attempt < self.max_retries => {
                    let delay = backoff_delay(self.backoff_base, attempt);
                    attempt += 1;
                    log::warn!(
                        "{url} answered {status}; retry {attempt}/{} in {delay:?}",
                        self.max_retries
                    );
                    tokio::time::sleep(delay).await;
                }
                StatusAction::Retry | StatusAction::Abort => {
                    log::error!("{url} answered {status}; aborting");
                    return Err(AppError::Status {
                        url: url.to_string(),
                        status: status.as_u16(),
                    });
                }
            }
        }
    }
}
