//! Low-level HTTP client — `QuoteHttp`.
//!
//! One method per API endpoint. Returns wire types (conversion to domain types
//! happens in the sub-clients). Internal to the SDK — `CryptoSphereClient` wraps this.

use crate::domain::asset::wire::CryptocurrenciesResponse;
use crate::domain::conversion::wire::ConvertResponse;
use crate::error::{error_detail, HttpError};
use crate::http::retry::{RetryConfig, RetryPolicy};

use reqwest::Client;
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;

/// Low-level HTTP client for the quote service REST API.
#[derive(Clone)]
pub struct QuoteHttp {
    base_url: String,
    client: Client,
    retry: RetryPolicy,
}

impl QuoteHttp {
    pub fn new(base_url: &str, timeout: Duration, retry: RetryPolicy) -> Result<Self, HttpError> {
        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
            retry,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ── Assets ───────────────────────────────────────────────────────────

    pub async fn get_cryptocurrencies(&self) -> Result<CryptocurrenciesResponse, HttpError> {
        let url = format!("{}/cryptocurrencies", self.base_url);
        self.get(&url, self.retry.clone()).await
    }

    // ── Conversion ───────────────────────────────────────────────────────

    pub async fn get_conversion(
        &self,
        source: &str,
        amount: &str,
        target: &str,
    ) -> Result<ConvertResponse, HttpError> {
        let url = format!(
            "{}/convert?source={}&amount={}&target={}",
            self.base_url,
            urlencoding::encode(source),
            urlencoding::encode(amount),
            urlencoding::encode(target)
        );
        self.get(&url, self.retry.clone()).await
    }

    // ── Internal HTTP methods ────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: &str,
        retry: RetryPolicy,
    ) -> Result<T, HttpError> {
        let config = match &retry {
            RetryPolicy::None => {
                return self.do_get(url).await;
            }
            RetryPolicy::Idempotent => RetryConfig::idempotent(),
            RetryPolicy::Custom(c) => c.clone(),
        };

        with_retry(&config, url, || self.do_get::<T>(url)).await
    }

    async fn do_get<T: DeserializeOwned>(&self, url: &str) -> Result<T, HttpError> {
        let resp = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(transport_error)?;
        let status = resp.status();

        if status.is_success() {
            return resp.json::<T>().await.map_err(transport_error);
        }

        let retry_after_ms = resp
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(|secs| secs * 1000);
        let body_text = resp.text().await.unwrap_or_default();

        Err(status_error(status.as_u16(), body_text, retry_after_ms))
    }
}

/// Run `attempt` until it succeeds, fails with a non-retryable error, or the
/// retry budget is spent.
pub(crate) async fn with_retry<T, F, Fut>(
    config: &RetryConfig,
    url: &str,
    mut attempt: F,
) -> Result<T, HttpError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, HttpError>>,
{
    let mut last_error = None;

    for n in 0..=config.max_retries {
        match attempt().await {
            Ok(resp) => return Ok(resp),
            Err(e) if !config.is_retryable(&e) => return Err(e),
            Err(e) => {
                if n < config.max_retries {
                    let delay = config.retry_delay(&e, n);
                    tracing::debug!(
                        attempt = n + 1,
                        max = config.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying request to {}",
                        url
                    );
                    futures_timer::Delay::new(delay).await;
                }
                last_error = Some(e);
            }
        }
    }

    Err(HttpError::MaxRetriesExceeded {
        attempts: config.max_retries + 1,
        last_error: last_error
            .map(|e| e.to_string())
            .unwrap_or_else(|| "unknown".to_string()),
    })
}

/// Classify a failed send. Anything that never produced a response is `NoResponse`.
fn transport_error(e: reqwest::Error) -> HttpError {
    if e.is_timeout() {
        HttpError::Timeout
    } else if e.is_connect() || e.is_request() {
        HttpError::NoResponse(e.to_string())
    } else {
        HttpError::Reqwest(e)
    }
}

/// Map a non-2xx status and its body to an [`HttpError`].
pub(crate) fn status_error(status: u16, body: String, retry_after_ms: Option<u64>) -> HttpError {
    match status {
        403 => HttpError::Forbidden(body),
        404 => HttpError::NotFound(body),
        429 => HttpError::RateLimited { retry_after_ms },
        400..=499 => HttpError::BadRequest {
            status,
            detail: error_detail(&body),
        },
        _ => HttpError::ServerError { status, body },
    }
}
