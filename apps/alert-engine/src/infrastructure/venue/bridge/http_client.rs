//! HTTP client wrapper with retry logic.
//!
//! Only read-only calls are retried. A trade request that may have reached
//! the terminal is sent exactly once.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use reqwest::{Client, Method, StatusCode, Url};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::api_types::{BridgeErrorResponse, LoginRequest, LoginResponse};
use super::config::{BridgeConfig, RetryConfig};
use super::error::BridgeError;

/// HTTP client for the terminal bridge.
#[derive(Debug, Clone)]
pub struct BridgeHttpClient {
    client: Client,
    base_url: Url,
    retry_config: RetryConfig,
    token: Arc<RwLock<Option<String>>>,
}

impl BridgeHttpClient {
    /// Create a new HTTP client from config.
    pub fn new(config: &BridgeConfig) -> Result<Self, BridgeError> {
        let base_url = Url::parse(&config.base_url)
            .map_err(|e| BridgeError::Http(format!("invalid base URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(BridgeError::Http(format!(
                "invalid base URL: {}",
                config.base_url
            )));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BridgeError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            retry_config: config.retry.clone(),
            token: Arc::new(RwLock::new(None)),
        })
    }

    /// Build a URL from path segments, percent-encoding each one.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// Log in and keep the session token for later calls.
    pub async fn login(&self, request: &LoginRequest) -> Result<(), BridgeError> {
        let response: LoginResponse = self
            .send(Method::POST, self.url(&["session", "login"]), Some(request), false)
            .await?;
        *self.token.write() = Some(response.token);
        Ok(())
    }

    /// Log out and drop the session token.
    pub async fn logout(&self) -> Result<(), BridgeError> {
        let result: Result<serde_json::Value, BridgeError> = self
            .send(Method::POST, self.url(&["session", "logout"]), None::<&()>, false)
            .await;
        self.token.write().take();
        result.map(|_| ())
    }

    /// Whether a session token is held.
    pub fn has_session(&self) -> bool {
        self.token.read().is_some()
    }

    /// GET with retries.
    pub async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, BridgeError> {
        self.send(Method::GET, url, None::<&()>, true).await
    }

    /// GET with retries, mapping 404 to `None`.
    pub async fn get_optional<T: DeserializeOwned>(
        &self,
        url: Url,
    ) -> Result<Option<T>, BridgeError> {
        match self.get(url).await {
            Ok(value) => Ok(Some(value)),
            Err(BridgeError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// POST without retries.
    #[allow(clippy::future_not_send)]
    pub async fn post<T: DeserializeOwned, B: Serialize>(
        &self,
        url: Url,
        body: Option<&B>,
    ) -> Result<T, BridgeError> {
        self.send(Method::POST, url, body, false).await
    }

    /// Internal request implementation with retry logic.
    #[allow(clippy::future_not_send)]
    async fn send<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: Url,
        body: Option<&B>,
        retry: bool,
    ) -> Result<T, BridgeError> {
        let mut backoff = ExponentialBackoff::new(&self.retry_config);

        loop {
            let mut request = self.client.request(method.clone(), url.clone());
            let token = self.token.read().clone();
            if let Some(token) = token {
                request = request.bearer_auth(token);
            }
            if let Some(b) = body {
                request = request.json(b);
            }

            let response = match request.send().await {
                Ok(resp) => resp,
                Err(e) if retry => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            error = %e,
                            path = url.path(),
                            delay_ms = delay.as_millis(),
                            attempt = backoff.attempt,
                            "Bridge unreachable, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(BridgeError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
                Err(e) => return Err(BridgeError::Network(e.to_string())),
            };

            let status = response.status();

            if status.is_success() {
                let text = response
                    .text()
                    .await
                    .map_err(|e| BridgeError::Network(e.to_string()))?;
                let text = if text.is_empty() { "null" } else { text.as_str() };
                return serde_json::from_str(text)
                    .map_err(|e| BridgeError::JsonParse(e.to_string()));
            }

            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());

            let error_body = response.text().await.unwrap_or_default();

            let (error_code, error_message) =
                match serde_json::from_str::<BridgeErrorResponse>(&error_body) {
                    Ok(err) => (
                        err.code.unwrap_or_else(|| status.as_u16().to_string()),
                        err.message,
                    ),
                    Err(_) => (status.as_u16().to_string(), error_body),
                };

            match categorize_status(status) {
                ErrorCategory::RateLimited if retry => {
                    let delay = backoff
                        .next_backoff()
                        .map(|d| retry_after.map_or(d, Duration::from_secs));
                    if let Some(delay) = delay {
                        tracing::warn!(
                            code = %error_code,
                            delay_ms = delay.as_millis(),
                            "Rate limited, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(BridgeError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable if retry => {
                    if let Some(delay) = backoff.next_backoff() {
                        tracing::warn!(
                            code = %error_code,
                            message = %error_message,
                            delay_ms = delay.as_millis(),
                            "Retryable error, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(BridgeError::MaxRetriesExceeded {
                        attempts: backoff.attempt,
                    });
                }
                ErrorCategory::RateLimited => {
                    return Err(BridgeError::RateLimited {
                        retry_after_secs: retry_after.unwrap_or(60),
                    });
                }
                ErrorCategory::Retryable | ErrorCategory::NonRetryable => {
                    return match status {
                        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                            Err(BridgeError::AuthenticationFailed)
                        }
                        StatusCode::NOT_FOUND => Err(BridgeError::NotFound {
                            path: url.path().to_string(),
                        }),
                        _ => Err(BridgeError::Api {
                            code: error_code,
                            message: error_message,
                        }),
                    };
                }
            }
        }
    }
}

/// Error category for determining retry behavior.
enum ErrorCategory {
    RateLimited,
    Retryable,
    NonRetryable,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        429 => ErrorCategory::RateLimited,
        408 | 500 | 502 | 503 | 504 => ErrorCategory::Retryable,
        _ => ErrorCategory::NonRetryable,
    }
}

/// Exponential backoff calculator.
struct ExponentialBackoff {
    attempt: u32,
    max_attempts: u32,
    current_backoff: Duration,
    max_backoff: Duration,
    multiplier: f64,
}

impl ExponentialBackoff {
    const fn new(config: &RetryConfig) -> Self {
        Self {
            attempt: 0,
            max_attempts: config.max_attempts,
            current_backoff: config.initial_backoff,
            max_backoff: config.max_backoff,
            multiplier: config.multiplier,
        }
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        self.attempt += 1;
        if self.attempt >= self.max_attempts {
            return None;
        }

        let backoff = self.current_backoff;
        self.current_backoff = Duration::from_secs_f64(
            (self.current_backoff.as_secs_f64() * self.multiplier)
                .min(self.max_backoff.as_secs_f64()),
        );

        Some(backoff)
    }
}
