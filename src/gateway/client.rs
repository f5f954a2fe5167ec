//! Gateway client: timeout, retry with linear backoff, interceptors
//!
//! One call to [`ApiClient::execute`] is one logical request. Each attempt is
//! bounded by the configured timeout; transport failures and 5xx responses
//! are retried with a delay of `base_delay * attempt`, everything else is
//! returned to the caller as-is.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use super::error::ApiError;
use super::interceptor::{default_headers, bearer_token, InterceptorChain};
use super::request::{ApiRequest, ApiResponse, Payload};
use crate::config::Config;

/// User agent sent with every request
const USER_AGENT: &str = concat!("fplhelp/", env!("CARGO_PKG_VERSION"));

/// Retry settings for transient failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per logical request (values below 1 act as 1)
    pub attempts: u32,
    /// Delay unit; the wait before retry `n` is `base_delay * n`
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            base_delay: Duration::from_millis(1000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after the given (1-based) failed attempt
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * attempt
    }

    fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}

/// Client for the backend REST API
///
/// Cheap to clone: the underlying `reqwest::Client` and interceptor lists are
/// reference counted.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    /// Base URL joined with the API prefix, without trailing slash
    root: String,
    /// Whether endpoint URLs end in `/`
    trailing_slash: bool,
    timeout: Duration,
    retry: RetryPolicy,
    interceptors: InterceptorChain,
}

/// Builder for [`ApiClient`]; interceptor lists are fixed once built
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: String,
    api_prefix: String,
    trailing_slash: bool,
    timeout: Duration,
    retry: RetryPolicy,
    interceptors: InterceptorChain,
    http: Option<Client>,
}

impl ApiClientBuilder {
    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = prefix.into();
        self
    }

    /// Appends `/` to every endpoint path (off by default)
    pub fn trailing_slash(mut self, enabled: bool) -> Self {
        self.trailing_slash = enabled;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Uses a preconfigured HTTP client (proxies, TLS settings)
    pub fn http_client(mut self, client: Client) -> Self {
        self.http = Some(client);
        self
    }

    /// Appends a request interceptor; interceptors run in the order added
    pub fn request_interceptor<F>(mut self, interceptor: F) -> Self
    where
        F: Fn(ApiRequest) -> ApiRequest + Send + Sync + 'static,
    {
        self.interceptors.push_request(std::sync::Arc::new(interceptor));
        self
    }

    /// Appends a response interceptor; interceptors run in the order added
    pub fn response_interceptor<F>(mut self, interceptor: F) -> Self
    where
        F: Fn(ApiResponse) -> ApiResponse + Send + Sync + 'static,
    {
        self.interceptors.push_response(std::sync::Arc::new(interceptor));
        self
    }

    pub fn build(self) -> ApiClient {
        ApiClient {
            http: self.http.unwrap_or_default(),
            root: join_root(&self.base_url, &self.api_prefix),
            trailing_slash: self.trailing_slash,
            timeout: self.timeout,
            retry: self.retry,
            interceptors: self.interceptors,
        }
    }
}

impl ApiClient {
    /// Starts a builder with default timeout (30s) and retry policy
    pub fn builder(base_url: impl Into<String>) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            api_prefix: String::new(),
            trailing_slash: false,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            interceptors: InterceptorChain::new(),
            http: None,
        }
    }

    /// Creates a client from application configuration
    ///
    /// Installs the default header interceptor and, when a token is
    /// configured, the bearer token interceptor.
    pub fn from_config(config: &Config) -> Self {
        let mut builder = Self::builder(config.base_url.clone())
            .api_prefix(config.api_prefix.clone())
            .trailing_slash(config.trailing_slash)
            .timeout(config.timeout)
            .retry(RetryPolicy {
                attempts: config.retry_attempts,
                base_delay: config.retry_base_delay,
            });

        builder.interceptors.push_request(default_headers(USER_AGENT));
        if let Some(token) = &config.api_token {
            builder.interceptors.push_request(bearer_token(token));
        }

        builder.build()
    }

    /// Full URL for a relative API path
    ///
    /// Slashes around `path` are normalized; the URL ends in `/` only when
    /// the client was built with a trailing slash.
    pub fn url_for(&self, path: &str) -> String {
        let path = path.trim_matches('/');
        if self.trailing_slash {
            format!("{}/{}/", self.root, path)
        } else {
            format!("{}/{}", self.root, path)
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// Performs one logical request
    ///
    /// # Returns
    /// * `Ok(ApiResponse)` for a 2xx final status
    /// * `Err(ApiError::Timeout)` as soon as one attempt exceeds the timeout
    /// * `Err(ApiError::Client)` for a 4xx, on the first attempt
    /// * `Err(ApiError::Server)` / `Err(ApiError::Transport)` once retries are exhausted
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let request = self.interceptors.apply_request(request);
        let url = self.url_for(&request.path);

        // Serialize once; every attempt sends the same bytes
        let body = match &request.body {
            Some(value) => Some(
                serde_json::to_vec(value)
                    .map_err(|e| ApiError::InvalidRequest(format!("Unserializable body: {}", e)))?,
            ),
            None => None,
        };

        let max_attempts = self.retry.max_attempts();
        let mut attempt = 1;

        loop {
            let started = Instant::now();
            let outcome = self.attempt(&request, &url, body.as_deref()).await;
            let elapsed_ms = started.elapsed().as_millis() as u64;

            let failure = match outcome {
                Ok(response) => {
                    let response = self.interceptors.apply_response(response);
                    debug!(
                        method = request.method.as_str(),
                        %url,
                        attempt,
                        status = response.status,
                        elapsed_ms,
                        "api response"
                    );
                    if response.is_success() {
                        return Ok(response);
                    }
                    ApiError::from_response(response)
                }
                Err(err) => err,
            };

            if !failure.is_retryable() {
                warn!(method = request.method.as_str(), %url, error = %failure, "api request failed");
                return Err(failure);
            }

            if attempt >= max_attempts {
                error!(
                    method = request.method.as_str(),
                    %url,
                    attempts = attempt,
                    error = %failure,
                    "api request failed after all retries"
                );
                return Err(failure);
            }

            let delay = self.retry.delay_for(attempt);
            warn!(
                method = request.method.as_str(),
                %url,
                attempt,
                max_attempts,
                delay_ms = delay.as_millis() as u64,
                error = %failure,
                "api request failed, retrying"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }

    /// Performs a request and decodes the JSON body into `T`
    pub async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        let path = request.path.clone();
        let response = self.execute(request).await?;
        decode(&path, response.body)
    }

    /// One attempt, bounded by the timeout
    async fn attempt(
        &self,
        request: &ApiRequest,
        url: &str,
        body: Option<&[u8]>,
    ) -> Result<ApiResponse, ApiError> {
        let mut builder = self.http.request(request.method.into(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            builder = builder
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_vec());
        }

        let exchange = async {
            let response = builder.send().await?;
            let status = response.status().as_u16();
            let headers: BTreeMap<String, String> = response
                .headers()
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|value| (name.as_str().to_string(), value.to_string()))
                })
                .collect();
            let bytes = response.bytes().await?;
            let content_type = headers.get("content-type").map(String::as_str);
            let body = Payload::from_bytes(content_type, &bytes);
            Ok::<_, reqwest::Error>(ApiResponse {
                status,
                headers,
                body,
            })
        };

        match tokio::time::timeout(self.timeout, exchange).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => Err(ApiError::from_reqwest(url, err)),
            Err(_) => Err(ApiError::Timeout {
                url: url.to_string(),
                timeout: self.timeout,
            }),
        }
    }
}

/// Decodes a payload into a typed schema, failing fast on mismatch
pub fn decode<T: DeserializeOwned>(path: &str, payload: Payload) -> Result<T, ApiError> {
    let value = match payload {
        Payload::Json(value) => value,
        Payload::Empty => serde_json::Value::Null,
        Payload::Text(text) => {
            return Err(ApiError::Decode {
                path: path.to_string(),
                message: format!("expected JSON, got text: {}", text.chars().take(80).collect::<String>()),
            })
        }
    };
    serde_json::from_value(value).map_err(|e| ApiError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}

fn join_root(base_url: &str, prefix: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        base.to_string()
    } else {
        format!("{}/{}", base, prefix)
    }
}
