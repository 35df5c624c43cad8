//! # HTTP Retrieval Utilities
//!
//! This module provides a robust, asynchronous API client wrapper around `reqwest`.
//! It includes middleware support for exponential backoff retries, a per-request
//! timeout, and standardized response handling for both JSON and text bodies.

use std::time::Duration;

use reqwest::{header::HeaderMap, Method, Url};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware, RequestBuilder};
use reqwest_retry::{RetryTransientMiddleware, policies::ExponentialBackoff};
use serde::{de::DeserializeOwned, Serialize};

/// A standardized container for API responses.
///
/// This struct wraps the deserialized data along with metadata about the
/// HTTP transaction, such as status codes and headers.
#[derive(Debug)]
pub struct ApiResponse<T> {
    /// The successfully deserialized response body, if any.
    pub data: Option<T>,
    /// The raw error body returned by the server if the request failed.
    pub error_body: Option<String>,
    /// The numeric HTTP status code.
    pub status: u16,
    /// Indicates if the status code was in the 2xx range.
    pub success: bool,
    /// The headers returned by the server.
    pub headers: HeaderMap,
}

/// # Client Options
///
/// Transport settings shared by every request of one `ApiClient`.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Upper bound for a single attempt, connection included.
    pub timeout: Duration,
    /// Sent as the `User-Agent` header.
    pub user_agent: String,
    /// Retries for transient failures (connect errors, 5xx, 429).
    pub max_retries: u32,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: "Mozilla/5.0".to_string(),
            max_retries: 3,
        }
    }
}

/// A flexible asynchronous HTTP client.
///
/// Built on top of `reqwest_middleware`, it handles base URLs, caller
/// headers and automatic retries.
pub struct ApiClient {
    /// The underlying middleware-enabled client.
    inner: ClientWithMiddleware,
    /// The base URL to which all relative paths are joined.
    base_url: Url,
}

impl ApiClient {
    /// Creates a new `ApiClient` with explicit transport settings.
    ///
    /// # Arguments
    /// * `base_url` - The absolute base URL for the API (e.g., "https://api.example.com/v1/").
    /// * `options` - Timeout, user agent and retry budget.
    ///
    /// # Errors
    /// Fails if `base_url` is not a valid absolute URL or the TLS backend
    /// cannot be initialized.
    pub fn with_options(base_url: &str, options: ClientOptions) -> anyhow::Result<Self> {
        let url = Url::parse(base_url)?;

        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(options.max_retries);

        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()?;

        let client = ClientBuilder::new(http)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self {
            inner: client,
            base_url: url,
        })
    }

    /// Joins `path` and attaches the caller's headers.
    fn prepare(&self, method: Method, path: &str, headers: Option<HeaderMap>) -> anyhow::Result<RequestBuilder> {
        let full_url = self.base_url.join(path)?;
        let mut req = self.inner.request(method, full_url);

        if let Some(h) = headers {
            req = req.headers(h);
        }

        Ok(req)
    }

    /// Performs a generic HTTP request and deserializes a JSON response.
    ///
    /// Non-2xx responses are not errors: they come back with `success: false`
    /// and the raw body in `error_body`.
    ///
    /// # Arguments
    /// * `method` - The HTTP verb (GET, POST, etc.).
    /// * `path` - The relative path to append to the base URL.
    /// * `headers` - Optional additional headers for this specific request.
    /// * `body` - Optional serializable object to send as the JSON body.
    ///
    /// # Errors
    /// Returns an `anyhow::Error` if URL joining, network execution or
    /// deserialization of a 2xx body fails.
    pub async fn request<T, B>(
        &self,
        method: Method,
        path: &str,
        headers: Option<HeaderMap>,
        body: Option<B>,
    ) -> anyhow::Result<ApiResponse<T>>
    where
        T: DeserializeOwned,
        B: Serialize,
    {
        let mut req = self.prepare(method, path, headers)?;

        if let Some(b) = body {
            use reqwest::header::CONTENT_TYPE;
            let json_body = serde_json::to_string(&b)?;
            req = req.header(CONTENT_TYPE, "application/json").body(json_body);
        }

        let response: reqwest::Response = req.send().await?;
        let status = response.status();
        let resp_headers = response.headers().clone();

        if status.is_success() {
            let data = response.json::<T>().await?;
            Ok(ApiResponse {
                data: Some(data),
                error_body: None,
                status: status.as_u16(),
                success: true,
                headers: resp_headers,
            })
        } else {
            // Capture the error body as a string for debugging
            let error_text = response.text().await.ok();
            Ok(ApiResponse {
                data: None,
                error_body: error_text,
                status: status.as_u16(),
                success: false,
                headers: resp_headers,
            })
        }
    }

    /// Performs a request and returns the body as text, for HTML pages.
    ///
    /// # Errors
    /// Returns an `anyhow::Error` if URL joining or network execution fails.
    pub async fn request_text(
        &self,
        method: Method,
        path: &str,
        headers: Option<HeaderMap>,
    ) -> anyhow::Result<ApiResponse<String>> {
        let response: reqwest::Response = self.prepare(method, path, headers)?.send().await?;
        let status = response.status();
        let resp_headers = response.headers().clone();
        let success = status.is_success();
        let text = response.text().await?;

        Ok(ApiResponse {
            data: success.then(|| text.clone()),
            error_body: (!success).then_some(text),
            status: status.as_u16(),
            success,
            headers: resp_headers,
        })
    }
}
