//! The retrying request executor.

use http::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
use http::{HeaderMap, HeaderValue};
use url::Url;

use crate::config::{ClientConfig, ConfigError, ConfigUpdate};
use crate::error::ApiError;
use crate::time::{Sleeper, TokioSleeper};
use crate::transport::{self, HttpClient, HttpRequest};

use super::classify;
use super::{ApiRequest, ApiResponse, RetryPolicy};

/// Sends logical requests with classification and exponential backoff.
///
/// Every call resolves its effective settings once, from its
/// [`RequestOptions`](super::RequestOptions) over the [`ClientConfig`]
/// snapshot, then loops:
///
/// 1. send one attempt with the effective timeout;
/// 2. return the first 2xx response as-is;
/// 3. classify anything else; validation, authentication, authorization
///    and not-found errors are returned immediately;
/// 4. after the last allowed retry, return the classified error;
/// 5. otherwise sleep per the [`RetryPolicy`] and try again.
///
/// # Type Parameters
///
/// - `H`: The HTTP client implementation
/// - `S`: The sleeper for retry delays (defaults to [`TokioSleeper`])
///
/// # Example
///
/// ```
/// use agentflow::config::ClientConfig;
/// use agentflow::executor::RequestExecutor;
/// use agentflow::transport::ReqwestClient;
/// use url::Url;
///
/// let config = ClientConfig::new(Url::parse("https://api.example.com/v1").unwrap()).unwrap();
/// let executor = RequestExecutor::new(ReqwestClient::new(), config);
/// assert_eq!(executor.config().max_retries, 3);
/// ```
#[derive(Debug)]
pub struct RequestExecutor<H, S = TokioSleeper> {
    client: H,
    sleeper: S,
    config: ClientConfig,
    policy: RetryPolicy,
}

impl<H> RequestExecutor<H, TokioSleeper> {
    /// Creates an executor using the tokio timer for retry delays.
    #[must_use]
    pub fn new(client: H, config: ClientConfig) -> Self {
        Self {
            client,
            sleeper: TokioSleeper,
            config,
            policy: RetryPolicy::new(),
        }
    }
}

impl<H, S> RequestExecutor<H, S> {
    /// Sets a custom sleeper for retry delays.
    #[must_use]
    pub fn with_sleeper<S2>(self, sleeper: S2) -> RequestExecutor<H, S2> {
        RequestExecutor {
            client: self.client,
            sleeper,
            config: self.config,
            policy: self.policy,
        }
    }

    /// Replaces the backoff curve.
    ///
    /// The retry count still comes from the config or the per-call options.
    #[must_use]
    pub const fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the current configuration snapshot.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Installs a new configuration snapshot built from `update`.
    ///
    /// Requires exclusive access, so no request can observe a half-applied
    /// change.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the update is invalid; the current
    /// configuration is kept in that case.
    pub fn update_config(&mut self, update: ConfigUpdate) -> Result<&ClientConfig, ConfigError> {
        self.config = self.config.updated(update)?;
        tracing::debug!("Client configuration updated: {}", self.config);
        Ok(&self.config)
    }

    pub(crate) const fn sleeper(&self) -> &S {
        &self.sleeper
    }
}

impl<H: HttpClient, S: Sleeper> RequestExecutor<H, S> {
    /// Executes a logical request with retries.
    ///
    /// # Errors
    ///
    /// Returns the classified [`ApiError`] of the last attempt made.
    pub async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let http_request = self.build_http_request(&request)?;
        let timeout = request.options.timeout.unwrap_or(self.config.timeout);
        let policy = self
            .policy
            .clone()
            .with_max_retries(request.options.retries.unwrap_or(self.config.max_retries));
        let debug = self.config.debug;

        let mut attempt: u32 = 0;
        loop {
            if debug {
                tracing::debug!(
                    method = %request.method,
                    url = %http_request.url,
                    attempt,
                    "Sending request"
                );
            }

            let error = match self.client.request(http_request.clone()).await {
                Ok(response) if response.is_success() => {
                    if debug {
                        tracing::debug!(status = response.status.as_u16(), attempt, "Response received");
                    }
                    return Ok(ApiResponse::from_http(response));
                }
                Ok(response) => {
                    if debug {
                        tracing::debug!(status = response.status.as_u16(), attempt, "Error response received");
                    }
                    classify::error_response(&response)
                }
                Err(e) => classify::transport_failure(e, timeout),
            };

            if !error.is_retryable() {
                if debug {
                    tracing::debug!(kind = %error.kind(), attempt, "Not retrying");
                }
                return Err(error);
            }

            if !policy.should_retry(attempt) {
                tracing::warn!(
                    method = %request.method,
                    path = %request.path,
                    attempts = u64::from(attempt) + 1,
                    "Request failed after exhausting retries: {error}"
                );
                return Err(error);
            }

            let delay = policy.delay_for_retry(attempt);
            if debug {
                tracing::debug!(
                    kind = %error.kind(),
                    attempt,
                    delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
                    "Retrying request"
                );
            }
            self.sleeper.sleep(delay).await;
            attempt += 1;
        }
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::execute`].
    pub async fn get(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::get(path)).await
    }

    /// Sends a POST request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::execute`].
    pub async fn post(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::post(path).with_body(body)).await
    }

    /// Sends a PUT request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::execute`].
    pub async fn put(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::put(path).with_body(body)).await
    }

    /// Sends a PATCH request with a JSON body.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::execute`].
    pub async fn patch(&self, path: &str, body: serde_json::Value) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::patch(path).with_body(body)).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`RequestExecutor::execute`].
    pub async fn delete(&self, path: &str) -> Result<ApiResponse, ApiError> {
        self.execute(ApiRequest::delete(path)).await
    }

    /// Resolves the logical request into the attempt sent on every try.
    fn build_http_request(&self, request: &ApiRequest) -> Result<HttpRequest, ApiError> {
        if request.options.timeout.is_some_and(|t| t.is_zero()) {
            return Err(classify::invalid_request("Request timeout must be greater than 0"));
        }

        let url = self.resolve_url(request)?;
        let mut http_request = HttpRequest::new(request.method.clone(), url);

        let mut headers = self.default_headers()?;
        merge_headers(&mut headers, &self.config.headers);
        merge_headers(&mut headers, &request.options.headers);
        http_request.headers = headers;

        if let Some(body) = &request.body {
            let bytes = serde_json::to_vec(body)
                .map_err(|e| classify::invalid_request(format!("Unserializable request body: {e}")))?;
            http_request = http_request.with_body(bytes);
        }

        let timeout = request.options.timeout.unwrap_or(self.config.timeout);
        Ok(http_request.with_timeout(timeout))
    }

    /// Appends the path to the base URL verbatim; paths start with `/`.
    fn resolve_url(&self, request: &ApiRequest) -> Result<Url, ApiError> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        let raw = format!("{base}{}", request.path);

        let mut url = Url::parse(&raw).map_err(|e| {
            classify::invalid_request(format!("Invalid request path '{}': {e}", request.path))
        })?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    fn default_headers(&self) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(USER_AGENT, HeaderValue::from_static(transport::USER_AGENT));

        if let Some(api_key) = &self.config.api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {api_key}"))
                .map_err(|_| classify::invalid_request("API key is not a valid header value"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

/// Copies `source` into `target`, replacing same-named entries.
fn merge_headers(target: &mut HeaderMap, source: &HeaderMap) {
    for name in source.keys() {
        target.remove(name);
        for value in source.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}
