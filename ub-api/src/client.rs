//! HTTP client for the Ubicasure backend REST API.
//!
//! Handles base URL resolution, custom headers, optional timeouts and the
//! mapping of transport and status failures onto `UbError`.

use std::borrow::Cow;
use std::time::Duration;

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;

use ub_core::config::{AppConfig, ServerConfig};
use ub_core::error::{UbError, UbResult};

use crate::response::ErrorBody;

/// HTTP client for communicating with the backend.
///
/// Cheap to clone; all clones share one connection pool.
#[derive(Clone)]
pub struct ApiClient {
    inner: Client,
    /// Base URL without trailing slash (e.g. "https://host.run.app").
    base_url: String,
    /// Headers added to every request.
    custom_headers: Vec<(String, String)>,
}

impl ApiClient {
    /// Create a new ApiClient from server configuration.
    ///
    /// Without `api_timeout_ms` the reqwest defaults apply.
    pub fn new(config: &ServerConfig) -> UbResult<Self> {
        let base_url = AppConfig::sanitize_base_url(&config.base_url);
        if base_url.is_empty() {
            return Err(UbError::MissingConfig("server.base_url".into()));
        }

        let mut builder = Client::builder();
        if let Some(ms) = config.api_timeout_ms {
            builder = builder.timeout(Duration::from_millis(ms));
        }

        let inner = builder
            .build()
            .map_err(|e| UbError::Http(format!("failed to build HTTP client: {e}")))?;

        let mut custom_headers: Vec<(String, String)> = config
            .custom_headers
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        custom_headers.sort();

        Ok(Self {
            inner,
            base_url,
            custom_headers,
        })
    }

    /// Get the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Percent-encode a value for use as a single path segment.
    pub fn segment(value: &str) -> Cow<'_, str> {
        urlencoding::encode(value)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn apply_headers(&self, mut builder: RequestBuilder) -> RequestBuilder {
        for (key, value) in &self.custom_headers {
            builder = builder.header(key.as_str(), value.as_str());
        }
        builder
    }

    /// Send a request and return the response whatever its status.
    ///
    /// Only transport failures are errors here. Endpoints that give meaning to
    /// specific statuses (existence checks, conflicts) start from this.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> UbResult<Response> {
        debug!("{} {}", method, path);

        let mut builder = self.inner.request(method, self.url(path));
        if let Some(b) = body {
            builder = builder.json(b);
        }
        self.apply_headers(builder)
            .send()
            .await
            .map_err(Self::classify_error)
    }

    // --- Public HTTP methods ---

    /// Execute a GET request; non-success statuses become errors.
    pub async fn get(&self, path: &str) -> UbResult<Response> {
        let resp = self.send(Method::GET, path, None).await?;
        Self::check_status(path, resp).await
    }

    /// Execute a POST request with a JSON body.
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> UbResult<Response> {
        let resp = self.send(Method::POST, path, Some(body)).await?;
        Self::check_status(path, resp).await
    }

    /// Execute a DELETE request.
    pub async fn delete(&self, path: &str) -> UbResult<Response> {
        let resp = self.send(Method::DELETE, path, None).await?;
        Self::check_status(path, resp).await
    }

    /// Execute a POST request with a multipart form.
    pub async fn post_multipart(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
    ) -> UbResult<Response> {
        debug!("POST (multipart) {}", path);

        let builder = self.inner.post(self.url(path)).multipart(form);
        let response = self
            .apply_headers(builder)
            .send()
            .await
            .map_err(Self::classify_error)?;

        Self::check_status(path, response).await
    }

    // --- Response helpers ---

    /// Deserialize a response body.
    pub async fn parse_json<T: DeserializeOwned>(response: Response) -> UbResult<T> {
        response
            .json::<T>()
            .await
            .map_err(|e| UbError::Serialization(format!("failed to parse response: {e}")))
    }

    /// Convenience: GET + parse.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> UbResult<T> {
        let resp = self.get(path).await?;
        Self::parse_json(resp).await
    }

    /// Convenience: POST + parse.
    pub async fn post_json<T: DeserializeOwned>(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> UbResult<T> {
        let resp = self.post(path, body).await?;
        Self::parse_json(resp).await
    }

    /// Convenience: DELETE + parse.
    pub async fn delete_json<T: DeserializeOwned>(&self, path: &str) -> UbResult<T> {
        let resp = self.delete(path).await?;
        Self::parse_json(resp).await
    }

    /// Convert a non-success status into an error, keeping the body text.
    pub(crate) async fn check_status(path: &str, response: Response) -> UbResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == StatusCode::NOT_FOUND {
            return Err(UbError::NotFound(path.to_string()));
        }

        let body = response.text().await.unwrap_or_default();
        Err(UbError::ServerError {
            status: status.as_u16(),
            message: ErrorBody::describe(&body),
        })
    }

    /// Classify a reqwest error into a UbError variant.
    pub(crate) fn classify_error(e: reqwest::Error) -> UbError {
        if e.is_timeout() {
            UbError::Timeout(e.to_string())
        } else if e.is_connect() {
            UbError::Http(format!("connection failed: {e}"))
        } else {
            UbError::Http(e.to_string())
        }
    }
}
