//! HTTP client for the dashboard API.

use std::future::Future;
use std::time::Duration;

use reqwest::{Client, Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use fieldops_core::config::ApiConfig;
use fieldops_core::ApiEnvelope;

use crate::error::{ApiError, Result};
use crate::events::{AuthEvent, AuthEventBus};

/// How much of an error body to keep when reporting a non-envelope failure.
const ERROR_BODY_LIMIT: usize = 512;

/// Client for the remote dashboard API.
///
/// Holds no token state of its own: callers pass the current bearer token per
/// request, so the session layer stays the single source of truth.
pub struct ApiClient {
    client: Client,
    base_url: String,
    events: AuthEventBus,
}

impl ApiClient {
    /// Create a client against `base_url` with default timeouts.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeouts(base_url, Duration::from_secs(30), Duration::from_secs(10))
    }

    /// Create a client from the config section.
    pub fn from_config(api: &ApiConfig) -> Result<Self> {
        Self::with_timeouts(
            &api.base_url,
            Duration::from_secs(api.request_timeout_secs),
            Duration::from_secs(api.connect_timeout_secs),
        )
    }

    fn with_timeouts(
        base_url: impl Into<String>,
        request_timeout: Duration,
        connect_timeout: Duration,
    ) -> Result<Self> {
        let base_url = base_url.into();
        if base_url.is_empty() {
            return Err(ApiError::Config("API base URL is required".to_string()));
        }

        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            events: AuthEventBus::new(),
        })
    }

    /// The bus on which downstream 401s are announced.
    pub fn events(&self) -> &AuthEventBus {
        &self.events
    }

    /// The configured base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Generic authenticated GET for the resource screens downstream of auth.
    ///
    /// A 401 here means an established session went stale mid-use, so it is
    /// published on the event bus before the error is returned.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<T> {
        let result = self
            .request_json(Method::GET, path, bearer, None::<&()>)
            .await;
        if matches!(result, Err(ApiError::Unauthorized)) {
            debug!(path, "downstream request rejected, announcing session loss");
            self.events.publish(AuthEvent::SessionRejected);
        }
        result
    }

    /// Issue a request and decode the `{success, data|error}` envelope.
    pub(crate) async fn request_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
        body: Option<&B>,
    ) -> Result<T> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        self.decode_envelope(response).await
    }

    /// Issue a request where only the HTTP status matters (e.g. logout).
    pub(crate) async fn request_ack(
        &self,
        method: Method,
        path: &str,
        bearer: Option<&str>,
    ) -> Result<()> {
        let mut request = self.client.request(method, self.url(path));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::server_error(
                status.as_u16(),
                read_error_body(response).await,
            ));
        }
        Ok(())
    }

    async fn decode_envelope<T: DeserializeOwned>(&self, response: Response) -> Result<T> {
        let status = response.status();

        if status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized);
        }
        if !status.is_success() {
            return Err(ApiError::server_error(
                status.as_u16(),
                read_error_body(response).await,
            ));
        }

        let envelope: ApiEnvelope<T> = response
            .json()
            .await
            .map_err(|e| ApiError::envelope(e.to_string()))?;

        envelope
            .into_result()
            .map_err(|body| ApiError::Api(body.describe()))
    }
}

async fn read_error_body(response: Response) -> String {
    let mut body = response.text().await.unwrap_or_default();
    body.truncate(ERROR_BODY_LIMIT);
    body
}

/// Race `fut` against `limit`, aborting the underlying request on timeout.
///
/// A fired timer is reported as [`ApiError::Timeout`], which callers treat
/// identically to any other transient failure.
pub(crate) async fn with_timeout<T>(
    limit: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(limit)),
    }
}
