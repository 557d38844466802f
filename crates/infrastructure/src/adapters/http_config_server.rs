//! HTTP config server adapter
//!
//! Implements the `ConfigServerClient` port over the store's HTTP API:
//! `GET /{identity}` for the current value, `POST /{identity}/generate`
//! to create one. Transport failures are retried with bounded backoff;
//! semantic rejections (400, unknown type) propagate immediately.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use manifold_application::ports::{ConfigServerClient, ConfigServerError};
use manifold_domain::{VariableIdentity, VariableType};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

/// Retry policy for transport failures. Semantic rejections are never
/// retried.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles per attempt.
    pub initial_delay: Duration,
    /// Ceiling for the backoff delay.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(5),
        }
    }
}

/// Connection settings for the config server.
#[derive(Debug, Clone)]
pub struct ConfigServerConfig {
    /// Base URL of the store; identities are appended as paths.
    pub base_url: Url,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Transport retry policy.
    pub retry: RetryPolicy,
}

impl ConfigServerConfig {
    /// Creates a configuration with a 30 second timeout and the default
    /// retry policy.
    #[must_use]
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    #[serde(rename = "type")]
    var_type: &'a str,
    parameters: serde_json::Value,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// reqwest-backed implementation of the `ConfigServerClient` port.
pub struct HttpConfigServer {
    client: Client,
    config: ConfigServerConfig,
}

impl HttpConfigServer {
    /// Creates the adapter.
    ///
    /// # Errors
    ///
    /// Returns a transport error if the underlying client cannot be built.
    pub fn new(config: ConfigServerConfig) -> Result<Self, ConfigServerError> {
        let client = Client::builder()
            .user_agent("Manifold/0.1.0")
            .timeout(config.timeout)
            .build()
            .map_err(|e| ConfigServerError::Transport {
                message: e.to_string(),
            })?;

        Ok(Self { client, config })
    }

    /// Creates the adapter around an existing reqwest client.
    #[must_use]
    pub const fn with_client(client: Client, config: ConfigServerConfig) -> Self {
        Self { client, config }
    }

    fn value_url(&self, identity: &VariableIdentity) -> Result<Url, ConfigServerError> {
        identity_url(&self.config.base_url, identity, "")
    }

    fn generate_url(&self, identity: &VariableIdentity) -> Result<Url, ConfigServerError> {
        identity_url(&self.config.base_url, identity, "/generate")
    }
}

/// Appends the canonical identity (which always starts with `/`) and a
/// suffix to the store's base URL.
fn identity_url(
    base: &Url,
    identity: &VariableIdentity,
    suffix: &str,
) -> Result<Url, ConfigServerError> {
    let joined = format!(
        "{}{}{suffix}",
        base.as_str().trim_end_matches('/'),
        identity.as_str()
    );
    Url::parse(&joined).map_err(|e| ConfigServerError::InvalidResponse {
        message: format!("invalid request URL for '{identity}': {e}"),
    })
}

fn map_transport(err: &reqwest::Error) -> ConfigServerError {
    ConfigServerError::Transport {
        message: err.to_string(),
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| status.as_u16().to_string(), ToOwned::to_owned)
}

async fn parse_value(response: reqwest::Response) -> Result<serde_yaml::Value, ConfigServerError> {
    let body: serde_json::Value =
        response
            .json()
            .await
            .map_err(|e| ConfigServerError::InvalidResponse {
                message: format!("failed to parse store response: {e}"),
            })?;
    serde_yaml::to_value(body).map_err(|e| ConfigServerError::InvalidResponse {
        message: format!("failed to convert store response: {e}"),
    })
}

/// Runs `operation` until it succeeds, fails semantically, or exhausts
/// the transport retry budget.
async fn with_retry<F, Fut, T>(policy: &RetryPolicy, mut operation: F) -> Result<T, ConfigServerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ConfigServerError>>,
{
    let mut delay = policy.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err @ ConfigServerError::Transport { .. }) if attempt < policy.max_attempts => {
                warn!(attempt, max_attempts = policy.max_attempts, error = %err,
                    "config server request failed, retrying");
                tokio::time::sleep(delay).await;
                delay = (delay * 2).min(policy.max_delay);
            }
            Err(err) => return Err(err),
        }
    }
}

#[async_trait]
impl ConfigServerClient for HttpConfigServer {
    async fn get_value(
        &self,
        identity: &VariableIdentity,
    ) -> Result<Option<serde_yaml::Value>, ConfigServerError> {
        let url = self.value_url(identity)?;

        with_retry(&self.config.retry, || {
            let client = self.client.clone();
            let url = url.clone();
            async move {
                let response = client.get(url).send().await.map_err(|e| map_transport(&e))?;
                match response.status() {
                    StatusCode::OK => Ok(Some(parse_value(response).await?)),
                    StatusCode::NOT_FOUND => Ok(None),
                    status => Err(ConfigServerError::Rejected {
                        status: status_text(status),
                    }),
                }
            }
        })
        .await
    }

    async fn generate_value(
        &self,
        identity: &VariableIdentity,
        var_type: &VariableType,
        options: &serde_yaml::Value,
    ) -> Result<serde_yaml::Value, ConfigServerError> {
        let url = self.generate_url(identity)?;
        let parameters =
            serde_json::to_value(options).map_err(|e| ConfigServerError::InvalidResponse {
                message: format!("options for '{identity}' are not JSON-representable: {e}"),
            })?;
        let body = serde_json::to_value(GenerateRequest {
            var_type: var_type.as_str(),
            parameters,
        })
        .map_err(|e| ConfigServerError::InvalidResponse {
            message: e.to_string(),
        })?;

        debug!(%identity, var_type = %var_type, "requesting generation");

        with_retry(&self.config.retry, || {
            let client = self.client.clone();
            let url = url.clone();
            let body = body.clone();
            async move {
                let response = client
                    .post(url)
                    .json(&body)
                    .send()
                    .await
                    .map_err(|e| map_transport(&e))?;

                let status = response.status();
                if status == StatusCode::OK {
                    return parse_value(response).await;
                }

                // The 400 body carries `{error: message}`; keep it out of
                // the returned status, which is the canonical reason the
                // resolution error format expects.
                if let Ok(ErrorBody { error }) = response.json::<ErrorBody>().await {
                    debug!(store_error = %error, "store rejected generation");
                }
                Err(ConfigServerError::Rejected {
                    status: status_text(status),
                })
            }
        })
        .await
    }
}
