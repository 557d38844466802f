//! Config server client port
//!
//! Request/response contract against the external secret store. The store
//! owns generation (passwords, certificates, key pairs); this side only
//! transports requests and parses responses.

use async_trait::async_trait;
use manifold_domain::{VariableIdentity, VariableType};
use serde_yaml::Value;

/// Errors reported by config server adapters.
///
/// Transport failures and semantic rejections are distinct on purpose:
/// adapters retry the former with bounded backoff, the latter propagate
/// immediately. Neither carries secret material.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum ConfigServerError {
    /// Network-level failure: connect error, timeout, broken transfer.
    #[error("transport failure: {message}")]
    Transport {
        /// Failure description.
        message: String,
    },

    /// The store rejected the request. Carries the response status text
    /// only (e.g. `Bad Request`).
    #[error("rejected by config server: {status}")]
    Rejected {
        /// Store status text.
        status: String,
    },

    /// The store answered with a body the adapter could not parse.
    #[error("unexpected config server response: {message}")]
    InvalidResponse {
        /// Parse failure description.
        message: String,
    },
}

/// Client for the external config server.
///
/// Within one resolution pass the caller guarantees at most one
/// generate call per identity; implementations do not need their own
/// deduplication.
#[async_trait]
pub trait ConfigServerClient: Send + Sync {
    /// Fetches the current value for `identity`. `Ok(None)` means the
    /// store holds no value for it.
    async fn get_value(
        &self,
        identity: &VariableIdentity,
    ) -> Result<Option<Value>, ConfigServerError>;

    /// Asks the store to generate a value for `identity` using `var_type`
    /// and `options`. For `certificate`, options carry `common_name` and
    /// `alternative_names`; the store embeds them into the issued
    /// certificate.
    async fn generate_value(
        &self,
        identity: &VariableIdentity,
        var_type: &VariableType,
        options: &Value,
    ) -> Result<Value, ConfigServerError>;
}
