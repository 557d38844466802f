//! Resolution error taxonomy
//!
//! Every variant is fatal: the pass aborts atomically and nothing partial
//! is handed downstream. Errors carry identities and type names, never
//! resolved secret values.

use manifold_domain::{DomainError, VariableIdentity};
use thiserror::Error;

/// Errors that abort a resolution pass.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    /// Manifest-shape error: malformed variables section or malformed
    /// placeholder. Detected before any config server call.
    #[error(transparent)]
    Schema(#[from] DomainError),

    /// The same identity was declared with incompatible types by multiple
    /// consumers and no catalog entry disambiguates.
    #[error("conflicting types for variable '{identity}': declared as {}", .conflicting.join(" and "))]
    TypeConflict {
        /// Identity the conflict is about.
        identity: VariableIdentity,
        /// The conflicting type names, sorted.
        conflicting: Vec<String>,
    },

    /// The store rejected a generate request. The status text is the
    /// store's, verbatim.
    #[error("Config Server failed to generate value for '{identity}' with type '{var_type}'. Error: '{status}'")]
    GenerationFailed {
        /// Identity the generate request was for.
        identity: VariableIdentity,
        /// Requested type, as sent to the store.
        var_type: String,
        /// Store status text, e.g. `Bad Request`.
        status: String,
    },

    /// An untyped reference (no catalog entry, no typed consumer) was
    /// absent from the store. There is no type to generate with.
    #[error("variable '{identity}' has no declared type and no value exists in the config server")]
    MissingValue {
        /// The absent identity.
        identity: VariableIdentity,
    },

    /// The store rejected a fetch, or answered with an unparseable body.
    #[error("config server request failed for '{identity}': {status}")]
    StoreRejected {
        /// Identity the request was for.
        identity: VariableIdentity,
        /// Store status text or parse failure description.
        status: String,
    },

    /// Transport retries were exhausted for one identity.
    #[error("config server unreachable while resolving '{identity}': {message}")]
    Transport {
        /// Identity being resolved when transport gave out.
        identity: VariableIdentity,
        /// Last transport failure.
        message: String,
    },

    /// A structured value (e.g. a certificate) was referenced inside a
    /// larger string. Structured types are only valid as whole-field
    /// substitutions.
    #[error("variable '{identity}' resolves to a structured value and cannot be spliced into field '{field}'")]
    ShapeMismatch {
        /// Identity of the structured value.
        identity: VariableIdentity,
        /// Field the mid-string reference occurs in.
        field: String,
    },

    /// Invariant breach inside the pass.
    #[error("internal resolution error: {0}")]
    Internal(String),
}

/// Result type alias for resolution operations.
pub type ResolutionResult<T> = Result<T, ResolutionError>;
