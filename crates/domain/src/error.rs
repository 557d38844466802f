//! Domain error types

use thiserror::Error;

use crate::variables::ScanError;

/// Domain-level errors raised while parsing manifests or scanning
/// placeholders. All of these are local schema errors: they are detected
/// before any config server call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The manifest text is not valid YAML.
    #[error("invalid manifest YAML: {0}")]
    InvalidYaml(String),

    /// The manifest tree could not be rendered back to YAML.
    #[error("failed to render manifest YAML: {0}")]
    RenderFailed(String),

    /// A string field contains a malformed `((` reference.
    #[error("malformed variable reference in '{field}': {reason}")]
    MalformedReference {
        /// Path to the offending string field.
        field: String,
        /// What the scanner rejected.
        reason: ScanError,
    },

    /// The `variables` section has an invalid shape.
    #[error("invalid variables section: {0}")]
    InvalidVariablesSection(String),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
