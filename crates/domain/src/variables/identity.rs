//! Canonical variable identities
//!
//! The identity is the key used against the config server. Absolute names
//! pass through unchanged so a single secret can be shared across
//! deployments; relative names are namespaced so unrelated deployments can
//! use the same short name without colliding.

use std::fmt;

/// Canonical config-server key for a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableIdentity(String);

impl VariableIdentity {
    /// Resolves a raw reference name against the director/deployment
    /// namespace. Names starting with `/` are absolute and pass through
    /// unchanged; any other name becomes `/{director}/{deployment}/{name}`.
    ///
    /// Director and deployment names are explicit parameters of the
    /// resolution pass, never ambient state.
    #[must_use]
    pub fn resolve(raw: &str, director: &str, deployment: &str) -> Self {
        if raw.starts_with('/') {
            Self(raw.to_owned())
        } else {
            Self(format!("/{director}/{deployment}/{raw}"))
        }
    }

    /// Wraps a key that is already canonical.
    #[must_use]
    pub fn from_canonical(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The canonical key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VariableIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
