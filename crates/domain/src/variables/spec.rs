//! Variable types, reconciled specs and resolved values

use std::collections::BTreeMap;
use std::fmt;

use serde_yaml::Value;

use super::identity::VariableIdentity;

/// Variable type understood by the config server.
///
/// `Other` carries unrecognized type strings verbatim: the store is the
/// authority that rejects them, not this component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VariableType {
    /// Generated password.
    Password,
    /// Generated certificate with common name and alternative names.
    Certificate,
    /// Generated SSH key pair.
    Ssh,
    /// Generated RSA key pair.
    Rsa,
    /// Plain opaque value.
    Value,
    /// Any other type string, passed to the store unchanged.
    Other(String),
}

impl VariableType {
    /// Parses a declared type string.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw {
            "password" => Self::Password,
            "certificate" => Self::Certificate,
            "ssh" => Self::Ssh,
            "rsa" => Self::Rsa,
            "value" => Self::Value,
            other => Self::Other(other.to_owned()),
        }
    }

    /// The wire form of the type, as sent to the store.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Password => "password",
            Self::Certificate => "certificate",
            Self::Ssh => "ssh",
            Self::Rsa => "rsa",
            Self::Value => "value",
            Self::Other(raw) => raw,
        }
    }
}

impl fmt::Display for VariableType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One authoritative `{identity, type, options}` per identity, produced by
/// reconciliation.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableSpec {
    /// Canonical store key.
    pub identity: VariableIdentity,

    /// Type used for generation. `None` marks an untyped reference: it must
    /// already exist in the store, there is no type to generate with.
    pub var_type: Option<VariableType>,

    /// Generation options, passed to the store opaquely. `Null` when absent.
    pub options: Value,
}

impl VariableSpec {
    /// Creates a typed spec.
    #[must_use]
    pub const fn typed(identity: VariableIdentity, var_type: VariableType, options: Value) -> Self {
        Self {
            identity,
            var_type: Some(var_type),
            options,
        }
    }

    /// Creates an untyped, fetch-only spec.
    #[must_use]
    pub const fn untyped(identity: VariableIdentity) -> Self {
        Self {
            identity,
            var_type: None,
            options: Value::Null,
        }
    }
}

/// A value obtained from the store: a scalar (password) or a structured
/// object (certificate `{certificate, private_key, ca}`). Never mutated
/// after creation within a resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedValue {
    /// Canonical store key this value belongs to.
    pub identity: VariableIdentity,

    /// The value itself.
    pub value: Value,
}

/// Mapping identity → resolved value, built once per resolution pass and
/// discarded with it. Never persisted in plaintext.
pub type SubstitutionMap = BTreeMap<VariableIdentity, ResolvedValue>;

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_parse_known_types() {
        assert_eq!(VariableType::parse("password"), VariableType::Password);
        assert_eq!(VariableType::parse("certificate"), VariableType::Certificate);
        assert_eq!(VariableType::parse("ssh"), VariableType::Ssh);
        assert_eq!(VariableType::parse("rsa"), VariableType::Rsa);
        assert_eq!(VariableType::parse("value"), VariableType::Value);
    }

    #[test]
    fn test_unknown_type_survives_round_trip() {
        let parsed = VariableType::parse("incorrect");
        assert_eq!(parsed, VariableType::Other("incorrect".to_owned()));
        assert_eq!(parsed.as_str(), "incorrect");
        assert_eq!(parsed.to_string(), "incorrect");
    }

    #[test]
    fn test_untyped_spec_has_no_options() {
        let spec = VariableSpec::untyped(VariableIdentity::from_canonical("/x"));
        assert_eq!(spec.var_type, None);
        assert_eq!(spec.options, Value::Null);
    }
}
