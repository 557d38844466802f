//! The manifest `variables` section
//!
//! Parses the declared catalog of `{name, type, options}` entries. Shape
//! errors here are local configuration errors and fail the whole pass
//! before any network call is made.

use serde_yaml::Value;

use crate::error::{DomainError, DomainResult};

use super::spec::VariableType;

/// A declared variable: `{name, type, options}`.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDefinition {
    /// Declared name. A leading `/` denotes an absolute identity.
    pub name: String,

    /// Declared type, authoritative over any consumer-declared type.
    pub var_type: VariableType,

    /// Generation options, `Null` when absent.
    pub options: Value,
}

/// The parsed `variables` section of a manifest.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableCatalog {
    definitions: Vec<VariableDefinition>,
}

impl VariableCatalog {
    /// Parses the `variables` section. A missing section yields an empty
    /// catalog; anything other than a sequence of `{name, type}` mappings
    /// is a schema error.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidVariablesSection`] naming the
    /// offending construct.
    pub fn parse(section: Option<&Value>) -> DomainResult<Self> {
        let Some(section) = section else {
            return Ok(Self::default());
        };

        let Value::Sequence(entries) = section else {
            return Err(DomainError::InvalidVariablesSection(format!(
                "expected a list of {{name, type}} objects, got {}",
                kind_of(section)
            )));
        };

        let mut definitions = Vec::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            definitions.push(Self::parse_entry(index, entry)?);
        }

        Ok(Self { definitions })
    }

    fn parse_entry(index: usize, entry: &Value) -> DomainResult<VariableDefinition> {
        let Value::Mapping(mapping) = entry else {
            return Err(DomainError::InvalidVariablesSection(format!(
                "entry {index} must be a {{name, type}} object, got {}",
                kind_of(entry)
            )));
        };

        let name = match mapping.get("name") {
            Some(Value::String(name)) if !name.is_empty() => name.clone(),
            Some(Value::String(_)) => {
                return Err(DomainError::InvalidVariablesSection(format!(
                    "entry {index} has an empty 'name'"
                )));
            }
            Some(other) => {
                return Err(DomainError::InvalidVariablesSection(format!(
                    "entry {index} 'name' must be a string, got {}",
                    kind_of(other)
                )));
            }
            None => {
                return Err(DomainError::InvalidVariablesSection(format!(
                    "entry {index} is missing 'name'"
                )));
            }
        };

        let var_type = match mapping.get("type") {
            Some(Value::String(raw)) => VariableType::parse(raw),
            Some(other) => {
                return Err(DomainError::InvalidVariablesSection(format!(
                    "variable '{name}' 'type' must be a string, got {}",
                    kind_of(other)
                )));
            }
            None => {
                return Err(DomainError::InvalidVariablesSection(format!(
                    "variable '{name}' is missing 'type'"
                )));
            }
        };

        let options = match mapping.get("options") {
            None => Value::Null,
            Some(options @ Value::Mapping(_)) => options.clone(),
            Some(other) => {
                return Err(DomainError::InvalidVariablesSection(format!(
                    "variable '{name}' 'options' must be a mapping, got {}",
                    kind_of(other)
                )));
            }
        };

        Ok(VariableDefinition {
            name,
            var_type,
            options,
        })
    }

    /// The declared definitions, in manifest order.
    #[must_use]
    pub fn definitions(&self) -> &[VariableDefinition] {
        &self.definitions
    }

    /// Finds a definition by its declared (raw) name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<&VariableDefinition> {
        self.definitions.iter().find(|def| def.name == name)
    }

    /// Whether the catalog has no definitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a list",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
