//! Manifest tree representation
//!
//! A deployment manifest is a tagged YAML tree (mapping / sequence /
//! scalar). The scanner walks every string leaf collecting placeholder
//! references together with the path of the field they occur in.

use std::fmt;

use serde_yaml::Value;

use crate::error::{DomainError, DomainResult};
use crate::variables::reference::{scan_placeholders, Placeholder};

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Mapping key.
    Key(String),
    /// Sequence index.
    Index(usize),
}

/// A path into the manifest tree, e.g. `jobs[0].properties.color`.
/// Used in scan results and error messages.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldPath(Vec<PathSegment>);

impl FieldPath {
    /// The empty path (manifest root).
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Extends the path with a mapping key.
    #[must_use]
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// Extends the path with a sequence index.
    #[must_use]
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// The path segments, outermost first.
    #[must_use]
    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, segment) in self.0.iter().enumerate() {
            match segment {
                PathSegment::Key(key) => {
                    if position > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(key)?;
                }
                PathSegment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// A placeholder occurrence located in the manifest tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedPlaceholder {
    /// Path of the string field containing the reference.
    pub path: FieldPath,

    /// The reference itself, with its span inside that field.
    pub placeholder: Placeholder,
}

/// A deployment manifest as a tagged YAML tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    root: Value,
}

impl Manifest {
    /// Wraps an already-parsed tree.
    #[must_use]
    pub const fn new(root: Value) -> Self {
        Self { root }
    }

    /// Parses manifest text.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::InvalidYaml`] when the text is not YAML.
    pub fn from_yaml(text: &str) -> DomainResult<Self> {
        let root = serde_yaml::from_str(text).map_err(|e| DomainError::InvalidYaml(e.to_string()))?;
        Ok(Self { root })
    }

    /// Renders the tree back to YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::RenderFailed`] when serialization fails.
    pub fn to_yaml(&self) -> DomainResult<String> {
        serde_yaml::to_string(&self.root).map_err(|e| DomainError::RenderFailed(e.to_string()))
    }

    /// The underlying tree.
    #[must_use]
    pub const fn root(&self) -> &Value {
        &self.root
    }

    /// Consumes the manifest, returning the tree.
    #[must_use]
    pub fn into_root(self) -> Value {
        self.root
    }

    /// The raw `variables` section, if present.
    #[must_use]
    pub fn variables_section(&self) -> Option<&Value> {
        match &self.root {
            Value::Mapping(mapping) => mapping.get("variables"),
            _ => None,
        }
    }

    /// Collects every placeholder reference in the tree, left to right
    /// within each string field. The top-level `variables` section is not
    /// scanned: it declares variables, it does not consume them.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::MalformedReference`] for any malformed
    /// `((` occurrence, naming the field it appears in.
    pub fn scan(&self) -> DomainResult<Vec<ScannedPlaceholder>> {
        let mut found = Vec::new();
        match &self.root {
            Value::Mapping(mapping) => {
                for (key, value) in mapping {
                    let label = key_label(key);
                    if label == "variables" {
                        continue;
                    }
                    walk(value, &FieldPath::root().key(label), &mut found)?;
                }
            }
            other => walk(other, &FieldPath::root(), &mut found)?,
        }
        Ok(found)
    }
}

fn walk(value: &Value, path: &FieldPath, found: &mut Vec<ScannedPlaceholder>) -> DomainResult<()> {
    match value {
        Value::String(text) => {
            if !text.contains("((") {
                return Ok(());
            }
            let placeholders =
                scan_placeholders(text).map_err(|reason| DomainError::MalformedReference {
                    field: path.to_string(),
                    reason,
                })?;
            for placeholder in placeholders {
                found.push(ScannedPlaceholder {
                    path: path.clone(),
                    placeholder,
                });
            }
            Ok(())
        }
        Value::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                walk(item, &path.index(index), found)?;
            }
            Ok(())
        }
        Value::Mapping(mapping) => {
            for (key, item) in mapping {
                walk(item, &path.key(key_label(key)), found)?;
            }
            Ok(())
        }
        Value::Tagged(tagged) => walk(&tagged.value, path, found),
        Value::Null | Value::Bool(_) | Value::Number(_) => Ok(()),
    }
}

/// Display label for a mapping key. Manifest keys are almost always
/// strings; other scalars get their YAML scalar form.
pub(crate) fn key_label(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => "?".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(yaml: &str) -> Manifest {
        Manifest::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_scan_collects_references_with_paths() {
        let manifest = parse(
            r"
name: simple
jobs:
  - name: our_instance_group
    properties:
      gargamel:
        color: ((var_a))
      smurfs:
        color: ((/var_b))
",
        );

        let found = manifest.scan().unwrap();
        assert_eq!(found.len(), 2);

        let paths: Vec<_> = found.iter().map(|s| s.path.to_string()).collect();
        assert!(paths.contains(&"jobs[0].properties.gargamel.color".to_owned()));
        assert!(paths.contains(&"jobs[0].properties.smurfs.color".to_owned()));
    }

    #[test]
    fn test_scan_skips_variables_section() {
        let manifest = parse(
            r"
name: simple
variables:
  - name: var_a
    type: password
jobs: []
",
        );
        assert!(manifest.scan().unwrap().is_empty());
    }

    #[test]
    fn test_scan_reports_field_of_malformed_reference() {
        let manifest = parse(
            r"
jobs:
  - properties:
      color: 'oops ((var_a'
",
        );
        let err = manifest.scan().unwrap_err();
        assert!(matches!(
            err,
            DomainError::MalformedReference { ref field, .. }
                if field == "jobs[0].properties.color"
        ));
    }

    #[test]
    fn test_scan_without_references_is_empty() {
        let manifest = parse("name: simple\njobs: []\n");
        assert!(manifest.scan().unwrap().is_empty());
    }

    #[test]
    fn test_scan_mid_string_reference() {
        let manifest = parse("greeting: 'level: ((/var_a)) exactly'\n");
        let found = manifest.scan().unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].placeholder.name, "/var_a");
        assert_eq!(found[0].path.to_string(), "greeting");
    }

    #[test]
    fn test_yaml_round_trip() {
        let manifest = parse("name: simple\ncount: 3\n");
        let rendered = manifest.to_yaml().unwrap();
        assert_eq!(Manifest::from_yaml(&rendered).unwrap(), manifest);
    }

    #[test]
    fn test_variables_section_accessor() {
        let manifest = parse("variables:\n- name: var_a\n  type: password\n");
        assert!(manifest.variables_section().is_some());

        let manifest = parse("name: simple\n");
        assert!(manifest.variables_section().is_none());
    }

    #[test]
    fn test_field_path_display() {
        let path = FieldPath::root().key("jobs").index(2).key("properties").key("color");
        assert_eq!(path.to_string(), "jobs[2].properties.color");
    }
}
