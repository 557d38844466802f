//! Manifest interpolation
//!
//! Rewrites the manifest tree from the substitution map. A string field
//! that is exactly one placeholder takes the resolved value verbatim, so
//! structured values (certificates) stay structured. A placeholder inside
//! a larger string gets the value's scalar form spliced into its exact
//! span, left to right, surrounding text untouched.

use manifold_domain::{
    scan_placeholders, DomainError, FieldPath, Manifest, SubstitutionMap, VariableIdentity,
};
use serde_yaml::value::TaggedValue;
use serde_yaml::Value;

use crate::error::ResolutionError;

/// Substitutes every placeholder in the manifest, returning a new tree.
/// The `variables` section is carried through unchanged.
///
/// # Errors
///
/// Returns [`ResolutionError::ShapeMismatch`] when a structured value is
/// referenced mid-string, and [`ResolutionError::Internal`] if a scanned
/// reference has no entry in the substitution map.
pub fn interpolate(
    manifest: &Manifest,
    substitutions: &SubstitutionMap,
    director: &str,
    deployment: &str,
) -> Result<Manifest, ResolutionError> {
    let context = Context {
        substitutions,
        director,
        deployment,
    };

    let root = match manifest.root() {
        Value::Mapping(mapping) => {
            let mut rewritten = serde_yaml::Mapping::with_capacity(mapping.len());
            for (key, value) in mapping {
                let label = key_label(key);
                let new_value = if label == "variables" {
                    value.clone()
                } else {
                    context.rewrite(value, &FieldPath::root().key(label))?
                };
                rewritten.insert(key.clone(), new_value);
            }
            Value::Mapping(rewritten)
        }
        other => context.rewrite(other, &FieldPath::root())?,
    };

    Ok(Manifest::new(root))
}

struct Context<'a> {
    substitutions: &'a SubstitutionMap,
    director: &'a str,
    deployment: &'a str,
}

impl Context<'_> {
    fn rewrite(&self, value: &Value, path: &FieldPath) -> Result<Value, ResolutionError> {
        match value {
            Value::String(text) => self.rewrite_string(text, path),
            Value::Sequence(items) => {
                let mut rewritten = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    rewritten.push(self.rewrite(item, &path.index(index))?);
                }
                Ok(Value::Sequence(rewritten))
            }
            Value::Mapping(mapping) => {
                let mut rewritten = serde_yaml::Mapping::with_capacity(mapping.len());
                for (key, item) in mapping {
                    let new_value = self.rewrite(item, &path.key(key_label(key)))?;
                    rewritten.insert(key.clone(), new_value);
                }
                Ok(Value::Mapping(rewritten))
            }
            Value::Tagged(tagged) => Ok(Value::Tagged(Box::new(TaggedValue {
                tag: tagged.tag.clone(),
                value: self.rewrite(&tagged.value, path)?,
            }))),
            scalar => Ok(scalar.clone()),
        }
    }

    fn rewrite_string(&self, text: &str, path: &FieldPath) -> Result<Value, ResolutionError> {
        let placeholders = scan_placeholders(text).map_err(|reason| {
            ResolutionError::Schema(DomainError::MalformedReference {
                field: path.to_string(),
                reason,
            })
        })?;

        if placeholders.is_empty() {
            return Ok(Value::String(text.to_owned()));
        }

        // Whole-field: the resolved value replaces the node verbatim,
        // structured or not.
        if placeholders.len() == 1 && placeholders[0].span == (0..text.len()) {
            let resolved = self.lookup(&placeholders[0].name)?;
            return Ok(resolved.clone());
        }

        let mut spliced = String::with_capacity(text.len());
        let mut last_end = 0;
        for placeholder in &placeholders {
            spliced.push_str(&text[last_end..placeholder.span.start]);

            let identity =
                VariableIdentity::resolve(&placeholder.name, self.director, self.deployment);
            let resolved = self.lookup(&placeholder.name)?;
            let scalar = scalar_form(resolved).ok_or_else(|| ResolutionError::ShapeMismatch {
                identity,
                field: path.to_string(),
            })?;
            spliced.push_str(&scalar);

            last_end = placeholder.span.end;
        }
        spliced.push_str(&text[last_end..]);

        Ok(Value::String(spliced))
    }

    fn lookup(&self, raw_name: &str) -> Result<&Value, ResolutionError> {
        let identity = VariableIdentity::resolve(raw_name, self.director, self.deployment);
        self.substitutions
            .get(&identity)
            .map(|resolved| &resolved.value)
            .ok_or_else(|| {
                ResolutionError::Internal(format!("no resolved value for '{identity}'"))
            })
    }
}

fn scalar_form(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn key_label(key: &Value) -> String {
    match key {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        _ => "?".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use manifold_domain::ResolvedValue;
    use pretty_assertions::assert_eq;

    use super::*;

    const DIRECTOR: &str = "TestDirector";
    const DEPLOYMENT: &str = "simple";

    fn substitutions(entries: &[(&str, Value)]) -> SubstitutionMap {
        entries
            .iter()
            .map(|(key, value)| {
                let identity = VariableIdentity::from_canonical(*key);
                (
                    identity.clone(),
                    ResolvedValue {
                        identity,
                        value: value.clone(),
                    },
                )
            })
            .collect()
    }

    fn run(yaml: &str, map: &SubstitutionMap) -> Result<Manifest, ResolutionError> {
        let manifest = Manifest::from_yaml(yaml).unwrap();
        interpolate(&manifest, map, DIRECTOR, DEPLOYMENT)
    }

    #[test]
    fn test_whole_field_scalar_substitution() {
        let map = substitutions(&[(
            "/TestDirector/simple/var_a",
            Value::String("p@ss".to_owned()),
        )]);
        let resolved = run("color: ((var_a))\n", &map).unwrap();
        assert_eq!(resolved.root()["color"], Value::String("p@ss".to_owned()));
    }

    #[test]
    fn test_whole_field_keeps_structured_values() {
        let certificate: Value = serde_yaml::from_str(
            "{certificate: PEM, private_key: KEY, ca: CA}",
        )
        .unwrap();
        let map = substitutions(&[("/TestDirector/simple/var_c", certificate.clone())]);

        let resolved = run("cert: ((var_c))\n", &map).unwrap();
        assert_eq!(resolved.root()["cert"], certificate);
    }

    #[test]
    fn test_mid_string_substitution() {
        let map = substitutions(&[("/var_a", Value::String("p@ss".to_owned()))]);
        let resolved = run("field: 'secret: ((/var_a))'\n", &map).unwrap();
        assert_eq!(
            resolved.root()["field"],
            Value::String("secret: p@ss".to_owned())
        );
    }

    #[test]
    fn test_mid_string_preserves_surrounding_text() {
        let map = substitutions(&[
            ("/TestDirector/simple/host", Value::String("db.local".to_owned())),
            ("/TestDirector/simple/port", Value::Number(5432.into())),
        ]);
        let resolved = run("url: 'postgres://((host)):((port))/app'\n", &map).unwrap();
        assert_eq!(
            resolved.root()["url"],
            Value::String("postgres://db.local:5432/app".to_owned())
        );
    }

    #[test]
    fn test_structured_value_mid_string_is_rejected() {
        let certificate: Value =
            serde_yaml::from_str("{certificate: PEM, private_key: KEY, ca: CA}").unwrap();
        let map = substitutions(&[("/TestDirector/simple/var_c", certificate)]);

        let err = run("field: 'cert is ((var_c))'\n", &map).unwrap_err();
        assert_eq!(
            err,
            ResolutionError::ShapeMismatch {
                identity: VariableIdentity::from_canonical("/TestDirector/simple/var_c"),
                field: "field".to_owned(),
            }
        );
    }

    #[test]
    fn test_variables_section_is_untouched() {
        let map = substitutions(&[(
            "/TestDirector/simple/var_a",
            Value::String("p@ss".to_owned()),
        )]);
        let resolved = run(
            "variables:\n- name: var_a\n  type: password\ncolor: ((var_a))\n",
            &map,
        )
        .unwrap();

        let variables = &resolved.root()["variables"];
        assert_eq!(variables[0]["name"], Value::String("var_a".to_owned()));
        assert_eq!(resolved.root()["color"], Value::String("p@ss".to_owned()));
    }

    #[test]
    fn test_nested_structures_are_rewritten() {
        let map = substitutions(&[("/v", Value::String("x".to_owned()))]);
        let resolved = run("jobs:\n- properties:\n    list: [((/v)), plain]\n", &map).unwrap();
        assert_eq!(
            resolved.root()["jobs"][0]["properties"]["list"][0],
            Value::String("x".to_owned())
        );
        assert_eq!(
            resolved.root()["jobs"][0]["properties"]["list"][1],
            Value::String("plain".to_owned())
        );
    }

    #[test]
    fn test_missing_substitution_is_internal_error() {
        let map = SubstitutionMap::new();
        let err = run("color: ((var_a))\n", &map).unwrap_err();
        assert!(matches!(err, ResolutionError::Internal(_)));
    }

    #[test]
    fn test_untouched_fields_survive() {
        let map = substitutions(&[(
            "/TestDirector/simple/var_a",
            Value::String("p@ss".to_owned()),
        )]);
        let resolved = run("color: ((var_a))\ncount: 3\nflag: true\n", &map).unwrap();
        assert_eq!(resolved.root()["count"], Value::Number(3.into()));
        assert_eq!(resolved.root()["flag"], Value::Bool(true));
    }
}
