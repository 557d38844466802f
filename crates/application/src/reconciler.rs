//! Type reconciliation
//!
//! Merges the declared catalog with consumer-declared property types into
//! exactly one [`VariableSpec`] per canonical identity. Pure function,
//! independent of manifest traversal order.

use std::collections::{BTreeMap, BTreeSet};

use manifold_domain::{
    ScannedPlaceholder, VariableCatalog, VariableIdentity, VariableSpec, VariableType,
};

use crate::error::ResolutionError;

/// The type a consuming property schema declares for a raw reference name.
/// Supplied by the rendering collaborators that know the property slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerType {
    /// Raw reference name as written in the manifest.
    pub name: String,

    /// Type declared by the property slot consuming the value.
    pub declared_type: VariableType,
}

impl ConsumerType {
    /// Creates a consumer-declared type.
    pub fn new(name: impl Into<String>, declared_type: VariableType) -> Self {
        Self {
            name: name.into(),
            declared_type,
        }
    }
}

/// Produces the authoritative identity → spec mapping.
///
/// Precedence per identity:
/// 1. A catalog entry wins outright; its type and options are used even
///    when consumer-declared types disagree. Two catalog entries for the
///    same identity with differing types are a reconciliation conflict,
///    not a last-wins overwrite.
/// 2. Without a catalog entry, a single consumer-declared type is used.
///    Two or more differing consumer types are a reconciliation conflict,
///    rejected unconditionally.
/// 3. Neither catalog nor typed consumer: the reference is untyped and
///    must already exist in the store.
///
/// Catalog entries that are never referenced still produce specs; the
/// variables section drives generation on its own.
///
/// # Errors
///
/// Returns [`ResolutionError::TypeConflict`] naming the identity and the
/// conflicting types.
pub fn reconcile(
    references: &[ScannedPlaceholder],
    catalog: &VariableCatalog,
    consumer_types: &[ConsumerType],
    director: &str,
    deployment: &str,
) -> Result<BTreeMap<VariableIdentity, VariableSpec>, ResolutionError> {
    let mut specs: BTreeMap<VariableIdentity, VariableSpec> = BTreeMap::new();

    for definition in catalog.definitions() {
        let identity = VariableIdentity::resolve(&definition.name, director, deployment);
        if let Some(existing) = specs.get(&identity) {
            // Two catalog declarations for one identity. Identical types
            // are a harmless duplicate; differing types are fatal, never
            // resolved by declaration order.
            if existing.var_type.as_ref() == Some(&definition.var_type) {
                continue;
            }
            let mut conflicting: Vec<String> = existing
                .var_type
                .iter()
                .map(ToString::to_string)
                .collect();
            conflicting.push(definition.var_type.to_string());
            conflicting.sort();
            return Err(ResolutionError::TypeConflict {
                identity,
                conflicting,
            });
        }
        specs.insert(
            identity.clone(),
            VariableSpec::typed(identity, definition.var_type.clone(), definition.options.clone()),
        );
    }

    let mut declared: BTreeMap<VariableIdentity, BTreeSet<VariableType>> = BTreeMap::new();
    for consumer in consumer_types {
        let identity = VariableIdentity::resolve(&consumer.name, director, deployment);
        declared
            .entry(identity)
            .or_default()
            .insert(consumer.declared_type.clone());
    }

    for reference in references {
        let identity =
            VariableIdentity::resolve(&reference.placeholder.name, director, deployment);
        if specs.contains_key(&identity) {
            continue;
        }

        let spec = match declared.get(&identity) {
            Some(types) if types.len() == 1 => {
                let var_type = types
                    .iter()
                    .next()
                    .cloned()
                    .ok_or_else(|| ResolutionError::Internal("empty consumer type set".into()))?;
                VariableSpec::typed(identity.clone(), var_type, serde_yaml::Value::Null)
            }
            Some(types) => {
                let mut conflicting: Vec<String> =
                    types.iter().map(ToString::to_string).collect();
                conflicting.sort();
                return Err(ResolutionError::TypeConflict {
                    identity,
                    conflicting,
                });
            }
            None => VariableSpec::untyped(identity.clone()),
        };
        specs.insert(identity, spec);
    }

    Ok(specs)
}
