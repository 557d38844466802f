//! Manifold Domain - core types for manifest variable resolution
//!
//! This crate defines the domain model for the Manifold resolver.
//! All types here are pure Rust with no I/O dependencies: the manifest
//! tree, the `((variable))` placeholder scanner, canonical variable
//! identities, the declared variable catalog, and resolved values.

pub mod error;
pub mod manifest;
pub mod variables;

pub use error::{DomainError, DomainResult};
pub use manifest::{FieldPath, Manifest, PathSegment, ScannedPlaceholder};
pub use variables::{
    scan_placeholders, Placeholder, ResolvedValue, ScanError, SubstitutionMap, VariableCatalog,
    VariableDefinition, VariableIdentity, VariableSpec, VariableType,
};
