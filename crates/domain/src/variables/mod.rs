//! Variable model
//!
//! Everything that describes a variable before it has a value: raw
//! `((name))` references, canonical identities, the declared catalog,
//! reconciled specs and the values that come back from the store.

pub mod catalog;
pub mod identity;
pub mod reference;
pub mod spec;

pub use catalog::{VariableCatalog, VariableDefinition};
pub use identity::VariableIdentity;
pub use reference::{scan_placeholders, Placeholder, ScanError};
pub use spec::{ResolvedValue, SubstitutionMap, VariableSpec, VariableType};
