//! Manifold Application - the resolution pass
//!
//! Ties the domain model to the config-server port: type reconciliation,
//! the concurrent fetch-or-generate fan-out, and manifest interpolation.
//! All I/O goes through the [`ports::ConfigServerClient`] trait; adapters
//! live in the infrastructure layer.

pub mod error;
pub mod interpolator;
pub mod ports;
pub mod reconciler;
pub mod resolver;

pub use error::{ResolutionError, ResolutionResult};
pub use interpolator::interpolate;
pub use ports::{ConfigServerClient, ConfigServerError};
pub use reconciler::{reconcile, ConsumerType};
pub use resolver::{PassConfig, ResolutionPass};
