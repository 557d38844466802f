//! Manifold Infrastructure - adapters for external systems
//!
//! Implements the application-layer ports against real collaborators.
//! The only external system is the config server, reached over HTTP.

pub mod adapters;

pub use adapters::{ConfigServerConfig, HttpConfigServer, RetryPolicy};
