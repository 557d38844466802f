//! Port definitions (interfaces)
//!
//! Ports define the boundary between the resolution pass and external
//! systems. The only external system here is the config server; its
//! adapter lives in the infrastructure layer, and tests substitute
//! in-memory fakes.

mod config_server;

pub use config_server::{ConfigServerClient, ConfigServerError};
