//! Infrastructure adapters

mod http_config_server;

pub use http_config_server::{ConfigServerConfig, HttpConfigServer, RetryPolicy};
