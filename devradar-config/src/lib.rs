//! Shared configuration library for devradar.
//!
//! This crate owns the client configuration model, the order in which it is
//! loaded (explicit path, inline JSON, well-known files, defaults) and the
//! guard rails applied before a session is built from it.
#![allow(missing_docs)]

pub mod constants;
pub mod loader;
pub mod models;
pub mod validation;

pub use loader::{ConfigLoad, ConfigSource, error::ConfigLoadError};
pub use models::retry::RetryPolicy;
pub use models::{
    ClientConfig, DiscoveryConfig, DiscoveryPolicy, LocationDefaults,
    QueryConfig, ServerEndpoint, StreamConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
