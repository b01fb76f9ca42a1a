//! Core data model definitions shared across devradar crates.
#![allow(missing_docs)]

pub mod dev;
pub mod error;
pub mod filter;
pub mod geo;
pub mod scope;

// Intentionally curated re-exports for downstream consumers.
pub use dev::{Dev, DevId, GeoPoint, SearchResponse};
pub use error::{ModelError, Result as ModelResult};
pub use filter::FilterTerm;
pub use geo::{Coordinates, GeoRegion};
pub use scope::SubscriptionScope;
