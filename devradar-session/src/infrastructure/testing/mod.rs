//! Scripted collaborators for running a session without a server.
//!
//! The stubs record every call they receive so tests can assert on ordering
//! (e.g. that a subscription was closed before the next one opened) and let
//! the caller inject responses, failures and pushes.

pub mod stubs;

pub use stubs::location::StubLocationPlatform;
pub use stubs::search::StubSearchService;
pub use stubs::stream::{StreamCall, StubStreamService};

use devradar_model::{Coordinates, Dev};

/// A dev at `(latitude, longitude)` with a predictable name and github handle.
pub fn sample_dev(id: &str, latitude: f64, longitude: f64) -> Dev {
    Dev::new(
        id,
        format!("Dev {id}"),
        Coordinates {
            latitude,
            longitude,
        },
    )
    .with_bio(format!("Bio of {id}"))
    .with_tags(["rust"])
    .with_github_username(format!("dev-{id}"))
}
