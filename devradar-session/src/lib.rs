//! devradar session library
//!
//! Drives one "find nearby devs" screen without any rendering: it acquires an
//! initial position, runs the proximity query, keeps the discovered devs and
//! holds at most one live subscription for newly registered devs.
//!
//! Notes
//! - Collaborators (query service, event stream, location platform) sit behind
//!   traits in [`infrastructure::services`] and [`location`].
//! - [`infrastructure::testing`] ships scripted stubs for all three so front
//!   ends and tests can run a session without a server.

pub mod discovery;
pub mod error;
pub mod infrastructure;
pub mod location;
pub mod session;

pub use devradar_model as model;

pub use discovery::DiscoverySet;
pub use error::{LocationError, QueryError, SessionError, StreamError};
pub use location::{Accuracy, LocationPlatform, LocationProvider, PermissionStatus, StaticLocation};
pub use session::{
    EventOutcome, ProfileLink, SessionController, SessionOptions, SessionSnapshot,
    SessionState,
};
