pub mod bootstrap;
pub mod controller;
pub mod state;

pub use bootstrap::{build_session, location_provider};
pub use controller::{SessionController, SessionOptions};
pub use state::{EventOutcome, ProfileLink, SessionSnapshot, SessionState};
