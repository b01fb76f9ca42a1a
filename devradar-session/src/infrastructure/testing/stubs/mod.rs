pub mod location;
pub mod search;
pub mod stream;
