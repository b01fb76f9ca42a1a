//! Service traits for the session's external collaborators and their HTTP
//! adapters.

pub mod search;
pub mod sse;
pub mod stream;

pub use search::{SearchApiAdapter, SearchService};
pub use sse::{NEW_DEV_EVENT, SseStreamService};
pub use stream::{
    StreamEvent, StreamEventKind, StreamService, StreamSink, SubscriptionHandle,
    SubscriptionId,
};
