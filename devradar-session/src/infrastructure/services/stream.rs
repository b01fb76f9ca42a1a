//! Live subscription contract.
//!
//! A subscription is represented by an owned [`SubscriptionHandle`]. Every
//! event it produces is tagged with its [`SubscriptionId`] and sent through a
//! sink owned by the session, so the session can tell current pushes from
//! ones that were already in flight when the subscription was closed.

use devradar_model::{Dev, SubscriptionScope};
use std::fmt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::error::StreamError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StreamEventKind {
    /// The server accepted the subscription.
    Opened,
    /// A newly registered dev matching the subscription scope.
    Pushed(Dev),
    /// The subscription gave up (retries exhausted or refused).
    Closed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamEvent {
    pub subscription: SubscriptionId,
    pub kind: StreamEventKind,
}

impl StreamEvent {
    pub fn new(subscription: SubscriptionId, kind: StreamEventKind) -> Self {
        Self { subscription, kind }
    }
}

pub type StreamSink = mpsc::UnboundedSender<StreamEvent>;

/// Pub/sub collaborator delivering newly registered devs.
pub trait StreamService: Send + Sync {
    /// Open a subscription scoped to `scope`. Events go to `sink` until the
    /// returned handle is closed or dropped.
    fn open(
        &self,
        id: SubscriptionId,
        scope: SubscriptionScope,
        sink: StreamSink,
    ) -> Result<SubscriptionHandle, StreamError>;
}

type CloseHook = Box<dyn FnOnce(SubscriptionId) + Send>;

/// Owned handle to one open subscription. Closing is idempotent and also
/// happens on drop.
pub struct SubscriptionHandle {
    id: SubscriptionId,
    scope: SubscriptionScope,
    task: Option<JoinHandle<()>>,
    on_close: Option<CloseHook>,
    closed: bool,
}

impl fmt::Debug for SubscriptionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SubscriptionHandle")
            .field("id", &self.id)
            .field("scope", &self.scope)
            .field("has_task", &self.task.is_some())
            .field("closed", &self.closed)
            .finish()
    }
}

impl SubscriptionHandle {
    pub fn new(id: SubscriptionId, scope: SubscriptionScope) -> Self {
        Self {
            id,
            scope,
            task: None,
            on_close: None,
            closed: false,
        }
    }

    /// Reader task to abort on close.
    pub fn with_task(mut self, task: JoinHandle<()>) -> Self {
        self.task = Some(task);
        self
    }

    /// Hook run exactly once when the handle closes.
    pub fn on_close<F>(mut self, hook: F) -> Self
    where
        F: FnOnce(SubscriptionId) + Send + 'static,
    {
        self.on_close = Some(Box::new(hook));
        self
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn scope(&self) -> &SubscriptionScope {
        &self.scope
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;

        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(hook) = self.on_close.take() {
            hook(self.id);
        }
        log::debug!("Closed subscription {}", self.id);
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.close();
    }
}
