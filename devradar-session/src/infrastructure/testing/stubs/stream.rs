use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

use devradar_model::{Dev, SubscriptionScope};

use crate::error::StreamError;
use crate::infrastructure::services::stream::{
    StreamEvent, StreamEventKind, StreamService, StreamSink, SubscriptionHandle, SubscriptionId,
};

/// What the session asked of the stream service, in order.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamCall {
    Open {
        id: SubscriptionId,
        scope: SubscriptionScope,
    },
    Close {
        id: SubscriptionId,
    },
}

#[derive(Debug, Default)]
struct InnerStreamState {
    calls: Vec<StreamCall>,
    sinks: HashMap<SubscriptionId, StreamSink>,
    active: BTreeSet<SubscriptionId>,
    latest: Option<SubscriptionId>,
    fail_next_open: Option<StreamError>,
}

/// In-memory [`StreamService`] whose pushes are triggered by the test.
#[derive(Debug, Clone, Default)]
pub struct StubStreamService {
    inner: Arc<RwLock<InnerStreamState>>,
}

impl StubStreamService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_open(&self, err: StreamError) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_next_open = Some(err);
    }

    pub fn calls(&self) -> Vec<StreamCall> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .clone()
    }

    /// Subscriptions opened and not yet closed.
    pub fn active(&self) -> Vec<SubscriptionId> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .active
            .iter()
            .copied()
            .collect()
    }

    pub fn latest(&self) -> Option<SubscriptionId> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .latest
    }

    /// Scope the subscription `id` was opened with.
    pub fn scope_of(&self, id: SubscriptionId) -> Option<SubscriptionScope> {
        self.calls().into_iter().find_map(|call| match call {
            StreamCall::Open { id: opened, scope } if opened == id => Some(scope),
            _ => None,
        })
    }

    /// Deliver `dev` on subscription `id`.
    ///
    /// Works for closed subscriptions too, which models a push that was
    /// already in flight when the session closed it.
    pub fn push(&self, id: SubscriptionId, dev: Dev) -> bool {
        self.send(id, StreamEventKind::Pushed(dev))
    }

    /// Deliver `dev` on the most recently opened subscription.
    pub fn push_latest(&self, dev: Dev) -> bool {
        match self.latest() {
            Some(id) => self.push(id, dev),
            None => false,
        }
    }

    pub fn announce_open(&self, id: SubscriptionId) -> bool {
        self.send(id, StreamEventKind::Opened)
    }

    /// Report the subscription as given up, as the real service does once its
    /// retry budget is spent.
    pub fn end(&self, id: SubscriptionId, reason: impl Into<String>) -> bool {
        self.send(
            id,
            StreamEventKind::Closed {
                reason: reason.into(),
            },
        )
    }

    fn send(&self, id: SubscriptionId, kind: StreamEventKind) -> bool {
        let guard = self.inner.read().unwrap_or_else(PoisonError::into_inner);
        match guard.sinks.get(&id) {
            Some(sink) => sink.send(StreamEvent::new(id, kind)).is_ok(),
            None => false,
        }
    }
}

impl StreamService for StubStreamService {
    fn open(
        &self,
        id: SubscriptionId,
        scope: SubscriptionScope,
        sink: StreamSink,
    ) -> Result<SubscriptionHandle, StreamError> {
        {
            let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            if let Some(err) = guard.fail_next_open.take() {
                return Err(err);
            }
            guard.calls.push(StreamCall::Open {
                id,
                scope: scope.clone(),
            });
            guard.sinks.insert(id, sink);
            guard.active.insert(id);
            guard.latest = Some(id);
        }

        let inner = Arc::clone(&self.inner);
        Ok(SubscriptionHandle::new(id, scope).on_close(move |id| {
            let mut guard = inner.write().unwrap_or_else(PoisonError::into_inner);
            guard.calls.push(StreamCall::Close { id });
            guard.active.remove(&id);
        }))
    }
}
