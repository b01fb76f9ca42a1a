use std::collections::VecDeque;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use devradar_model::{Dev, SubscriptionScope};

use crate::error::QueryError;
use crate::infrastructure::services::search::SearchService;

#[derive(Debug, Clone)]
enum ScriptedReply {
    Devs(Vec<Dev>),
    Fail(QueryError),
    Hang,
}

#[derive(Debug, Default)]
struct InnerSearchState {
    replies: VecDeque<ScriptedReply>,
    fallback: Vec<Dev>,
    calls: Vec<SubscriptionScope>,
}

/// [`SearchService`] answering from a queue of scripted replies.
///
/// Once the queue is empty every call returns the fallback list (empty unless
/// set with [`StubSearchService::set_fallback`]).
#[derive(Debug, Clone, Default)]
pub struct StubSearchService {
    inner: Arc<RwLock<InnerSearchState>>,
}

impl StubSearchService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond_with(&self, devs: Vec<Dev>) -> &Self {
        self.push(ScriptedReply::Devs(devs))
    }

    pub fn fail_with(&self, err: QueryError) -> &Self {
        self.push(ScriptedReply::Fail(err))
    }

    /// Next call never completes; only a timeout gets the caller out.
    pub fn hang_once(&self) -> &Self {
        self.push(ScriptedReply::Hang)
    }

    pub fn set_fallback(&self, devs: Vec<Dev>) {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .fallback = devs;
    }

    /// Scopes of every call received, in order.
    pub fn calls(&self) -> Vec<SubscriptionScope> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .clone()
    }

    pub fn call_count(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .calls
            .len()
    }

    fn push(&self, reply: ScriptedReply) -> &Self {
        self.inner
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .replies
            .push_back(reply);
        self
    }
}

#[async_trait]
impl SearchService for StubSearchService {
    async fn search(&self, scope: &SubscriptionScope) -> Result<Vec<Dev>, QueryError> {
        let reply = {
            let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
            guard.calls.push(scope.clone());
            guard
                .replies
                .pop_front()
                .unwrap_or_else(|| ScriptedReply::Devs(guard.fallback.clone()))
        };

        match reply {
            ScriptedReply::Devs(devs) => Ok(devs),
            ScriptedReply::Fail(err) => Err(err),
            ScriptedReply::Hang => futures::future::pending().await,
        }
    }
}
