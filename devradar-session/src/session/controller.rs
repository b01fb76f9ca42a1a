//! Session controller
//!
//! Owns the viewport region, the filter term, the discovered devs and the one
//! active subscription. State changes go through `&mut self`: the controller
//! is driven by a single task, so pushes are applied in the order that task
//! handles them and never concurrently with a region or filter edit.

use devradar_config::{ClientConfig, DiscoveryPolicy, RetryPolicy};
use devradar_model::{Dev, DevId, FilterTerm, GeoRegion, SubscriptionScope};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::discovery::DiscoverySet;
use crate::error::{QueryError, SessionError, StreamError};
use crate::infrastructure::services::search::SearchService;
use crate::infrastructure::services::stream::{
    StreamEvent, StreamEventKind, StreamService, StreamSink, SubscriptionHandle, SubscriptionId,
};
use crate::location::LocationProvider;
use crate::session::state::{EventOutcome, ProfileLink, SessionSnapshot, SessionState};

/// Query and discovery tuning taken from [`ClientConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionOptions {
    pub query_timeout: Duration,
    pub query_retry: RetryPolicy,
    pub discovery_policy: DiscoveryPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from_config(&ClientConfig::default())
    }
}

impl SessionOptions {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            query_timeout: config.query.timeout,
            query_retry: config.query.retry,
            discovery_policy: config.discovery.policy,
        }
    }
}

pub struct SessionController {
    search_service: Arc<dyn SearchService>,
    stream_service: Arc<dyn StreamService>,
    options: SessionOptions,
    state: SessionState,
    region: Option<GeoRegion>,
    filter: FilterTerm,
    discovered: DiscoverySet,
    subscription: Option<SubscriptionHandle>,
    last_subscription_id: u64,
    events_tx: StreamSink,
    events_rx: mpsc::UnboundedReceiver<StreamEvent>,
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionController")
            .field("state", &self.state)
            .field("region", &self.region)
            .field("filter", &self.filter)
            .field("discovered", &self.discovered.len())
            .field("subscription", &self.subscription)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl SessionController {
    pub fn new(
        search_service: Arc<dyn SearchService>,
        stream_service: Arc<dyn StreamService>,
        options: SessionOptions,
    ) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            search_service,
            stream_service,
            options,
            state: SessionState::Uninitialized,
            region: None,
            filter: FilterTerm::default(),
            discovered: DiscoverySet::new(),
            subscription: None,
            last_subscription_id: 0,
            events_tx,
            events_rx,
        }
    }

    // === Accessors ===

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn region(&self) -> Option<&GeoRegion> {
        self.region.as_ref()
    }

    pub fn filter(&self) -> &FilterTerm {
        &self.filter
    }

    pub fn discovered(&self) -> &DiscoverySet {
        &self.discovered
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Id and scope of the open subscription, if any.
    pub fn active_subscription(&self) -> Option<(SubscriptionId, &SubscriptionScope)> {
        self.subscription
            .as_ref()
            .map(|handle| (handle.id(), handle.scope()))
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state,
            region: self.region,
            filter: self.filter.clone(),
            subscription: self
                .active_subscription()
                .map(|(id, scope)| (id, scope.clone())),
            discovered: self.discovered.len(),
        }
    }

    /// Profile target for a discovered dev's callout.
    pub fn profile_for(&self, id: &DevId) -> Option<ProfileLink> {
        self.discovered.get(id).and_then(ProfileLink::for_dev)
    }

    // === Lifecycle ===

    /// Acquire the initial position and leave `Uninitialized`.
    ///
    /// Runs once; later calls return the known region without prompting again.
    /// That includes a region handed in through
    /// [`on_region_changed`](Self::on_region_changed) before activation.
    pub async fn activate(
        &mut self,
        provider: &LocationProvider,
    ) -> Result<GeoRegion, SessionError> {
        if let Some(region) = self.region {
            log::debug!("Session already activated at {}", region);
            return Ok(region);
        }

        let region = provider.acquire_initial_position().await?;
        self.region = Some(region);
        self.state = SessionState::Idle;
        log::info!("Session activated at {}", region);
        Ok(region)
    }

    /// Run the proximity query for the current region and filter, replace the
    /// discovered devs and re-open the subscription for the same scope.
    ///
    /// Without a known region this is a no-op returning
    /// [`SessionError::RegionUnknown`]. A failed query leaves the discovered
    /// devs and any open subscription untouched. Returns the number of devs
    /// found.
    pub async fn search(&mut self) -> Result<usize, SessionError> {
        let Some(region) = self.region else {
            log::debug!("Search ignored: no region known yet");
            return Err(SessionError::RegionUnknown);
        };

        // Captured now so edits made while the query runs cannot leak in.
        let scope = SubscriptionScope::from_region(&region, &self.filter);
        log::info!(
            "Searching near {} for techs [{}]",
            region.center(),
            scope.techs.tags().collect::<Vec<_>>().join(", ")
        );

        let resume = self.resting_state();
        let result = {
            // Restores the resting state on every exit, including cancellation.
            let _querying = QueryingGuard::enter(&mut self.state, resume);
            Self::run_query(self.search_service.as_ref(), &self.options, &scope).await
        };

        let devs = match result {
            Ok(devs) => devs,
            Err(err) => {
                log::warn!("Search failed, keeping previous results: {}", err);
                return Err(err.into());
            }
        };

        let found = devs.len();
        self.discovered.replace_all(devs);
        log::info!("Search found {} devs", found);

        match self.restart_subscription(scope) {
            Ok(id) => {
                self.state = SessionState::Subscribed;
                log::debug!("Session subscribed with {}", id);
                Ok(found)
            }
            Err(err) => {
                self.state = self.resting_state();
                log::error!("Failed to open subscription: {}", err);
                Err(err.into())
            }
        }
    }

    /// Close the active subscription, if any.
    pub fn close(&mut self) {
        if let Some(mut handle) = self.subscription.take() {
            handle.close();
        }
        self.state = self.resting_state();
    }

    // === Input events ===

    /// Last write wins; never re-queries or re-subscribes.
    ///
    /// A region set before [`activate`](Self::activate) counts as the initial
    /// position (a front end restoring a saved viewport, say): the session
    /// leaves `Uninitialized` and `activate` will not prompt.
    pub fn on_region_changed(&mut self, region: GeoRegion) {
        self.region = Some(region);
        if self.state == SessionState::Uninitialized {
            self.state = SessionState::Idle;
        }
    }

    /// Last write wins; takes effect at the next [`search`](Self::search).
    pub fn on_filter_changed(&mut self, filter: impl Into<FilterTerm>) {
        self.filter = filter.into();
    }

    /// Add a pushed dev without checking the region or (by default) duplicates.
    pub fn on_entity_pushed(&mut self, dev: Dev) -> EventOutcome {
        let id = dev.id.clone();
        match self.options.discovery_policy {
            DiscoveryPolicy::Append => {
                self.discovered.append(dev);
                EventOutcome::Appended(id)
            }
            DiscoveryPolicy::MergeById => {
                if self.discovered.upsert(dev) {
                    EventOutcome::Merged(id)
                } else {
                    EventOutcome::Appended(id)
                }
            }
        }
    }

    // === Stream delivery ===

    /// Apply one event from the stream. Events from any subscription other
    /// than the active one are dropped.
    pub fn handle_stream_event(&mut self, event: StreamEvent) -> EventOutcome {
        let active = self.subscription.as_ref().map(SubscriptionHandle::id);
        if active != Some(event.subscription) {
            log::debug!(
                "Dropping event from stale subscription {}",
                event.subscription
            );
            return EventOutcome::Stale(event.subscription);
        }

        match event.kind {
            StreamEventKind::Opened => {
                log::info!("Subscription {} is live", event.subscription);
                EventOutcome::Opened(event.subscription)
            }
            StreamEventKind::Pushed(dev) => {
                log::debug!("Subscription {} pushed dev {}", event.subscription, dev.id);
                self.on_entity_pushed(dev)
            }
            StreamEventKind::Closed { reason } => {
                log::warn!(
                    "Subscription {} ended: {}; search again to resume",
                    event.subscription,
                    reason
                );
                self.close();
                EventOutcome::Ended {
                    subscription: event.subscription,
                    reason,
                }
            }
        }
    }

    /// Wait for the next stream event and apply it.
    pub async fn next_event(&mut self) -> EventOutcome {
        match self.events_rx.recv().await {
            Some(event) => self.handle_stream_event(event),
            // The controller holds a sender, so the channel never closes.
            None => std::future::pending().await,
        }
    }

    /// Apply every event already queued, without waiting.
    pub fn drain_pending(&mut self) -> Vec<EventOutcome> {
        let mut outcomes = Vec::new();
        while let Ok(event) = self.events_rx.try_recv() {
            outcomes.push(self.handle_stream_event(event));
        }
        outcomes
    }

    // === Internals ===

    fn resting_state(&self) -> SessionState {
        match (self.region.is_some(), self.subscription.is_some()) {
            (false, _) => SessionState::Uninitialized,
            (true, true) => SessionState::Subscribed,
            (true, false) => SessionState::Idle,
        }
    }

    async fn run_query(
        search_service: &dyn SearchService,
        options: &SessionOptions,
        scope: &SubscriptionScope,
    ) -> Result<Vec<Dev>, QueryError> {
        let timeout = options.query_timeout;
        let retry = options.query_retry;
        let mut retry_count = 0;

        loop {
            let result =
                match tokio::time::timeout(timeout, search_service.search(scope)).await {
                    Ok(result) => result,
                    Err(_) => Err(QueryError::Timeout(timeout)),
                };

            match result {
                Ok(devs) => return Ok(devs),
                Err(err) if err.is_retryable() && retry.allows(retry_count + 1) => {
                    retry_count += 1;
                    let delay = retry.backoff_for(retry_count);
                    log::warn!(
                        "Search attempt #{} failed ({}); retrying in {:?}",
                        retry_count,
                        err,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Close the current subscription, then open one for `scope`.
    fn restart_subscription(
        &mut self,
        scope: SubscriptionScope,
    ) -> Result<SubscriptionId, StreamError> {
        if let Some(mut previous) = self.subscription.take() {
            previous.close();
        }

        self.last_subscription_id += 1;
        let id = SubscriptionId::new(self.last_subscription_id);
        let handle = self
            .stream_service
            .open(id, scope, self.events_tx.clone())?;
        log::info!(
            "Opened subscription {} near ({}, {}) for techs '{}'",
            id,
            handle.scope().latitude,
            handle.scope().longitude,
            handle.scope().techs
        );
        self.subscription = Some(handle);
        Ok(id)
    }
}

/// Holds the session in `Querying` while a query is in flight.
struct QueryingGuard<'a> {
    state: &'a mut SessionState,
    resume: SessionState,
}

impl<'a> QueryingGuard<'a> {
    fn enter(state: &'a mut SessionState, resume: SessionState) -> Self {
        *state = SessionState::Querying;
        Self { state, resume }
    }
}

impl Drop for QueryingGuard<'_> {
    fn drop(&mut self) {
        *self.state = self.resume;
    }
}
