use std::sync::Arc;

use devradar_config::{DiscoveryPolicy, LocationDefaults};
use devradar_model::{DevId, FilterTerm, GeoRegion, SubscriptionScope};
use devradar_session::infrastructure::testing::{
    StreamCall, StubLocationPlatform, StubSearchService, StubStreamService, sample_dev,
};
use devradar_session::{
    EventOutcome, LocationProvider, SessionController, SessionError, SessionOptions, SessionState,
};

struct Harness {
    session: SessionController,
    search: StubSearchService,
    stream: StubStreamService,
}

fn harness() -> Harness {
    let search = StubSearchService::new();
    let stream = StubStreamService::new();
    let session = SessionController::new(
        Arc::new(search.clone()),
        Arc::new(stream.clone()),
        SessionOptions::default(),
    );
    Harness {
        session,
        search,
        stream,
    }
}

fn ids(session: &SessionController) -> Vec<DevId> {
    session.discovered().ids()
}

fn id(raw: &str) -> DevId {
    DevId::from(raw)
}

#[test]
fn region_changes_are_last_write_wins() {
    let mut h = harness();
    let regions = [
        GeoRegion::new(1.0, 1.0, 0.04, 0.04),
        GeoRegion::new(2.0, -3.0, 0.5, 0.5),
        GeoRegion::new(-45.0, 170.0, 0.01, 0.02),
    ];

    for region in regions {
        h.session.on_region_changed(region);
        assert_eq!(h.session.region(), Some(&region));
    }

    assert_eq!(h.session.region(), regions.last());
    assert_eq!(h.session.state(), SessionState::Idle);
    assert!(h.search.calls().is_empty());
    assert!(h.stream.calls().is_empty());
}

#[tokio::test]
async fn search_without_region_is_a_no_op() {
    let mut h = harness();
    h.session.on_filter_changed("rust");

    assert_eq!(h.session.search().await, Err(SessionError::RegionUnknown));
    assert_eq!(h.session.state(), SessionState::Uninitialized);
    assert_eq!(h.search.call_count(), 0);
    assert!(h.stream.calls().is_empty());
    assert!(h.session.discovered().is_empty());
}

#[tokio::test]
async fn successful_search_replaces_discovered_devs_wholesale() {
    let mut h = harness();
    h.session.on_region_changed(GeoRegion::new(10.0, 20.0, 0.04, 0.04));

    h.search.respond_with(vec![sample_dev("old", 10.0, 20.0)]);
    h.session.search().await.unwrap();
    h.session.on_entity_pushed(sample_dev("pushed", 10.0, 20.0));
    assert_eq!(ids(&h.session), [id("old"), id("pushed")]);

    h.search
        .respond_with(vec![sample_dev("a", 10.0, 20.0), sample_dev("b", 10.0, 20.0)]);
    assert_eq!(h.session.search().await, Ok(2));
    assert_eq!(ids(&h.session), [id("a"), id("b")]);
}

#[tokio::test]
async fn unscripted_searches_answer_with_the_fallback() {
    let mut h = harness();
    h.session.on_region_changed(GeoRegion::new(10.0, 20.0, 0.04, 0.04));
    h.search.set_fallback(vec![sample_dev("steady", 10.0, 20.0)]);
    h.search.respond_with(vec![sample_dev("once", 10.0, 20.0)]);

    assert_eq!(h.session.search().await, Ok(1));
    assert_eq!(ids(&h.session), [id("once")]);
    for _ in 0..2 {
        assert_eq!(h.session.search().await, Ok(1));
        assert_eq!(ids(&h.session), [id("steady")]);
    }
    assert_eq!(h.search.call_count(), 3);
}

#[tokio::test]
async fn subscription_uses_scope_at_search_time() {
    let mut h = harness();
    h.session.on_region_changed(GeoRegion::new(10.0, 20.0, 0.04, 0.04));
    h.session.on_filter_changed("go");
    h.session.search().await.unwrap();

    h.session.on_region_changed(GeoRegion::new(11.0, 21.0, 0.04, 0.04));
    h.session.on_filter_changed("python");

    let (active, scope) = h.session.active_subscription().unwrap();
    assert_eq!(scope, &SubscriptionScope::new(10.0, 20.0, "go"));
    assert_eq!(h.stream.active(), [active]);
    assert_eq!(
        h.stream.scope_of(active),
        Some(SubscriptionScope::new(10.0, 20.0, "go"))
    );
    assert_eq!(h.search.calls(), [SubscriptionScope::new(10.0, 20.0, "go")]);

    // Edits only apply to the next explicit search.
    h.session.search().await.unwrap();
    let (_, scope) = h.session.active_subscription().unwrap();
    assert_eq!(scope, &SubscriptionScope::new(11.0, 21.0, "python"));
    assert_eq!(h.stream.active().len(), 1);
}

#[tokio::test]
async fn second_search_closes_first_subscription_before_opening_next() {
    let mut h = harness();
    h.session.on_region_changed(GeoRegion::new(10.0, 20.0, 0.04, 0.04));
    h.session.search().await.unwrap();
    let first = h.stream.latest().unwrap();

    // Already queued when the second search starts.
    h.stream.push(first, sample_dev("late", 10.0, 20.0));

    h.session.search().await.unwrap();
    let second = h.stream.latest().unwrap();
    assert_ne!(first, second);

    // And one more from the closed channel after the fact.
    h.stream.push(first, sample_dev("later", 10.0, 20.0));
    h.stream.push(second, sample_dev("fresh", 10.0, 20.0));

    let outcomes = h.session.drain_pending();
    assert_eq!(
        outcomes,
        [
            EventOutcome::Stale(first),
            EventOutcome::Stale(first),
            EventOutcome::Appended(id("fresh")),
        ]
    );
    assert_eq!(ids(&h.session), [id("fresh")]);

    let calls = h.stream.calls();
    let close_first = calls
        .iter()
        .position(|call| call == &StreamCall::Close { id: first })
        .unwrap();
    let open_second = calls
        .iter()
        .position(|call| matches!(call, StreamCall::Open { id, .. } if *id == second))
        .unwrap();
    assert!(close_first < open_second);
    assert_eq!(h.stream.active(), [second]);
}

#[tokio::test]
async fn pushes_append_in_call_order_across_edits() {
    let mut h = harness();
    h.session.on_region_changed(GeoRegion::new(10.0, 20.0, 0.04, 0.04));

    let far_away = sample_dev("p2", -60.0, 100.0);
    h.session.on_entity_pushed(sample_dev("p1", 10.0, 20.0));
    h.session.on_filter_changed("zig");
    h.session.on_entity_pushed(far_away);
    h.session
        .on_region_changed(GeoRegion::new(0.0, 0.0, 1.0, 1.0));
    h.session.on_entity_pushed(sample_dev("p1", 10.0, 20.0));
    h.session.on_entity_pushed(sample_dev("p3", 0.0, 0.0));

    assert_eq!(ids(&h.session), [id("p1"), id("p2"), id("p1"), id("p3")]);
    assert_eq!(h.session.filter(), &FilterTerm::from("zig"));
    assert_eq!(h.session.state(), SessionState::Idle);
}

#[tokio::test]
async fn merge_policy_keeps_one_entry_per_id() {
    let search = StubSearchService::new();
    let stream = StubStreamService::new();
    let mut session = SessionController::new(
        Arc::new(search),
        Arc::new(stream),
        SessionOptions {
            discovery_policy: DiscoveryPolicy::MergeById,
            ..SessionOptions::default()
        },
    );

    session.on_entity_pushed(sample_dev("a", 0.0, 0.0));
    session.on_entity_pushed(sample_dev("b", 0.0, 0.0));
    let outcome = session.on_entity_pushed(sample_dev("a", 1.0, 1.0));

    assert_eq!(outcome, EventOutcome::Merged(id("a")));
    assert_eq!(ids(&session), [id("a"), id("b")]);
}

#[tokio::test]
async fn end_to_end_discovery_flow() {
    let mut h = harness();
    let provider = LocationProvider::new(
        Arc::new(StubLocationPlatform::granted_at(10.0, 20.0)),
        LocationDefaults::default(),
    );

    assert_eq!(h.session.region(), None);
    let region = h.session.activate(&provider).await.unwrap();
    assert_eq!(region, GeoRegion::new(10.0, 20.0, 0.04, 0.04));
    assert_eq!(h.session.region(), Some(&region));

    h.session.on_filter_changed("go,rust");
    h.search.respond_with(vec![sample_dev("1", 10.0, 20.0)]);
    assert_eq!(h.session.search().await, Ok(1));
    assert_eq!(ids(&h.session), [id("1")]);
    assert_eq!(h.session.state(), SessionState::Subscribed);

    let subscription = h.stream.latest().unwrap();
    assert_eq!(
        h.stream.calls(),
        [StreamCall::Open {
            id: subscription,
            scope: SubscriptionScope::new(10.0, 20.0, "go,rust"),
        }]
    );

    h.stream.announce_open(subscription);
    h.stream.push(subscription, sample_dev("2", 10.01, 20.01));

    assert_eq!(
        h.session.next_event().await,
        EventOutcome::Opened(subscription)
    );
    assert_eq!(
        h.session.next_event().await,
        EventOutcome::Appended(id("2"))
    );
    assert_eq!(ids(&h.session), [id("1"), id("2")]);
    assert_eq!(h.session.state(), SessionState::Subscribed);

    h.session.close();
    assert!(h.stream.active().is_empty());
}
