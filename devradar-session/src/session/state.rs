use devradar_model::{Dev, DevId, FilterTerm, GeoRegion, SubscriptionScope};
use std::fmt;

use crate::infrastructure::services::stream::SubscriptionId;

/// Control state of a proximity search session.
///
/// `Uninitialized` holds exactly while no region is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Idle,
    Querying,
    Subscribed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            SessionState::Uninitialized => "uninitialized",
            SessionState::Idle => "idle",
            SessionState::Querying => "querying",
            SessionState::Subscribed => "subscribed",
        };
        f.write_str(label)
    }
}

/// Result of applying one stream event to the session.
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    Opened(SubscriptionId),
    Appended(DevId),
    /// Replaced an existing entry (merge-by-id policy only).
    Merged(DevId),
    /// Event from a subscription that is no longer the active one; dropped.
    Stale(SubscriptionId),
    /// The active subscription gave up.
    Ended {
        subscription: SubscriptionId,
        reason: String,
    },
}

/// Read-only view of the session for front ends and logs.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub region: Option<GeoRegion>,
    pub filter: FilterTerm,
    pub subscription: Option<(SubscriptionId, SubscriptionScope)>,
    pub discovered: usize,
}

const GITHUB_PROFILE_BASE: &str = "https://github.com/";

/// Where selecting a dev's callout leads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileLink {
    pub dev_id: DevId,
    pub github_username: String,
    pub url: String,
}

impl ProfileLink {
    /// `None` when the dev has no (or a blank) github username.
    pub fn for_dev(dev: &Dev) -> Option<Self> {
        let username = dev.github_username.as_deref()?.trim();
        if username.is_empty() {
            return None;
        }
        Some(Self {
            dev_id: dev.id.clone(),
            github_username: username.to_string(),
            url: format!("{GITHUB_PROFILE_BASE}{username}"),
        })
    }
}
