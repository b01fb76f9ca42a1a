pub mod duration;
pub mod retry;

use crate::constants::{
    DEFAULT_EVENTS_PATH, DEFAULT_SEARCH_PATH, DEFAULT_SERVER_URL,
};

use retry::RetryPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Everything a proximity search session needs to reach its collaborators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server: ServerEndpoint,
    pub query: QueryConfig,
    pub stream: StreamConfig,
    pub location: LocationDefaults,
    pub discovery: DiscoveryConfig,
}

/// Where the query and stream services live.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerEndpoint {
    /// Scheme, host and optional port, without a trailing path.
    pub base_url: String,
    /// One-shot proximity query route.
    pub search_path: String,
    /// Server-sent events route for newly registered devs.
    pub events_path: String,
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_SERVER_URL.to_string(),
            search_path: DEFAULT_SEARCH_PATH.to_string(),
            events_path: DEFAULT_EVENTS_PATH.to_string(),
        }
    }
}

/// Timeout and retry applied to the proximity query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Per-attempt deadline. A hung request counts as a retryable failure.
    #[serde(with = "duration")]
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            retry: RetryPolicy::default(),
        }
    }
}

/// Reconnect behaviour of the live subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    pub retry: RetryPolicy,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            retry: RetryPolicy::new(
                10,
                Duration::from_secs(1),
                Duration::from_secs(30),
            ),
        }
    }
}

/// How an initial position fix is turned into a viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationDefaults {
    pub latitude_span: f64,
    pub longitude_span: f64,
    pub high_accuracy: bool,
}

impl Default for LocationDefaults {
    fn default() -> Self {
        Self {
            latitude_span: 0.04,
            longitude_span: 0.04,
            high_accuracy: true,
        }
    }
}

/// What happens when the stream pushes a dev that is already in the set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscoveryPolicy {
    /// Append every push, duplicates included.
    #[default]
    Append,
    /// Replace the existing entry with the same id in place.
    MergeById,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub policy: DiscoveryPolicy,
}
