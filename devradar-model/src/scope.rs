use crate::{filter::FilterTerm, geo::GeoRegion};

/// The `(center, filter)` pair a query or subscription is scoped to.
///
/// Captured by value when a search starts, so later region or filter edits do
/// not leak into an already issued query or an open subscription.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SubscriptionScope {
    pub latitude: f64,
    pub longitude: f64,
    pub techs: FilterTerm,
}

impl SubscriptionScope {
    pub fn new(latitude: f64, longitude: f64, techs: impl Into<FilterTerm>) -> Self {
        Self {
            latitude,
            longitude,
            techs: techs.into(),
        }
    }

    /// Scope for the center of `region` and the raw `filter`.
    pub fn from_region(region: &GeoRegion, filter: &FilterTerm) -> Self {
        Self {
            latitude: region.center_latitude,
            longitude: region.center_longitude,
            techs: filter.clone(),
        }
    }

    /// Query-string pairs shared by the search and events endpoints.
    pub fn query_pairs(&self) -> [(&'static str, String); 3] {
        [
            ("latitude", self.latitude.to_string()),
            ("longitude", self.longitude.to_string()),
            ("techs", self.techs.as_str().to_string()),
        ]
    }
}
