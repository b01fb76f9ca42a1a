//! Location provider
//!
//! Turns a one-off platform position fix into the initial [`GeoRegion`]. The
//! platform itself (permission prompt, GPS) is opaque and reached through
//! [`LocationPlatform`].

use async_trait::async_trait;
use devradar_config::LocationDefaults;
use devradar_model::{Coordinates, GeoRegion};
use std::sync::Arc;

use crate::error::LocationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Accuracy {
    High,
    Balanced,
}

/// Platform collaborator exposing the permission prompt and position fix.
#[async_trait]
pub trait LocationPlatform: Send + Sync {
    async fn request_permission(&self) -> PermissionStatus;

    async fn current_position(&self, accuracy: Accuracy) -> Result<Coordinates, LocationError>;
}

#[derive(Clone)]
pub struct LocationProvider {
    platform: Arc<dyn LocationPlatform>,
    defaults: LocationDefaults,
}

impl std::fmt::Debug for LocationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocationProvider")
            .field("defaults", &self.defaults)
            .finish_non_exhaustive()
    }
}

impl LocationProvider {
    pub fn new(platform: Arc<dyn LocationPlatform>, defaults: LocationDefaults) -> Self {
        Self { platform, defaults }
    }

    /// Ask for permission, take one fix and frame it with the configured span.
    pub async fn acquire_initial_position(&self) -> Result<GeoRegion, LocationError> {
        if self.platform.request_permission().await == PermissionStatus::Denied {
            log::info!("Location permission denied; nothing to show");
            return Err(LocationError::PermissionDenied);
        }

        let accuracy = if self.defaults.high_accuracy {
            Accuracy::High
        } else {
            Accuracy::Balanced
        };
        let fix = self.platform.current_position(accuracy).await?;

        let region = GeoRegion::around(
            fix,
            self.defaults.latitude_span,
            self.defaults.longitude_span,
        )
        .map_err(|err| LocationError::PositionUnavailable(err.to_string()))?;

        log::debug!("Initial region acquired: {}", region);
        Ok(region)
    }
}

/// Platform backed by a fixed, already known position.
///
/// Permission counts as granted exactly when a position is present, which is
/// how the terminal front end maps "no coordinates given" onto a denied prompt.
#[derive(Debug, Clone, Default)]
pub struct StaticLocation {
    position: Option<Coordinates>,
}

impl StaticLocation {
    pub fn new(position: Option<Coordinates>) -> Self {
        Self { position }
    }

    pub fn at(position: Coordinates) -> Self {
        Self {
            position: Some(position),
        }
    }
}

#[async_trait]
impl LocationPlatform for StaticLocation {
    async fn request_permission(&self) -> PermissionStatus {
        if self.position.is_some() {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinates, LocationError> {
        self.position
            .ok_or_else(|| LocationError::PositionUnavailable("no position configured".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn granted_fix_gets_default_span() {
        let platform = StaticLocation::at(Coordinates::new(10.0, 20.0).unwrap());
        let provider = LocationProvider::new(Arc::new(platform), LocationDefaults::default());
        let region = provider.acquire_initial_position().await.unwrap();
        assert_eq!(region, GeoRegion::new(10.0, 20.0, 0.04, 0.04));
    }

    #[tokio::test]
    async fn configured_span_is_applied() {
        let platform = StaticLocation::at(Coordinates::new(-23.5, -46.6).unwrap());
        let defaults = LocationDefaults {
            latitude_span: 0.5,
            longitude_span: 0.25,
            high_accuracy: false,
        };
        let provider = LocationProvider::new(Arc::new(platform), defaults);
        let region = provider.acquire_initial_position().await.unwrap();
        assert_eq!(region.latitude_span, 0.5);
        assert_eq!(region.longitude_span, 0.25);
    }

    #[tokio::test]
    async fn missing_position_is_a_denied_prompt() {
        let provider =
            LocationProvider::new(Arc::new(StaticLocation::default()), LocationDefaults::default());
        assert_eq!(
            provider.acquire_initial_position().await,
            Err(LocationError::PermissionDenied)
        );
    }
}
