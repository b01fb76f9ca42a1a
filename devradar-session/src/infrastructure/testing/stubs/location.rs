use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use devradar_model::Coordinates;

use crate::error::LocationError;
use crate::location::{Accuracy, LocationPlatform, PermissionStatus};

/// [`LocationPlatform`] with a fixed permission answer and fix.
#[derive(Debug, Clone)]
pub struct StubLocationPlatform {
    permission: PermissionStatus,
    fix: Result<Coordinates, LocationError>,
    prompts: Arc<AtomicUsize>,
    fixes: Arc<AtomicUsize>,
}

impl StubLocationPlatform {
    pub fn granted_at(latitude: f64, longitude: f64) -> Self {
        Self::new(
            PermissionStatus::Granted,
            Ok(Coordinates {
                latitude,
                longitude,
            }),
        )
    }

    pub fn denied() -> Self {
        Self::new(
            PermissionStatus::Denied,
            Err(LocationError::PermissionDenied),
        )
    }

    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::new(
            PermissionStatus::Granted,
            Err(LocationError::PositionUnavailable(reason.into())),
        )
    }

    fn new(permission: PermissionStatus, fix: Result<Coordinates, LocationError>) -> Self {
        Self {
            permission,
            fix,
            prompts: Arc::new(AtomicUsize::new(0)),
            fixes: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    pub fn fix_count(&self) -> usize {
        self.fixes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationPlatform for StubLocationPlatform {
    async fn request_permission(&self) -> PermissionStatus {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        self.permission
    }

    async fn current_position(&self, _accuracy: Accuracy) -> Result<Coordinates, LocationError> {
        self.fixes.fetch_add(1, Ordering::SeqCst);
        self.fix.clone()
    }
}
