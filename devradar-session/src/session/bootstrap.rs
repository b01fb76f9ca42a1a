use std::sync::Arc;

use devradar_config::ClientConfig;

use crate::error::SessionError;
use crate::infrastructure::ApiClient;
use crate::infrastructure::services::search::{SearchApiAdapter, SearchService};
use crate::infrastructure::services::sse::SseStreamService;
use crate::infrastructure::services::stream::StreamService;
use crate::location::{LocationPlatform, LocationProvider};
use crate::session::controller::{SessionController, SessionOptions};

/// Wire a session against the HTTP services named in `config`.
pub fn build_session(config: &ClientConfig) -> Result<SessionController, SessionError> {
    let client = Arc::new(ApiClient::new(
        config.server.base_url.as_str(),
        config.query.timeout,
    )?);

    let events_url = client.build_url(&config.server.events_path);
    let search_service: Arc<dyn SearchService> = Arc::new(SearchApiAdapter::new(
        Arc::clone(&client),
        config.server.search_path.clone(),
    ));
    let stream_service: Arc<dyn StreamService> =
        Arc::new(SseStreamService::new(events_url, config.stream.retry)?);

    log::info!(
        "Session wired to {} (search {}, events {})",
        client.base_url(),
        config.server.search_path,
        config.server.events_path
    );

    Ok(SessionController::new(
        search_service,
        stream_service,
        SessionOptions::from_config(config),
    ))
}

pub fn location_provider(
    platform: Arc<dyn LocationPlatform>,
    config: &ClientConfig,
) -> LocationProvider {
    LocationProvider::new(platform, config.location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::SessionState;

    #[tokio::test]
    async fn builds_uninitialized_session_from_defaults() {
        let session = build_session(&ClientConfig::default()).unwrap();
        assert_eq!(session.state(), SessionState::Uninitialized);
        assert_eq!(session.options(), &SessionOptions::default());
    }
}
