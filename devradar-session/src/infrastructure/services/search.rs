use async_trait::async_trait;
use devradar_model::{Dev, SearchResponse, SubscriptionScope};
use std::sync::Arc;

use crate::error::QueryError;
use crate::infrastructure::api_client::ApiClient;

/// One-shot proximity query.
#[async_trait]
pub trait SearchService: Send + Sync {
    /// Devs near the scope's center matching its raw tech filter.
    async fn search(&self, scope: &SubscriptionScope) -> Result<Vec<Dev>, QueryError>;
}

#[derive(Debug, Clone)]
pub struct SearchApiAdapter {
    client: Arc<ApiClient>,
    path: String,
}

impl SearchApiAdapter {
    pub fn new(client: Arc<ApiClient>, path: impl Into<String>) -> Self {
        Self {
            client,
            path: path.into(),
        }
    }
}

#[async_trait]
impl SearchService for SearchApiAdapter {
    async fn search(&self, scope: &SubscriptionScope) -> Result<Vec<Dev>, QueryError> {
        let response: SearchResponse = self
            .client
            .get_json(&self.path, &scope.query_pairs())
            .await?;
        log::debug!("Search returned {} devs", response.devs.len());
        Ok(response.devs)
    }
}
