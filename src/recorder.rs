use std::sync::Arc;

use chrono::Utc;

use crate::error::{FaithGuidanceError, Result};
use crate::models::{GuidanceRecord, Query, SearchHistoryItem};
use crate::repository_traits::HistoryRepository;

/// Writes the GuidanceRecord and SearchHistoryItem for one exchange.
pub struct HistoryRecorder {
    repository: Arc<dyn HistoryRepository>,
}

impl HistoryRecorder {
    pub fn new(repository: Arc<dyn HistoryRepository>) -> Self {
        Self { repository }
    }

    /// Returns the generated id shared by both records.
    pub async fn record(&self, user_id: &str, query: &Query, response: &str) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let timestamp = Utc::now();

        let record = GuidanceRecord {
            id: id.clone(),
            user_id: user_id.to_string(),
            query: query.concern.clone(),
            response: response.to_string(),
            context: query.context.clone(),
            faith_level: query.faith_level,
            timestamp,
        };
        let item = SearchHistoryItem {
            id: id.clone(),
            query: query.concern.clone(),
            timestamp,
            is_favorite: false,
            context: query.context.clone(),
            faith_level: query.faith_level,
        };

        self.repository
            .save_exchange(&record, &item)
            .await
            .map_err(|e| {
                tracing::error!(record_id = %id, user_id, "Failed to record guidance: {}", e);
                FaithGuidanceError::Persistence(e.to_string())
            })?;

        tracing::info!(record_id = %id, user_id, "Recorded guidance exchange");
        Ok(id)
    }
}
