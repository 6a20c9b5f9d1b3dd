pub mod auth;
pub mod config;
pub mod error;
pub mod guidance;
pub mod handlers;
pub mod models;
pub mod recorder;
pub mod redis;
pub mod render;
pub mod repository;
pub mod repository_traits;
pub mod retry;
pub mod transport;
pub mod validation;

use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::error::{FaithGuidanceError, Result};
use crate::guidance::GuidanceClient;
use crate::models::{GuidanceForm, Query};
use crate::recorder::HistoryRecorder;
use crate::repository_traits::HistoryRepository;
use crate::retry::RetryPolicy;
use crate::transport::{GeminiTransport, Transport};
use crate::validation::QueryValidator;

/// Result of one guidance exchange.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceOutcome {
    /// None when the history write failed.
    pub record_id: Option<String>,
    pub guidance: String,
    pub persistence_error: Option<String>,
}

/// Validate, ask, record.
pub struct GuidanceService {
    validator: QueryValidator,
    client: GuidanceClient,
    recorder: HistoryRecorder,
}

impl GuidanceService {
    pub fn new(
        validator: QueryValidator,
        client: GuidanceClient,
        recorder: HistoryRecorder,
    ) -> Self {
        Self {
            validator,
            client,
            recorder,
        }
    }

    pub fn from_config(cfg: &Config, repository: Arc<dyn HistoryRepository>) -> Result<Self> {
        let transport = Arc::new(GeminiTransport::new(
            &cfg.gemini,
            RetryPolicy::from(&cfg.retry),
        )?);

        Ok(Self::new(
            QueryValidator::new(cfg.validation.clone()),
            GuidanceClient::from_config(transport as Arc<dyn Transport>, &cfg.gemini),
            HistoryRecorder::new(repository),
        ))
    }

    pub fn validate(&self, form: &GuidanceForm) -> Result<Query> {
        Ok(self.validator.validate(form)?)
    }

    pub async fn seek(&self, user_id: &str, form: &GuidanceForm) -> Result<GuidanceOutcome> {
        let query = self.validate(form)?;
        let guidance = self.client.request_guidance(&query).await?;

        // The answer is returned even when history could not be written.
        match self.recorder.record(user_id, &query, &guidance).await {
            Ok(id) => Ok(GuidanceOutcome {
                record_id: Some(id),
                guidance,
                persistence_error: None,
            }),
            Err(FaithGuidanceError::Persistence(detail)) => Ok(GuidanceOutcome {
                record_id: None,
                guidance,
                persistence_error: Some(detail),
            }),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::guidance::tests::MockTransport;

    pub(crate) fn service_with(
        transport: MockTransport,
        repository: Arc<dyn HistoryRepository>,
    ) -> GuidanceService {
        GuidanceService::new(
            QueryValidator::default(),
            GuidanceClient::from_config(Arc::new(transport), &Config::default().gemini),
            HistoryRecorder::new(repository),
        )
    }
}
