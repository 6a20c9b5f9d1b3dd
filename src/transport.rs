use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tokio::time::sleep;

use crate::config::GeminiConfig;
use crate::error::{FaithGuidanceError, Result};
use crate::models::{GenerateContentRequest, GenerateContentResponse};
use crate::retry::RetryPolicy;

#[async_trait]
pub trait Transport: Send + Sync {
    async fn generate(&self, req: &GenerateContentRequest) -> Result<GenerateContentResponse>;
}

/// Why a single attempt failed, and whether trying again could help.
#[derive(Debug)]
struct AttemptFailure {
    transient: bool,
    message: String,
}

impl AttemptFailure {
    fn transient(message: String) -> Self {
        Self {
            transient: true,
            message,
        }
    }

    fn permanent(message: String) -> Self {
        Self {
            transient: false,
            message,
        }
    }
}

pub struct GeminiTransport {
    client: Client,
    endpoint: String,
    api_key: String,
    retry: RetryPolicy,
}

impl GeminiTransport {
    pub fn new(cfg: &GeminiConfig, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(cfg.timeout())
            .build()
            .map_err(|e| FaithGuidanceError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
            retry,
        })
    }

    async fn send_once(
        &self,
        req: &GenerateContentRequest,
    ) -> std::result::Result<GenerateContentResponse, AttemptFailure> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(req)
            .send()
            .await
            .map_err(|e| {
                let transient = e.is_connect() || e.is_timeout() || e.is_request();
                // The URL carries the API key; keep it out of messages and logs.
                let message = format!("Failed to send request to Gemini API: {}", e.without_url());
                if transient {
                    AttemptFailure::transient(message)
                } else {
                    AttemptFailure::permanent(message)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            let message = format!("Gemini API returned {status}: {body}");
            return Err(if is_transient_status(status) {
                AttemptFailure::transient(message)
            } else {
                AttemptFailure::permanent(message)
            });
        }

        response.json().await.map_err(|e| {
            // A stalled or cut-off body is a network problem, not a malformed reply.
            let transient = e.is_timeout() || e.is_body();
            let message = format!("Failed to read Gemini API response: {}", e.without_url());
            if transient {
                AttemptFailure::transient(message)
            } else {
                AttemptFailure::permanent(message)
            }
        })
    }
}

fn is_transient_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

#[async_trait]
impl Transport for GeminiTransport {
    async fn generate(&self, req: &GenerateContentRequest) -> Result<GenerateContentResponse> {
        let mut attempt = 0;

        loop {
            attempt += 1;

            match self.send_once(req).await {
                Ok(response) => return Ok(response),
                Err(failure) if failure.transient && self.retry.should_retry(attempt) => {
                    let delay = self.retry.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        "Transient Gemini failure, retrying: {}",
                        failure.message
                    );
                    sleep(delay).await;
                }
                Err(failure) => {
                    tracing::error!(attempt, "Gemini request failed: {}", failure.message);
                    return Err(FaithGuidanceError::GuidanceUnavailable(failure.message));
                }
            }
        }
    }
}
