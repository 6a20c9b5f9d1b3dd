use std::sync::Arc;

use crate::config::GeminiConfig;
use crate::error::{FaithGuidanceError, Result};
use crate::models::{Content, GenerateContentRequest, GenerationConfig, Part, Query};
use crate::transport::Transport;

/// Turns a validated query into a prompt and asks the generative endpoint.
pub struct GuidanceClient {
    tx: Arc<dyn Transport>,
    generation: GenerationConfig,
}

impl GuidanceClient {
    pub fn new(tx: Arc<dyn Transport>, generation: GenerationConfig) -> Self {
        Self { tx, generation }
    }

    pub fn from_config(tx: Arc<dyn Transport>, cfg: &GeminiConfig) -> Self {
        Self::new(
            tx,
            GenerationConfig {
                temperature: cfg.temperature,
                top_k: cfg.top_k,
                top_p: cfg.top_p,
                max_output_tokens: cfg.max_output_tokens,
            },
        )
    }

    pub fn build_prompt(query: &Query) -> String {
        let mut prompt = format!(
            "You are a Christian spiritual advisor helping someone with the following concern: \"{}\".\n",
            query.concern
        );
        if let Some(context) = &query.context {
            prompt.push_str(&format!("Additional context: {context}\n"));
        }
        prompt.push_str(&format!(
            "Faith knowledge level: {}\n\n",
            query.faith_level
        ));
        prompt.push_str(
            r#"Please provide comprehensive biblical guidance that includes:
1. At least 10 relevant Bible passages with their references
2. A brief contextual interpretation for each passage
3. Practical application suggestions for daily life
4. Historical or theological context where relevant

Format your response in a structured, easy-to-read way.
Ensure all guidance aligns with mainstream Christian doctrine and values."#,
        );
        prompt
    }

    pub fn build_request(&self, query: &Query) -> GenerateContentRequest {
        GenerateContentRequest {
            contents: vec![Content {
                role: None,
                parts: vec![Part {
                    text: Some(Self::build_prompt(query)),
                }],
            }],
            generation_config: self.generation,
        }
    }

    /// Ask for guidance; returns the first candidate's text verbatim.
    pub async fn request_guidance(&self, query: &Query) -> Result<String> {
        tracing::info!(
            faith_level = %query.faith_level,
            has_context = query.context.is_some(),
            "Requesting guidance from Gemini"
        );

        let request = self.build_request(query);
        let response = self.tx.generate(&request).await?;

        match response.first_text() {
            Some(text) if !text.trim().is_empty() => Ok(text.to_string()),
            Some(_) => Err(FaithGuidanceError::GuidanceUnavailable(
                "Gemini API returned empty guidance text".to_string(),
            )),
            None => Err(FaithGuidanceError::GuidanceUnavailable(format!(
                "Gemini API returned no usable candidates ({} received)",
                response.candidates.len()
            ))),
        }
    }
}
