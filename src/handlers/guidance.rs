use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::{Extension, Json};
use serde::{Deserialize, Serialize};

use super::AppState;
use crate::error::{FaithGuidanceError, Result};
use crate::models::{AuthUser, FaithLevel, GuidanceForm, GuidanceRecord};
use crate::render::{RenderedLine, ResponseView};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub guidance: String,
    pub lines: Vec<RenderedLine>,
    pub persisted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RenderRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct RenderResponse {
    pub lines: Vec<RenderedLine>,
}

pub async fn seek_guidance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<GuidanceForm>, JsonRejection>,
) -> Result<Json<GuidanceResponse>> {
    let Json(mut form) = payload?;
    tracing::info!(user_id = %user.uid, "Guidance requested");

    if form.faith_level.is_none() {
        form.faith_level = stored_faith_level(&state, &user.uid)
            .await
            .map(|level| level.as_str().to_string());
    }

    let outcome = state.service.seek(&user.uid, &form).await?;
    let persisted = outcome.record_id.is_some();
    let notice = outcome
        .persistence_error
        .map(|_| "Guidance received, but it could not be saved to your history".to_string());

    let lines = ResponseView::new(outcome.guidance.as_str()).into_lines();
    Ok(Json(GuidanceResponse {
        id: outcome.record_id,
        guidance: outcome.guidance,
        lines,
        persisted,
        notice,
    }))
}

/// Profile lookup failures only cost the user their preferred default.
async fn stored_faith_level(state: &AppState, user_id: &str) -> Option<FaithLevel> {
    match state.profiles.get_profile(user_id).await {
        Ok(profile) => profile.map(|p| p.faith_level),
        Err(e) => {
            tracing::warn!(user_id, "Failed to load profile for faith level default: {}", e);
            None
        }
    }
}

pub async fn get_guidance(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<GuidanceRecord>> {
    match state.repository.get_guidance(&id).await? {
        Some(record) if record.user_id == user.uid => Ok(Json(record)),
        // Records owned by someone else look the same as missing ones.
        _ => Err(FaithGuidanceError::NotFound(format!("guidance {id}"))),
    }
}

pub async fn render_guidance(
    payload: std::result::Result<Json<RenderRequest>, JsonRejection>,
) -> Result<Json<RenderResponse>> {
    let Json(req) = payload?;
    Ok(Json(RenderResponse {
        lines: ResponseView::new(req.text).into_lines(),
    }))
}
