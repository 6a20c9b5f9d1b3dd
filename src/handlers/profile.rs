use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::{Extension, Json};
use serde::Serialize;

use super::AppState;
use crate::error::Result;
use crate::models::{AuthUser, FaithLevel, ProfileForm, UserProfile};
use crate::validation::ProfileValidator;

#[derive(Debug, Serialize)]
pub struct FaithLevelOption {
    pub value: FaithLevel,
    pub label: &'static str,
}

pub async fn list_faith_levels() -> Json<Vec<FaithLevelOption>> {
    Json(
        FaithLevel::ALL
            .into_iter()
            .map(|level| FaithLevelOption {
                value: level,
                label: level.label(),
            })
            .collect(),
    )
}

pub async fn get_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state
        .profiles
        .get_profile(&user.uid)
        .await?
        .unwrap_or_else(|| UserProfile::fresh(&user));
    Ok(Json(profile))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    payload: std::result::Result<Json<ProfileForm>, JsonRejection>,
) -> Result<Json<UserProfile>> {
    let Json(form) = payload?;
    let profile = ProfileValidator::new(state.config.validation.clone()).validate(&form)?;
    state.profiles.save_profile(&user.uid, &profile).await?;
    tracing::info!(user_id = %user.uid, faith_level = %profile.faith_level, "Profile updated");
    Ok(Json(profile))
}
