use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query as QueryParams, State};
use axum::{Extension, Json};
use serde::Deserialize;

use super::AppState;
use crate::error::{FaithGuidanceError, Result};
use crate::models::{AuthUser, SearchHistoryItem};

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteRequest {
    pub is_favorite: bool,
}

pub async fn list_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    QueryParams(params): QueryParams<HistoryParams>,
) -> Result<Json<Vec<SearchHistoryItem>>> {
    let limit = state.config.history_limit(params.limit);
    let items = state.repository.list_history(&user.uid, limit).await?;
    tracing::debug!(user_id = %user.uid, count = items.len(), "Listed search history");
    Ok(Json(items))
}

pub async fn set_favorite(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    payload: std::result::Result<Json<FavoriteRequest>, JsonRejection>,
) -> Result<Json<SearchHistoryItem>> {
    let Json(req) = payload?;
    if !state
        .repository
        .set_favorite(&user.uid, &id, req.is_favorite)
        .await?
    {
        return Err(FaithGuidanceError::NotFound(format!("history item {id}")));
    }

    state
        .repository
        .get_history_item(&user.uid, &id)
        .await?
        .map(Json)
        .ok_or_else(|| FaithGuidanceError::NotFound(format!("history item {id}")))
}
