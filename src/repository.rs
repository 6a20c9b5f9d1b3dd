use async_trait::async_trait;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{AuthUser, GuidanceRecord, SearchHistoryItem, UserProfile};
use crate::redis::RedisManager;
use crate::repository_traits::{HistoryRepository, ProfileRepository, SessionVerifier};

fn guidance_key(id: &str) -> String {
    format!("guidance:{id}")
}

fn history_item_key(user_id: &str, id: &str) -> String {
    format!("users:{user_id}:searchHistory:{id}")
}

fn history_index_key(user_id: &str) -> String {
    format!("users:{user_id}:searchHistory")
}

fn session_key(token: &str) -> String {
    format!("sessions:{token}")
}

fn profile_key(user_id: &str) -> String {
    format!("users:{user_id}:profile")
}

/// Redis (RedisJSON) implementation of HistoryRepository
pub struct RedisHistoryRepository {
    redis: Arc<RedisManager>,
}

impl RedisHistoryRepository {
    pub fn new(redis: Arc<RedisManager>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl HistoryRepository for RedisHistoryRepository {
    async fn save_exchange(&self, record: &GuidanceRecord, item: &SearchHistoryItem) -> Result<()> {
        let record_json = serde_json::to_string(record)?;
        let item_json = serde_json::to_string(item)?;
        let score = item.timestamp.timestamp_millis();

        // One MULTI/EXEC so the two documents and the index land together.
        let mut pipe = redis::pipe();
        pipe.atomic()
            .cmd("JSON.SET")
            .arg(guidance_key(&record.id))
            .arg("$")
            .arg(record_json)
            .ignore()
            .cmd("JSON.SET")
            .arg(history_item_key(&record.user_id, &item.id))
            .arg("$")
            .arg(item_json)
            .ignore()
            .cmd("ZADD")
            .arg(history_index_key(&record.user_id))
            .arg(score)
            .arg(&item.id)
            .ignore();

        let mut conn = self.redis.get_connection().await?;
        let _: () = pipe.query_async(&mut conn).await?;

        tracing::debug!(
            record_id = %record.id,
            user_id = %record.user_id,
            "Stored guidance record and history item"
        );
        Ok(())
    }

    async fn get_guidance(&self, id: &str) -> Result<Option<GuidanceRecord>> {
        self.redis.json_get(&guidance_key(id), "$").await
    }

    async fn get_history_item(&self, user_id: &str, id: &str) -> Result<Option<SearchHistoryItem>> {
        self.redis.json_get(&history_item_key(user_id, id), "$").await
    }

    async fn list_history(&self, user_id: &str, limit: usize) -> Result<Vec<SearchHistoryItem>> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let ids = self
            .redis
            .zrevrange(&history_index_key(user_id), 0, limit as isize - 1)
            .await?;
        let keys: Vec<String> = ids.iter().map(|id| history_item_key(user_id, id)).collect();
        self.redis.json_mget(&keys).await
    }

    async fn set_favorite(&self, user_id: &str, id: &str, is_favorite: bool) -> Result<bool> {
        let key = history_item_key(user_id, id);
        if !self.redis.exists(&key).await? {
            return Ok(false);
        }
        self.redis.json_set(&key, "$.isFavorite", &is_favorite).await?;
        Ok(true)
    }
}

/// Resolves bearer tokens against session documents the auth provider writes.
pub struct RedisSessionVerifier {
    redis: Arc<RedisManager>,
}

impl RedisSessionVerifier {
    pub fn new(redis: Arc<RedisManager>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl SessionVerifier for RedisSessionVerifier {
    async fn verify(&self, token: &str) -> Result<Option<AuthUser>> {
        let user: Option<AuthUser> = self.redis.json_get(&session_key(token), "$").await?;
        Ok(user.filter(|u| !u.uid.is_empty()))
    }
}

pub struct RedisProfileRepository {
    redis: Arc<RedisManager>,
}

impl RedisProfileRepository {
    pub fn new(redis: Arc<RedisManager>) -> Self {
        Self { redis }
    }
}

#[async_trait]
impl ProfileRepository for RedisProfileRepository {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>> {
        self.redis.json_get(&profile_key(user_id), "$").await
    }

    async fn save_profile(&self, user_id: &str, profile: &UserProfile) -> Result<()> {
        self.redis.json_set(&profile_key(user_id), "$", profile).await?;
        tracing::debug!(user_id, "Stored user profile");
        Ok(())
    }
}
