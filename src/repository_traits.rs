use crate::error::Result;
use crate::models::{AuthUser, GuidanceRecord, SearchHistoryItem, UserProfile};
use async_trait::async_trait;

#[cfg(test)]
use mockall::automock;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait HistoryRepository: Send + Sync + 'static {
    /// Persist both halves of one exchange. `record.user_id` owns the history item.
    async fn save_exchange(&self, record: &GuidanceRecord, item: &SearchHistoryItem) -> Result<()>;
    async fn get_guidance(&self, id: &str) -> Result<Option<GuidanceRecord>>;
    async fn get_history_item(&self, user_id: &str, id: &str) -> Result<Option<SearchHistoryItem>>;
    /// Newest first.
    async fn list_history(&self, user_id: &str, limit: usize) -> Result<Vec<SearchHistoryItem>>;
    /// Returns false when the user has no such history item.
    async fn set_favorite(&self, user_id: &str, id: &str, is_favorite: bool) -> Result<bool>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait SessionVerifier: Send + Sync + 'static {
    async fn verify(&self, token: &str) -> Result<Option<AuthUser>>;
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync + 'static {
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>>;
    /// Replaces the whole profile.
    async fn save_profile(&self, user_id: &str, profile: &UserProfile) -> Result<()>;
}
