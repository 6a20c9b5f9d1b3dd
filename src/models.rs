use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How much theological background the answer may assume.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FaithLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl FaithLevel {
    pub const ALL: [FaithLevel; 3] = [
        FaithLevel::Beginner,
        FaithLevel::Intermediate,
        FaithLevel::Advanced,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FaithLevel::Beginner => "beginner",
            FaithLevel::Intermediate => "intermediate",
            FaithLevel::Advanced => "advanced",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FaithLevel::Beginner => "Beginner - New to Christianity",
            FaithLevel::Intermediate => "Intermediate - Familiar with basics",
            FaithLevel::Advanced => "Advanced - Deep theological knowledge",
        }
    }
}

impl fmt::Display for FaithLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FaithLevel {
    type Err = String;

    /// Exact lowercase match only.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FaithLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| format!("unknown faith level '{s}'"))
    }
}

/// Raw guidance form as submitted by a client, before validation.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceForm {
    #[serde(default)]
    pub concern: String,
    #[serde(default)]
    pub context: Option<String>,
    #[serde(default)]
    pub faith_level: Option<String>,
}

/// A validated question. Only the validator builds these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Query {
    pub concern: String,
    pub context: Option<String>,
    pub faith_level: FaithLevel,
}

/// Persisted query and answer pair, keyed by the shared exchange id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuidanceRecord {
    pub id: String,
    pub user_id: String,
    pub query: String,
    pub response: String,
    pub context: Option<String>,
    pub faith_level: FaithLevel,
    pub timestamp: DateTime<Utc>,
}

/// Per-user log entry written alongside a GuidanceRecord.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryItem {
    pub id: String,
    pub query: String,
    pub timestamp: DateTime<Utc>,
    pub is_favorite: bool,
    pub context: Option<String>,
    pub faith_level: FaithLevel,
}

/// Signed-in identity supplied by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthUser {
    pub uid: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Preferences kept from the profile page. A stored faith level becomes the
/// default for guidance requests that omit one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    pub faith_level: FaithLevel,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
}

impl UserProfile {
    /// What a user sees before saving a profile.
    pub fn fresh(user: &AuthUser) -> Self {
        Self {
            display_name: user.display_name.clone().unwrap_or_default(),
            faith_level: FaithLevel::Beginner,
            interests: Vec::new(),
            bio: None,
        }
    }
}

/// Raw profile form; interests arrive comma separated.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub faith_level: Option<String>,
    #[serde(default)]
    pub interests: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

// Gemini generateContent request format
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

// Gemini generateContent response format
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

impl GenerateContentResponse {
    /// Text of the first part of the first candidate, if any.
    pub fn first_text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()?
            .text
            .as_deref()
    }
}
