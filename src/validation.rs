use std::fmt;

use serde::Serialize;

use crate::config::ValidationConfig;
use crate::models::{FaithLevel, GuidanceForm, ProfileForm, Query, UserProfile};

/// One problem with one form field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub code: &'static str,
    pub message: String,
}

/// Every field problem found in a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: Vec<FieldError>,
}

impl ValidationErrors {
    fn push(&mut self, field: &'static str, code: &'static str, message: String) {
        self.fields.push(FieldError {
            field,
            code,
            message,
        });
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn fields(&self) -> &[FieldError] {
        &self.fields
    }

    pub fn into_fields(self) -> Vec<FieldError> {
        self.fields
    }

    pub fn has(&self, field: &str, code: &str) -> bool {
        self.fields
            .iter()
            .any(|e| e.field == field && e.code == code)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        f.write_str(&parts.join("; "))
    }
}

/// Checks a raw guidance form before anything leaves the process.
#[derive(Debug, Clone)]
pub struct QueryValidator {
    limits: ValidationConfig,
}

impl Default for QueryValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl QueryValidator {
    pub fn new(limits: ValidationConfig) -> Self {
        Self { limits }
    }

    pub fn validate(&self, form: &GuidanceForm) -> Result<Query, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let concern = form.concern.as_str();
        let concern_len = concern.chars().count();
        if concern.trim().is_empty() {
            errors.push(
                "concern",
                "too_short",
                "Your question cannot be blank.".to_string(),
            );
        } else if concern_len < self.limits.concern_min_chars {
            errors.push(
                "concern",
                "too_short",
                format!(
                    "Your question must be at least {} characters.",
                    self.limits.concern_min_chars
                ),
            );
        } else if concern_len > self.limits.concern_max_chars {
            errors.push(
                "concern",
                "too_long",
                format!(
                    "Your question must be at most {} characters.",
                    self.limits.concern_max_chars
                ),
            );
        }

        // Blank context is treated as no context at all.
        let context = form
            .context
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if let Some(ctx) = context {
            if ctx.chars().count() > self.limits.context_max_chars {
                errors.push(
                    "context",
                    "too_long",
                    format!(
                        "Additional context must be at most {} characters.",
                        self.limits.context_max_chars
                    ),
                );
            }
        }

        let faith_level = match form.faith_level.as_deref() {
            None => FaithLevel::default(),
            Some(raw) => match raw.parse::<FaithLevel>() {
                Ok(level) => level,
                Err(_) => {
                    errors.push(
                        "faithLevel",
                        "invalid_choice",
                        "Faith level must be one of: beginner, intermediate, advanced.".to_string(),
                    );
                    FaithLevel::default()
                }
            },
        };

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Query {
            concern: concern.to_string(),
            context: context.map(str::to_string),
            faith_level,
        })
    }
}

/// Checks the profile form. Absent faith level means beginner.
#[derive(Debug, Clone)]
pub struct ProfileValidator {
    limits: ValidationConfig,
}

impl Default for ProfileValidator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

impl ProfileValidator {
    pub fn new(limits: ValidationConfig) -> Self {
        Self { limits }
    }

    pub fn validate(&self, form: &ProfileForm) -> Result<UserProfile, ValidationErrors> {
        let mut errors = ValidationErrors::default();

        let name = form.display_name.as_str();
        if name.trim().is_empty() || name.chars().count() < self.limits.display_name_min_chars {
            errors.push(
                "displayName",
                "too_short",
                format!(
                    "Display name must be at least {} characters.",
                    self.limits.display_name_min_chars
                ),
            );
        }

        let faith_level = match form.faith_level.as_deref() {
            None => FaithLevel::Beginner,
            Some(raw) => raw.parse::<FaithLevel>().unwrap_or_else(|_| {
                errors.push(
                    "faithLevel",
                    "invalid_choice",
                    "Faith level must be one of: beginner, intermediate, advanced.".to_string(),
                );
                FaithLevel::Beginner
            }),
        };

        let bio = form.bio.as_deref().filter(|b| !b.trim().is_empty());
        if let Some(bio) = bio {
            if bio.chars().count() > self.limits.bio_max_chars {
                errors.push(
                    "bio",
                    "too_long",
                    format!("Bio must be at most {} characters.", self.limits.bio_max_chars),
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(UserProfile {
            display_name: name.to_string(),
            faith_level,
            interests: split_interests(form.interests.as_deref().unwrap_or_default()),
            bio: bio.map(str::to_string),
        })
    }
}

fn split_interests(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|i| !i.is_empty())
        .map(str::to_string)
        .collect()
}
