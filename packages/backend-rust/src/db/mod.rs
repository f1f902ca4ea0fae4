//! Storage collaborator behind a single `ProgressStore` capability.
//! Guest sessions run on [`memory::MemoryStore`], signed-in users on
//! [`sqlite::SqliteStore`]; the settlement services only ever see the
//! trait, so the scoring path is exercised once for both.

pub mod memory;
pub mod seed;
pub mod sqlite;

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use berean_engine::types::{AchievementRule, ExperienceState, HeartState, StreakState};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("content not found: {0}")]
    ContentNotFound(String),
    #[error("corrupt record: {0}")]
    Corrupt(String),
    #[error("database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    Lesson,
    Challenge,
    Milestone,
}

impl ContentKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lesson" => Some(Self::Lesson),
            "challenge" => Some(Self::Challenge),
            "milestone" => Some(Self::Milestone),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Lesson => "lesson",
            Self::Challenge => "challenge",
            Self::Milestone => "milestone",
        }
    }
}

/// A lesson, daily-challenge question set or mastery-path milestone as
/// authored in content. Read-only to the services; reward fields are
/// validated non-negative at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentRecord {
    pub id: String,
    pub kind: ContentKind,
    pub title: String,
    pub base_xp_reward: u32,
    pub base_coin_reward: u32,
    pub required_score_percent: Option<u32>,
    pub question_count: u32,
}

/// Persisted per-user economy and progress counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    #[serde(flatten)]
    pub experience: ExperienceState,
    pub coins: u32,
    pub hearts: HeartState,
    #[serde(flatten)]
    pub streak: StreakState,
    pub lessons_completed: u32,
    pub perfect_lessons: u32,
}

impl UserProfile {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            experience: ExperienceState::default(),
            coins: 0,
            hearts: HeartState::full(now),
            streak: StreakState::default(),
            lessons_completed: 0,
            perfect_lessons: 0,
        }
    }
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Load the profile, creating a fresh one (full hearts, level 1)
    /// on first sight of the user id.
    async fn load_or_create_profile(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError>;

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError>;

    async fn content(&self, content_id: &str) -> Result<ContentRecord, StoreError>;

    async fn achievement_rules(&self) -> Result<Vec<AchievementRule>, StoreError>;

    async fn unlocked_achievements(&self, user_id: &str) -> Result<HashSet<String>, StoreError>;

    /// Record unlocks. Storage enforces uniqueness, so re-recording an
    /// already-unlocked id is a no-op.
    async fn record_unlocks(
        &self,
        user_id: &str,
        achievement_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}
