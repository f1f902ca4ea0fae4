//! In-memory `ProgressStore` for guest sessions and tests. Progress
//! lives only as long as the process; signing in moves the user to the
//! sqlite-backed store.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use berean_engine::types::AchievementRule;

use super::{seed, ContentRecord, ProgressStore, StoreError, UserProfile};

#[derive(Default)]
pub struct MemoryStore {
    profiles: RwLock<HashMap<String, UserProfile>>,
    contents: RwLock<HashMap<String, ContentRecord>>,
    rules: RwLock<Vec<AchievementRule>>,
    unlocks: RwLock<HashMap<String, HashSet<String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with the default lessons and achievement
    /// definitions.
    pub fn with_defaults() -> Self {
        let store = Self::new();
        {
            let mut contents = store.contents.try_write().expect("fresh store");
            for record in seed::default_contents() {
                contents.insert(record.id.clone(), record);
            }
            let mut rules = store.rules.try_write().expect("fresh store");
            *rules = seed::default_achievement_rules();
        }
        store
    }

    pub async fn insert_content(&self, record: ContentRecord) {
        self.contents
            .write()
            .await
            .insert(record.id.clone(), record);
    }

    pub async fn insert_rule(&self, rule: AchievementRule) {
        self.rules.write().await.push(rule);
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn load_or_create_profile(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError> {
        let mut profiles = self.profiles.write().await;
        Ok(profiles
            .entry(user_id.to_string())
            .or_insert_with(|| UserProfile::new(user_id, now))
            .clone())
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        self.profiles
            .write()
            .await
            .insert(profile.id.clone(), profile.clone());
        Ok(())
    }

    async fn content(&self, content_id: &str) -> Result<ContentRecord, StoreError> {
        self.contents
            .read()
            .await
            .get(content_id)
            .cloned()
            .ok_or_else(|| StoreError::ContentNotFound(content_id.to_string()))
    }

    async fn achievement_rules(&self) -> Result<Vec<AchievementRule>, StoreError> {
        Ok(self.rules.read().await.clone())
    }

    async fn unlocked_achievements(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        Ok(self
            .unlocks
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn record_unlocks(
        &self,
        user_id: &str,
        achievement_ids: &[String],
        _now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut unlocks = self.unlocks.write().await;
        let entry = unlocks.entry(user_id.to_string()).or_default();
        for id in achievement_ids {
            entry.insert(id.clone());
        }
        Ok(())
    }
}
