//! Settlement services. Each operation follows the same two-phase
//! contract: compute the outcome with the pure engine, persist the new
//! profile, then report. Nothing is persisted when a computation fails,
//! so a rejected request leaves the profile untouched.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use berean_engine::achievements;
use berean_engine::error::EngineError;
use berean_engine::hearts::{self, HeartConfig};
use berean_engine::rewards;
use berean_engine::streak;
use berean_engine::types::{AchievementContext, AchievementRule, QuizTally, StreakState};
use berean_engine::xp;

use crate::db::{ContentKind, ProgressStore, StoreError, UserProfile};

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("content '{content_id}' is a {actual}, expected {expected}")]
    WrongKind {
        content_id: String,
        expected: &'static str,
        actual: &'static str,
    },
}

/// What a finished attempt produced, in one payload: pass/fail, the
/// economy deltas, and any achievements that unlocked along the way.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionSummary {
    pub passed: bool,
    pub score_percent: u32,
    pub xp_earned: u32,
    pub coins_earned: u32,
    pub leveled_up: bool,
    pub new_level: u32,
    pub current_streak: u32,
    pub perfect: bool,
    pub new_achievements: Vec<AchievementRule>,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartStatus {
    pub hearts: u32,
    pub max_hearts: u32,
    pub seconds_to_next_heart: Option<i64>,
    pub coins: u32,
}

pub struct ProgressService {
    store: Arc<dyn ProgressStore>,
    heart_config: HeartConfig,
}

impl ProgressService {
    pub fn new(store: Arc<dyn ProgressStore>) -> Self {
        Self {
            store,
            heart_config: HeartConfig::default(),
        }
    }

    pub async fn profile(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, ServiceError> {
        Ok(self.store.load_or_create_profile(user_id, now).await?)
    }

    /// Settle a finished lesson or milestone attempt. A failed attempt
    /// (score below the content's threshold) still counts the day's
    /// activity nowhere: hearts were already spent per wrong answer
    /// during play, and no rewards, streak or counters move.
    pub async fn complete_lesson(
        &self,
        user_id: &str,
        content_id: &str,
        tally: QuizTally,
        now: DateTime<Utc>,
    ) -> Result<CompletionSummary, ServiceError> {
        let content = self.store.content(content_id).await?;
        if content.kind == ContentKind::Challenge {
            return Err(ServiceError::WrongKind {
                content_id: content_id.to_string(),
                expected: "lesson or milestone",
                actual: content.kind.as_str(),
            });
        }

        let mut profile = self.store.load_or_create_profile(user_id, now).await?;
        let score_percent = tally.score_percent();
        let passed = rewards::is_passed(score_percent, content.required_score_percent);

        // Validate before branching so an inconsistent tally is rejected
        // even on a would-be fail.
        let outcome = rewards::settle_lesson_reward(
            content.base_xp_reward,
            content.base_coin_reward,
            score_percent,
            tally.max_combo,
            tally.total_points,
        )?;

        if !passed {
            return Ok(CompletionSummary {
                passed: false,
                score_percent,
                xp_earned: 0,
                coins_earned: 0,
                leveled_up: false,
                new_level: profile.experience.level,
                current_streak: profile.streak.current_streak,
                perfect: false,
                new_achievements: Vec::new(),
            });
        }

        let award = xp::add_xp(&profile.experience, outcome.xp_earned as u64);
        profile.experience = award.state;
        profile.coins = profile.coins.saturating_add(outcome.coins_earned);
        profile.lessons_completed += 1;
        let perfect = tally.is_perfect();
        if perfect {
            profile.perfect_lessons += 1;
        }
        profile.streak = streak::update_streak(&profile.streak, now.date_naive());

        if award.leveled_up {
            tracing::info!(user_id, new_level = award.new_level, "level up");
        }

        let new_achievements = self.settle_achievements(&mut profile, perfect).await?;

        self.store.save_profile(&profile).await?;
        if !new_achievements.is_empty() {
            let ids: Vec<String> = new_achievements.iter().map(|r| r.id.clone()).collect();
            self.store.record_unlocks(user_id, &ids, now).await?;
            tracing::info!(user_id, unlocked = ?ids, "achievements unlocked");
        }

        Ok(CompletionSummary {
            passed: true,
            score_percent,
            xp_earned: outcome.xp_earned,
            coins_earned: outcome.coins_earned,
            leveled_up: award.leveled_up,
            new_level: award.new_level,
            current_streak: profile.streak.current_streak,
            perfect,
            new_achievements,
        })
    }

    /// Settle a daily-challenge attempt. Challenges have no pass gate:
    /// whatever was scored is rewarded, and the day's streak advances.
    pub async fn complete_challenge(
        &self,
        user_id: &str,
        content_id: &str,
        tally: QuizTally,
        now: DateTime<Utc>,
    ) -> Result<CompletionSummary, ServiceError> {
        let content = self.store.content(content_id).await?;
        if content.kind != ContentKind::Challenge {
            return Err(ServiceError::WrongKind {
                content_id: content_id.to_string(),
                expected: "challenge",
                actual: content.kind.as_str(),
            });
        }

        let mut profile = self.store.load_or_create_profile(user_id, now).await?;
        let score_percent = tally.score_percent();
        let outcome =
            rewards::settle_challenge_reward(score_percent, tally.max_combo, tally.total_points)?;

        let award = xp::add_xp(&profile.experience, outcome.xp_earned as u64);
        profile.experience = award.state;
        profile.coins = profile.coins.saturating_add(outcome.coins_earned);
        profile.streak = streak::update_streak(&profile.streak, now.date_naive());

        if award.leveled_up {
            tracing::info!(user_id, new_level = award.new_level, "level up");
        }

        let new_achievements = self.settle_achievements(&mut profile, false).await?;

        self.store.save_profile(&profile).await?;
        if !new_achievements.is_empty() {
            let ids: Vec<String> = new_achievements.iter().map(|r| r.id.clone()).collect();
            self.store.record_unlocks(user_id, &ids, now).await?;
            tracing::info!(user_id, unlocked = ?ids, "achievements unlocked");
        }

        Ok(CompletionSummary {
            passed: true,
            score_percent,
            xp_earned: outcome.xp_earned,
            coins_earned: outcome.coins_earned,
            leveled_up: award.leveled_up,
            new_level: award.new_level,
            current_streak: profile.streak.current_streak,
            perfect: tally.is_perfect(),
            new_achievements,
        })
    }

    pub async fn heart_status(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<HeartStatus, ServiceError> {
        let profile = self.store.load_or_create_profile(user_id, now).await?;
        Ok(HeartStatus {
            hearts: hearts::actual_hearts(&profile.hearts, now, &self.heart_config),
            max_hearts: self.heart_config.max_hearts,
            seconds_to_next_heart: hearts::time_to_next_heart(
                &profile.hearts,
                now,
                &self.heart_config,
            ),
            coins: profile.coins,
        })
    }

    /// Spend one heart (a wrong answer during play). `Ok(None)` means
    /// the pool is empty and the attempt must end.
    pub async fn spend_heart(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<HeartStatus>, ServiceError> {
        let mut profile = self.store.load_or_create_profile(user_id, now).await?;
        let spend = hearts::lose_heart(&profile.hearts, now, &self.heart_config);
        if !spend.success {
            return Ok(None);
        }
        profile.hearts = spend.state;
        self.store.save_profile(&profile).await?;
        Ok(Some(HeartStatus {
            hearts: spend.state.count,
            max_hearts: self.heart_config.max_hearts,
            seconds_to_next_heart: hearts::time_to_next_heart(
                &spend.state,
                now,
                &self.heart_config,
            ),
            coins: profile.coins,
        }))
    }

    /// Buy one heart with coins. `Ok(None)` means the purchase was
    /// refused (pool full or coins short) and nothing changed.
    pub async fn buy_heart(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<HeartStatus>, ServiceError> {
        let mut profile = self.store.load_or_create_profile(user_id, now).await?;
        let purchase = hearts::buy_heart(&profile.hearts, profile.coins, now, &self.heart_config);
        if !purchase.success {
            return Ok(None);
        }
        profile.hearts = purchase.state;
        profile.coins = purchase.coins;
        self.store.save_profile(&profile).await?;
        Ok(Some(HeartStatus {
            hearts: purchase.state.count,
            max_hearts: self.heart_config.max_hearts,
            seconds_to_next_heart: hearts::time_to_next_heart(
                &purchase.state,
                now,
                &self.heart_config,
            ),
            coins: purchase.coins,
        }))
    }

    /// Count today toward the streak without finishing any content.
    /// Idempotent within a UTC day.
    pub async fn daily_checkin(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<StreakState, ServiceError> {
        let mut profile = self.store.load_or_create_profile(user_id, now).await?;
        let next = streak::update_streak(&profile.streak, now.date_naive());
        if next != profile.streak {
            profile.streak = next;
            self.store.save_profile(&profile).await?;
        }
        Ok(next)
    }

    pub async fn achievement_rules(&self) -> Result<Vec<AchievementRule>, ServiceError> {
        Ok(self.store.achievement_rules().await?)
    }

    pub async fn unlocked_achievements(
        &self,
        user_id: &str,
    ) -> Result<HashSet<String>, ServiceError> {
        Ok(self.store.unlocked_achievements(user_id).await?)
    }

    /// Re-evaluate all rules against the current counters, outside any
    /// completion. Perfect-lesson rules never fire here: that condition
    /// is attempt-scoped and only holds inside a settlement.
    pub async fn check_achievements(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<AchievementRule>, ServiceError> {
        let mut profile = self.store.load_or_create_profile(user_id, now).await?;
        let unlocked = self.settle_achievements(&mut profile, false).await?;
        if !unlocked.is_empty() {
            self.store.save_profile(&profile).await?;
            let ids: Vec<String> = unlocked.iter().map(|r| r.id.clone()).collect();
            self.store.record_unlocks(user_id, &ids, now).await?;
        }
        Ok(unlocked)
    }

    /// Evaluate rules against `profile`, credit coin rewards onto it.
    /// Does not save; callers persist profile and unlock rows together.
    async fn settle_achievements(
        &self,
        profile: &mut UserProfile,
        is_perfect_lesson: bool,
    ) -> Result<Vec<AchievementRule>, ServiceError> {
        let rules = self.store.achievement_rules().await?;
        let unlocked_ids = self.store.unlocked_achievements(&profile.id).await?;
        let ctx = AchievementContext {
            lessons_completed: profile.lessons_completed,
            streak: profile.streak.current_streak,
            level: profile.experience.level,
            is_perfect_lesson,
        };
        let newly = achievements::evaluate(&rules, &unlocked_ids, &ctx);
        for rule in &newly {
            profile.coins = profile.coins.saturating_add(rule.coin_reward);
        }
        Ok(newly)
    }
}
