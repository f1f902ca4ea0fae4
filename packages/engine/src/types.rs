use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

// Economy constants (field names and defaults aligned with the app content)
pub const MAX_HEARTS: u32 = 5;
pub const HEART_REGEN_INTERVAL_MS: i64 = 30 * 60 * 1000;
pub const HEART_COST: u32 = 20;
pub const BASE_POINTS: u32 = 10;
pub const TIME_BONUS_POINTS: u32 = 5;
pub const TIME_BONUS_CUTOFF_SECS: i64 = 5;
pub const COMBO_BONUS_CAP: u32 = 20;
pub const CHALLENGE_BASE_XP: u32 = 25;
pub const CHALLENGE_BASE_COINS: u32 = 15;
pub const DEFAULT_PASS_PERCENT: u32 = 70;

/// Combo multiplier tiers as `(combo, multiplier)`. Monotonic
/// non-decreasing; the last tier saturates for any higher combo.
pub const COMBO_TIERS: [(u32, f64); 5] = [(1, 1.0), (2, 1.5), (3, 2.0), (4, 2.5), (5, 3.0)];

/// Heart pool as persisted: `count` is the value *as of* `updated_at`.
/// Current availability must go through [`crate::hearts::actual_hearts`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartState {
    pub count: u32,
    pub updated_at: DateTime<Utc>,
}

impl HeartState {
    pub fn full(now: DateTime<Utc>) -> Self {
        Self {
            count: MAX_HEARTS,
            updated_at: now,
        }
    }
}

/// Cumulative experience and the level derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExperienceState {
    pub xp: u64,
    pub level: u32,
}

impl Default for ExperienceState {
    fn default() -> Self {
        Self { xp: 0, level: 1 }
    }
}

/// Consecutive-day activity streak. Dates are calendar days in UTC.
/// Invariant: `longest_streak >= current_streak`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
}

/// Final counters of one quiz attempt, produced by
/// [`crate::quiz::QuizSession::tally`] or submitted by a client driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizTally {
    pub total_points: u32,
    pub correct_answers: u32,
    pub max_combo: u32,
    pub question_count: u32,
}

impl QuizTally {
    /// Score as a rounded percentage of correctly answered questions.
    /// An empty question set scores 0. Values above 100 are possible
    /// only for inconsistent input and are rejected at settlement.
    pub fn score_percent(&self) -> u32 {
        if self.question_count == 0 {
            return 0;
        }
        ((self.correct_answers as f64 / self.question_count as f64) * 100.0).round() as u32
    }

    /// A perfect attempt: every question answered and answered correctly.
    pub fn is_perfect(&self) -> bool {
        self.question_count > 0 && self.correct_answers == self.question_count
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCondition {
    LessonsCompleted,
    Streak,
    Level,
    PerfectLesson,
}

impl AchievementCondition {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "lessons_completed" => Some(Self::LessonsCompleted),
            "streak" => Some(Self::Streak),
            "level" => Some(Self::Level),
            "perfect_lesson" => Some(Self::PerfectLesson),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LessonsCompleted => "lessons_completed",
            Self::Streak => "streak",
            Self::Level => "level",
            Self::PerfectLesson => "perfect_lesson",
        }
    }
}

/// Collaborator-owned achievement rule, read-only to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementRule {
    pub id: String,
    pub title: String,
    pub condition_type: AchievementCondition,
    pub condition_value: u32,
    pub coin_reward: u32,
}

/// Progress counters the evaluator tests rules against. The caller
/// supplies these from its store; the engine never queries anything.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AchievementContext {
    pub lessons_completed: u32,
    pub streak: u32,
    pub level: u32,
    pub is_perfect_lesson: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_percent_rounds() {
        let tally = QuizTally {
            total_points: 0,
            correct_answers: 2,
            max_combo: 0,
            question_count: 3,
        };
        assert_eq!(tally.score_percent(), 67);
    }

    #[test]
    fn test_score_percent_empty_set() {
        assert_eq!(QuizTally::default().score_percent(), 0);
        assert!(!QuizTally::default().is_perfect());
    }

    #[test]
    fn test_condition_parse_round_trip() {
        for raw in ["lessons_completed", "streak", "level", "perfect_lesson"] {
            let parsed = AchievementCondition::parse(raw).unwrap();
            assert_eq!(parsed.as_str(), raw);
        }
        assert_eq!(AchievementCondition::parse("unknown"), None);
    }

    #[test]
    fn test_combo_tiers_monotonic() {
        for pair in COMBO_TIERS.windows(2) {
            assert!(pair[0].0 < pair[1].0);
            assert!(pair[0].1 <= pair[1].1);
        }
    }
}
