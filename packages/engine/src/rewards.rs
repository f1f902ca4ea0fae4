//! Reward settlement: converts a completed quiz tally plus the
//! content's base rewards into final XP/coin amounts. Lessons and
//! milestones settle only when passed; daily challenges settle
//! regardless of pass/fail - the driver decides which variant to call.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{CHALLENGE_BASE_COINS, CHALLENGE_BASE_XP, COMBO_BONUS_CAP, DEFAULT_PASS_PERCENT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RewardOutcome {
    pub xp_earned: u32,
    pub coins_earned: u32,
}

/// Settle a lesson or milestone attempt.
///
/// `xp = round(base_xp * score/100) + min(max_combo * 2, 20) + round(points/10)`
/// `coins = round(base_coins * score/100) + round(points/20)`
///
/// `score_percent` above 100 is a validation failure, not a clamp: the
/// caller computes it from a consistent tally before settling.
pub fn settle_lesson_reward(
    base_xp: u32,
    base_coins: u32,
    score_percent: u32,
    max_combo: u32,
    total_points: u32,
) -> Result<RewardOutcome, EngineError> {
    if score_percent > 100 {
        return Err(EngineError::ScoreOutOfRange(score_percent));
    }

    let scale = score_percent as f64 / 100.0;
    let combo_bonus = (max_combo * 2).min(COMBO_BONUS_CAP);

    let xp_earned = (base_xp as f64 * scale).round() as u32
        + combo_bonus
        + (total_points as f64 / 10.0).round() as u32;
    let coins_earned =
        (base_coins as f64 * scale).round() as u32 + (total_points as f64 / 20.0).round() as u32;

    Ok(RewardOutcome {
        xp_earned,
        coins_earned,
    })
}

/// Daily-challenge variant: fixed bases instead of content-supplied
/// ones, same combo/points formula.
pub fn settle_challenge_reward(
    score_percent: u32,
    max_combo: u32,
    total_points: u32,
) -> Result<RewardOutcome, EngineError> {
    settle_lesson_reward(
        CHALLENGE_BASE_XP,
        CHALLENGE_BASE_COINS,
        score_percent,
        max_combo,
        total_points,
    )
}

/// Pass check against the content-defined threshold (default 70 for
/// lessons; milestones carry their own).
pub fn is_passed(score_percent: u32, required_score_percent: Option<u32>) -> bool {
    score_percent >= required_score_percent.unwrap_or(DEFAULT_PASS_PERCENT)
}
