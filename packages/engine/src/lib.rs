//! # berean-engine - scoring and progression core
//!
//! Pure Rust implementation of the gameplay math behind the berean
//! Bible-learning app:
//!
//! - **Heart Economy** - bounded regenerating life pool
//! - **XP / Level Curve** - monotonic level thresholds and level-up detection
//! - **Streak Tracker** - calendar-day streak transitions (UTC)
//! - **Quiz Session** - per-question timing, combo counter, point accumulation
//! - **Reward Settlement** - quiz tally into final XP/coin amounts
//! - **Achievement Evaluator** - rule conditions against progress counters
//!
//! Every function here takes state as input and returns new state; the
//! only mutable value is the session-scoped [`QuizSession`]. Nothing in
//! this crate performs I/O or reads the wall clock - callers pass `now`
//! and "today" explicitly.

pub mod achievements;
pub mod error;
pub mod hearts;
pub mod quiz;
pub mod rewards;
pub mod streak;
pub mod types;
pub mod xp;

pub use achievements::evaluate;
pub use error::EngineError;
pub use hearts::{actual_hearts, buy_heart, lose_heart, time_to_next_heart, HeartConfig};
pub use quiz::{combo_multiplier, AnswerOutcome, QuizConfig, QuizPhase, QuizSession};
pub use rewards::{is_passed, settle_challenge_reward, settle_lesson_reward, RewardOutcome};
pub use streak::update_streak;
pub use types::*;
pub use xp::{add_xp, level_for_xp, xp_for_level, XpAward};
