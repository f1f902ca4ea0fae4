//! Quiz session state machine: per-question timing, combo counter and
//! point accumulation for one attempt. The session is ephemeral - it is
//! created when a lesson/challenge/milestone screen starts, owned
//! exclusively by that screen, and discarded on abandon. Hearts and
//! persistence stay with the driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{
    QuizTally, BASE_POINTS, COMBO_TIERS, TIME_BONUS_CUTOFF_SECS, TIME_BONUS_POINTS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizPhase {
    Idle,
    InQuestion,
    Answered,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizConfig {
    pub base_points: u32,
    pub time_bonus_points: u32,
    pub time_bonus_cutoff_secs: i64,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            base_points: BASE_POINTS,
            time_bonus_points: TIME_BONUS_POINTS,
            time_bonus_cutoff_secs: TIME_BONUS_CUTOFF_SECS,
        }
    }
}

/// Per-answer feedback for the UI (floating points, combo animation).
/// Output contract only - none of this is stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOutcome {
    pub points_earned: u32,
    pub time_bonus: u32,
    pub combo_multiplier: f64,
}

/// Multiplier for the current combo count, from the saturating tier
/// table [`COMBO_TIERS`]. Combo 0 maps to 1.0.
pub fn combo_multiplier(combo: u32) -> f64 {
    let mut multiplier = 1.0;
    for (threshold, tier) in COMBO_TIERS {
        if combo >= threshold {
            multiplier = tier;
        }
    }
    multiplier
}

#[derive(Debug, Clone)]
pub struct QuizSession {
    config: QuizConfig,
    phase: QuizPhase,
    combo: u32,
    max_combo: u32,
    total_points: u32,
    correct_answers: u32,
    questions_answered: u32,
    question_started_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    pub fn new(config: QuizConfig) -> Self {
        Self {
            config,
            phase: QuizPhase::Idle,
            combo: 0,
            max_combo: 0,
            total_points: 0,
            correct_answers: 0,
            questions_answered: 0,
            question_started_at: None,
        }
    }

    pub fn phase(&self) -> QuizPhase {
        self.phase
    }

    pub fn combo(&self) -> u32 {
        self.combo
    }

    pub fn total_points(&self) -> u32 {
        self.total_points
    }

    /// Begin timing the next question. Allowed from `Idle` or after an
    /// answer; a second call while a question is open is rejected.
    pub fn start_question(&mut self, now: DateTime<Utc>) -> Result<(), EngineError> {
        if self.phase == QuizPhase::InQuestion {
            return Err(EngineError::InvalidTransition {
                action: "start_question",
                phase: self.phase,
            });
        }
        self.question_started_at = Some(now);
        self.phase = QuizPhase::InQuestion;
        Ok(())
    }

    /// Record the answer for the open question. Only valid in
    /// `InQuestion`; a duplicate call after answering is rejected with
    /// no state change (the driver disables input, this is the
    /// backstop). Wrong answers zero the combo - heart loss is the
    /// driver's separate call into the heart economy.
    pub fn answer_question(
        &mut self,
        correct: bool,
        now: DateTime<Utc>,
    ) -> Result<AnswerOutcome, EngineError> {
        if self.phase != QuizPhase::InQuestion {
            return Err(EngineError::InvalidTransition {
                action: "answer_question",
                phase: self.phase,
            });
        }

        self.phase = QuizPhase::Answered;
        self.questions_answered += 1;

        if !correct {
            self.combo = 0;
            return Ok(AnswerOutcome {
                points_earned: 0,
                time_bonus: 0,
                combo_multiplier: 1.0,
            });
        }

        let elapsed_secs = self
            .question_started_at
            .map(|started| (now - started).num_seconds().max(0))
            .unwrap_or(i64::MAX);

        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.correct_answers += 1;

        let multiplier = combo_multiplier(self.combo);
        let time_bonus = if elapsed_secs < self.config.time_bonus_cutoff_secs {
            self.config.time_bonus_points
        } else {
            0
        };
        let points_earned = (self.config.base_points as f64 * multiplier).round() as u32 + time_bonus;
        self.total_points += points_earned;

        Ok(AnswerOutcome {
            points_earned,
            time_bonus,
            combo_multiplier: multiplier,
        })
    }

    /// Zero all counters; used for a fresh attempt and on retry.
    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    /// Final counters for settlement. The session does not decide
    /// completion - the driver advances past the last question (or runs
    /// out of hearts) and then reads the tally.
    pub fn tally(&self) -> QuizTally {
        QuizTally {
            total_points: self.total_points,
            correct_answers: self.correct_answers,
            max_combo: self.max_combo,
            question_count: self.questions_answered,
        }
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new(QuizConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_combo_multiplier_tiers() {
        assert_eq!(combo_multiplier(0), 1.0);
        assert_eq!(combo_multiplier(1), 1.0);
        assert_eq!(combo_multiplier(2), 1.5);
        assert_eq!(combo_multiplier(3), 2.0);
        assert_eq!(combo_multiplier(4), 2.5);
        assert_eq!(combo_multiplier(5), 3.0);
        assert_eq!(combo_multiplier(50), 3.0);
    }

    #[test]
    fn test_answer_requires_open_question() {
        let mut session = QuizSession::default();
        let err = session.answer_question(true, at(0)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidTransition {
                action: "answer_question",
                phase: QuizPhase::Idle,
            }
        );
    }

    #[test]
    fn test_double_answer_rejected_without_mutation() {
        let mut session = QuizSession::default();
        session.start_question(at(0)).unwrap();
        session.answer_question(true, at(1)).unwrap();

        let before = session.tally();
        assert!(session.answer_question(true, at(2)).is_err());
        assert_eq!(session.tally(), before);
    }

    #[test]
    fn test_double_start_rejected() {
        let mut session = QuizSession::default();
        session.start_question(at(0)).unwrap();
        assert!(session.start_question(at(1)).is_err());
    }

    #[test]
    fn test_fast_answer_earns_time_bonus() {
        let mut session = QuizSession::default();
        session.start_question(at(0)).unwrap();
        let outcome = session.answer_question(true, at(4)).unwrap();
        assert_eq!(outcome.time_bonus, 5);
        assert_eq!(outcome.points_earned, 15);
    }

    #[test]
    fn test_slow_answer_no_time_bonus() {
        let mut session = QuizSession::default();
        session.start_question(at(0)).unwrap();
        let outcome = session.answer_question(true, at(5)).unwrap();
        assert_eq!(outcome.time_bonus, 0);
        assert_eq!(outcome.points_earned, 10);
    }

    #[test]
    fn test_wrong_answer_resets_combo() {
        let mut session = QuizSession::default();
        for _ in 0..3 {
            session.start_question(at(0)).unwrap();
            session.answer_question(true, at(10)).unwrap();
        }
        assert_eq!(session.combo(), 3);

        session.start_question(at(20)).unwrap();
        let outcome = session.answer_question(false, at(22)).unwrap();
        assert_eq!(outcome.points_earned, 0);
        assert_eq!(session.combo(), 0);

        // max combo survives the reset
        assert_eq!(session.tally().max_combo, 3);
    }

    #[test]
    fn test_reset_zeroes_everything() {
        let mut session = QuizSession::default();
        session.start_question(at(0)).unwrap();
        session.answer_question(true, at(1)).unwrap();

        session.reset();
        assert_eq!(session.phase(), QuizPhase::Idle);
        assert_eq!(session.tally(), QuizTally::default());
    }

    #[test]
    fn test_tally_counts_wrong_answers_in_question_count() {
        let mut session = QuizSession::default();
        session.start_question(at(0)).unwrap();
        session.answer_question(true, at(1)).unwrap();
        session.start_question(at(2)).unwrap();
        session.answer_question(false, at(3)).unwrap();

        let tally = session.tally();
        assert_eq!(tally.question_count, 2);
        assert_eq!(tally.correct_answers, 1);
        assert_eq!(tally.score_percent(), 50);
    }
}
