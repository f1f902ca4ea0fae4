use crate::quiz::QuizPhase;

/// Validation and state-machine failures. Insufficient resources
/// (no hearts left, not enough coins) are not errors - those come back
/// as explicit `success` flags on the operation result.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("score percent {0} is out of range (expected 0..=100)")]
    ScoreOutOfRange(u32),
    #[error("quiz action '{action}' is not allowed in phase {phase:?}")]
    InvalidTransition {
        action: &'static str,
        phase: QuizPhase,
    },
}
