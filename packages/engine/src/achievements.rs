//! Achievement evaluation. Pure and idempotent: given rule definitions,
//! the set of already-unlocked rule ids and the user's progress
//! counters, returns the rules that newly qualify, in input order.
//! Persisting the unlocks (and enforcing uniqueness at storage time)
//! is the collaborator's job.

use std::collections::HashSet;

use crate::types::{AchievementCondition, AchievementContext, AchievementRule};

/// Rules already present in `unlocked_ids` are skipped even when their
/// condition holds, so the evaluator is safe to call repeatedly with
/// the same unlocked set without emitting duplicates.
pub fn evaluate(
    rules: &[AchievementRule],
    unlocked_ids: &HashSet<String>,
    ctx: &AchievementContext,
) -> Vec<AchievementRule> {
    rules
        .iter()
        .filter(|rule| !unlocked_ids.contains(&rule.id) && condition_met(rule, ctx))
        .cloned()
        .collect()
}

fn condition_met(rule: &AchievementRule, ctx: &AchievementContext) -> bool {
    match rule.condition_type {
        AchievementCondition::LessonsCompleted => ctx.lessons_completed >= rule.condition_value,
        AchievementCondition::Streak => ctx.streak >= rule.condition_value,
        AchievementCondition::Level => ctx.level >= rule.condition_value,
        AchievementCondition::PerfectLesson => ctx.is_perfect_lesson && rule.condition_value == 1,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, condition_type: AchievementCondition, value: u32) -> AchievementRule {
        AchievementRule {
            id: id.to_string(),
            title: id.to_string(),
            condition_type,
            condition_value: value,
            coin_reward: 10,
        }
    }

    fn ctx() -> AchievementContext {
        AchievementContext {
            lessons_completed: 10,
            streak: 7,
            level: 5,
            is_perfect_lesson: true,
        }
    }

    #[test]
    fn test_threshold_conditions() {
        let rules = vec![
            rule("lessons-10", AchievementCondition::LessonsCompleted, 10),
            rule("lessons-11", AchievementCondition::LessonsCompleted, 11),
            rule("streak-7", AchievementCondition::Streak, 7),
            rule("level-6", AchievementCondition::Level, 6),
        ];
        let newly = evaluate(&rules, &HashSet::new(), &ctx());
        let ids: Vec<&str> = newly.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["lessons-10", "streak-7"]);
    }

    #[test]
    fn test_perfect_lesson_requires_value_one() {
        let rules = vec![
            rule("perfect", AchievementCondition::PerfectLesson, 1),
            rule("perfect-5", AchievementCondition::PerfectLesson, 5),
        ];
        let newly = evaluate(&rules, &HashSet::new(), &ctx());
        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].id, "perfect");

        let mut imperfect = ctx();
        imperfect.is_perfect_lesson = false;
        assert!(evaluate(&rules, &HashSet::new(), &imperfect).is_empty());
    }

    #[test]
    fn test_already_unlocked_never_returned() {
        let rules = vec![rule("streak-7", AchievementCondition::Streak, 7)];
        let unlocked: HashSet<String> = ["streak-7".to_string()].into_iter().collect();
        assert!(evaluate(&rules, &unlocked, &ctx()).is_empty());
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let rules = vec![
            rule("streak-7", AchievementCondition::Streak, 7),
            rule("level-3", AchievementCondition::Level, 3),
        ];
        let unlocked = HashSet::new();
        let first = evaluate(&rules, &unlocked, &ctx());
        let second = evaluate(&rules, &unlocked, &ctx());
        assert_eq!(first, second);
    }

    #[test]
    fn test_preserves_input_order() {
        let rules = vec![
            rule("level-3", AchievementCondition::Level, 3),
            rule("streak-2", AchievementCondition::Streak, 2),
            rule("lessons-1", AchievementCondition::LessonsCompleted, 1),
        ];
        let newly = evaluate(&rules, &HashSet::new(), &ctx());
        let ids: Vec<&str> = newly.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["level-3", "streak-2", "lessons-1"]);
    }
}
