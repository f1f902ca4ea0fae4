//! Default content and achievement definitions, shared by the memory
//! store (guest sessions) and the sqlite bootstrap.

use berean_engine::types::{AchievementCondition, AchievementRule};

use super::{ContentKind, ContentRecord};

pub fn default_achievement_rules() -> Vec<AchievementRule> {
    let rule = |id: &str, title: &str, condition_type, condition_value, coin_reward| {
        AchievementRule {
            id: id.to_string(),
            title: title.to_string(),
            condition_type,
            condition_value,
            coin_reward,
        }
    };

    vec![
        rule(
            "first-steps",
            "First Steps",
            AchievementCondition::LessonsCompleted,
            1,
            10,
        ),
        rule(
            "faithful-student",
            "Faithful Student",
            AchievementCondition::LessonsCompleted,
            10,
            25,
        ),
        rule(
            "scribe",
            "Scribe",
            AchievementCondition::LessonsCompleted,
            50,
            100,
        ),
        rule("week-watch", "Week of Watchfulness", AchievementCondition::Streak, 7, 50),
        rule(
            "forty-days",
            "Forty Days",
            AchievementCondition::Streak,
            40,
            200,
        ),
        rule("disciple", "Disciple", AchievementCondition::Level, 5, 50),
        rule("elder", "Elder", AchievementCondition::Level, 10, 100),
        rule(
            "flawless",
            "Flawless Recitation",
            AchievementCondition::PerfectLesson,
            1,
            25,
        ),
    ]
}

pub fn default_contents() -> Vec<ContentRecord> {
    let content = |id: &str, kind, title: &str, xp, coins, required, questions| ContentRecord {
        id: id.to_string(),
        kind,
        title: title.to_string(),
        base_xp_reward: xp,
        base_coin_reward: coins,
        required_score_percent: required,
        question_count: questions,
    };

    vec![
        content(
            "lesson-gospels-1",
            ContentKind::Lesson,
            "The Four Gospels",
            50,
            20,
            None,
            5,
        ),
        content(
            "lesson-psalms-1",
            ContentKind::Lesson,
            "Songs of Ascent",
            60,
            25,
            None,
            6,
        ),
        content(
            "lesson-acts-1",
            ContentKind::Lesson,
            "The Early Church",
            50,
            20,
            None,
            5,
        ),
        content(
            "milestone-romans-1",
            ContentKind::Milestone,
            "Romans: Faith and Grace",
            100,
            40,
            Some(80),
            8,
        ),
        content(
            "daily-challenge",
            ContentKind::Challenge,
            "Daily Challenge",
            25,
            15,
            None,
            3,
        ),
    ]
}
