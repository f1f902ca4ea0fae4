//! Sqlite store round-trips against a throwaway database file.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use tempfile::TempDir;

use berean_backend_rust::db::sqlite::SqliteStore;
use berean_backend_rust::db::{ContentKind, ProgressStore};

const FIXED_TIMESTAMP_MS: i64 = 1_700_000_000_000;

fn fixed_now() -> DateTime<Utc> {
    Utc.timestamp_millis_opt(FIXED_TIMESTAMP_MS).unwrap()
}

async fn open_store(dir: &TempDir) -> SqliteStore {
    let path = dir.path().join("test.db");
    let url = format!("sqlite:{}?mode=rwc", path.display());
    SqliteStore::connect(&url).await.unwrap()
}

#[tokio::test]
async fn test_connect_seeds_rules_and_contents() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;

    let rules = store.achievement_rules().await.unwrap();
    assert_eq!(rules.len(), 8);

    let lesson = store.content("lesson-gospels-1").await.unwrap();
    assert_eq!(lesson.kind, ContentKind::Lesson);
    assert_eq!(lesson.base_xp_reward, 50);

    let milestone = store.content("milestone-romans-1").await.unwrap();
    assert_eq!(milestone.kind, ContentKind::Milestone);
    assert_eq!(milestone.required_score_percent, Some(80));
}

#[tokio::test]
async fn test_reconnect_does_not_duplicate_seed_rows() {
    let dir = TempDir::new().unwrap();
    {
        let _store = open_store(&dir).await;
    }
    let store = open_store(&dir).await;
    let rules = store.achievement_rules().await.unwrap();
    assert_eq!(rules.len(), 8);
}

#[tokio::test]
async fn test_profile_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let now = fixed_now();

    let mut profile = store.load_or_create_profile("u1", now).await.unwrap();
    assert_eq!(profile.experience.level, 1);
    assert_eq!(profile.hearts.count, 5);
    assert_eq!(profile.hearts.updated_at, now);

    profile.experience.xp = 450;
    profile.experience.level = 3;
    profile.coins = 63;
    profile.hearts.count = 2;
    profile.streak.current_streak = 4;
    profile.streak.longest_streak = 9;
    profile.streak.last_activity_date = NaiveDate::from_ymd_opt(2023, 11, 14);
    profile.lessons_completed = 12;
    profile.perfect_lessons = 3;
    store.save_profile(&profile).await.unwrap();

    let reloaded = store.load_or_create_profile("u1", now).await.unwrap();
    assert_eq!(reloaded, profile);
}

#[tokio::test]
async fn test_unknown_content_errors() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    assert!(store.content("no-such-content").await.is_err());
}

#[tokio::test]
async fn test_unlocks_are_unique_per_user() {
    let dir = TempDir::new().unwrap();
    let store = open_store(&dir).await;
    let now = fixed_now();

    let ids = vec!["first-steps".to_string(), "flawless".to_string()];
    store.record_unlocks("u1", &ids, now).await.unwrap();
    store.record_unlocks("u1", &ids, now).await.unwrap();

    let unlocked = store.unlocked_achievements("u1").await.unwrap();
    assert_eq!(unlocked.len(), 2);
    assert!(unlocked.contains("first-steps"));

    // Unlocks are scoped to the user.
    let other = store.unlocked_achievements("u2").await.unwrap();
    assert!(other.is_empty());
}
