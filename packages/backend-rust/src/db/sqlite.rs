//! Sqlite-backed `ProgressStore` for signed-in users. Single file
//! database, WAL journal, schema bootstrapped and seeded on connect.
//! Reads validate collaborator data at the boundary: negative counters
//! or unknown enum text are loud `Corrupt` errors, not silent defaults.

use std::collections::HashSet;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};

use berean_engine::types::{
    AchievementCondition, AchievementRule, ExperienceState, HeartState, StreakState,
};

use super::{seed, ContentKind, ContentRecord, ProgressStore, StoreError, UserProfile};

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS "users" (
        "id" TEXT PRIMARY KEY,
        "xp" INTEGER NOT NULL DEFAULT 0,
        "level" INTEGER NOT NULL DEFAULT 1,
        "coins" INTEGER NOT NULL DEFAULT 0,
        "hearts" INTEGER NOT NULL DEFAULT 5,
        "heartsUpdatedAt" INTEGER NOT NULL,
        "currentStreak" INTEGER NOT NULL DEFAULT 0,
        "longestStreak" INTEGER NOT NULL DEFAULT 0,
        "lastActivityDate" TEXT,
        "lessonsCompleted" INTEGER NOT NULL DEFAULT 0,
        "perfectLessons" INTEGER NOT NULL DEFAULT 0
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "contents" (
        "id" TEXT PRIMARY KEY,
        "kind" TEXT NOT NULL,
        "title" TEXT NOT NULL,
        "baseXpReward" INTEGER NOT NULL,
        "baseCoinReward" INTEGER NOT NULL,
        "requiredScorePercent" INTEGER,
        "questionCount" INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "achievement_definitions" (
        "id" TEXT PRIMARY KEY,
        "title" TEXT NOT NULL,
        "conditionType" TEXT NOT NULL,
        "conditionValue" INTEGER NOT NULL,
        "coinReward" INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS "user_achievements" (
        "userId" TEXT NOT NULL,
        "achievementId" TEXT NOT NULL,
        "unlockedAt" INTEGER NOT NULL,
        PRIMARY KEY ("userId", "achievementId")
    )"#,
];

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect to `database_url` (e.g. `sqlite:/path/data.db?mode=rwc`),
    /// creating the file, schema and seed rows as needed.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| StoreError::Database(e.to_string()))?
            .create_if_missing(true)
            .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(30));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        store.seed_defaults().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn init_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA_STATEMENTS {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    async fn seed_defaults(&self) -> Result<(), StoreError> {
        for rule in seed::default_achievement_rules() {
            sqlx::query(
                r#"INSERT OR IGNORE INTO "achievement_definitions"
                   ("id","title","conditionType","conditionValue","coinReward")
                   VALUES ($1,$2,$3,$4,$5)"#,
            )
            .bind(&rule.id)
            .bind(&rule.title)
            .bind(rule.condition_type.as_str())
            .bind(rule.condition_value as i64)
            .bind(rule.coin_reward as i64)
            .execute(&self.pool)
            .await?;
        }

        for record in seed::default_contents() {
            sqlx::query(
                r#"INSERT OR IGNORE INTO "contents"
                   ("id","kind","title","baseXpReward","baseCoinReward","requiredScorePercent","questionCount")
                   VALUES ($1,$2,$3,$4,$5,$6,$7)"#,
            )
            .bind(&record.id)
            .bind(record.kind.as_str())
            .bind(&record.title)
            .bind(record.base_xp_reward as i64)
            .bind(record.base_coin_reward as i64)
            .bind(record.required_score_percent.map(|v| v as i64))
            .bind(record.question_count as i64)
            .execute(&self.pool)
            .await?;
        }

        tracing::debug!("sqlite store schema ready");
        Ok(())
    }
}

fn non_negative(value: i64, field: &str) -> Result<u32, StoreError> {
    u32::try_from(value).map_err(|_| StoreError::Corrupt(format!("{field} is negative: {value}")))
}

fn row_to_profile(row: &sqlx::sqlite::SqliteRow) -> Result<UserProfile, StoreError> {
    let id: String = row.try_get("id")?;
    let xp: i64 = row.try_get("xp")?;
    if xp < 0 {
        return Err(StoreError::Corrupt(format!("xp is negative: {xp}")));
    }

    let hearts_updated_ms: i64 = row.try_get("heartsUpdatedAt")?;
    let hearts_updated_at = Utc
        .timestamp_millis_opt(hearts_updated_ms)
        .single()
        .ok_or_else(|| {
            StoreError::Corrupt(format!("heartsUpdatedAt out of range: {hearts_updated_ms}"))
        })?;

    let last_activity_date: Option<String> = row.try_get("lastActivityDate")?;
    let last_activity_date = match last_activity_date {
        Some(raw) => Some(
            NaiveDate::parse_from_str(&raw, "%Y-%m-%d")
                .map_err(|_| StoreError::Corrupt(format!("bad lastActivityDate: {raw}")))?,
        ),
        None => None,
    };

    Ok(UserProfile {
        id,
        experience: ExperienceState {
            xp: xp as u64,
            level: non_negative(row.try_get("level")?, "level")?,
        },
        coins: non_negative(row.try_get("coins")?, "coins")?,
        hearts: HeartState {
            count: non_negative(row.try_get("hearts")?, "hearts")?,
            updated_at: hearts_updated_at,
        },
        streak: StreakState {
            current_streak: non_negative(row.try_get("currentStreak")?, "currentStreak")?,
            longest_streak: non_negative(row.try_get("longestStreak")?, "longestStreak")?,
            last_activity_date,
        },
        lessons_completed: non_negative(row.try_get("lessonsCompleted")?, "lessonsCompleted")?,
        perfect_lessons: non_negative(row.try_get("perfectLessons")?, "perfectLessons")?,
    })
}

#[async_trait]
impl ProgressStore for SqliteStore {
    async fn load_or_create_profile(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserProfile, StoreError> {
        let row = sqlx::query(r#"SELECT * FROM "users" WHERE "id" = $1"#)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        if let Some(row) = row {
            return row_to_profile(&row);
        }

        let profile = UserProfile::new(user_id, now);
        self.save_profile(&profile).await?;
        Ok(profile)
    }

    async fn save_profile(&self, profile: &UserProfile) -> Result<(), StoreError> {
        sqlx::query(
            r#"INSERT INTO "users"
               ("id","xp","level","coins","hearts","heartsUpdatedAt",
                "currentStreak","longestStreak","lastActivityDate",
                "lessonsCompleted","perfectLessons")
               VALUES ($1,$2,$3,$4,$5,$6,$7,$8,$9,$10,$11)
               ON CONFLICT("id") DO UPDATE SET
                 "xp" = excluded."xp",
                 "level" = excluded."level",
                 "coins" = excluded."coins",
                 "hearts" = excluded."hearts",
                 "heartsUpdatedAt" = excluded."heartsUpdatedAt",
                 "currentStreak" = excluded."currentStreak",
                 "longestStreak" = excluded."longestStreak",
                 "lastActivityDate" = excluded."lastActivityDate",
                 "lessonsCompleted" = excluded."lessonsCompleted",
                 "perfectLessons" = excluded."perfectLessons""#,
        )
        .bind(&profile.id)
        .bind(profile.experience.xp as i64)
        .bind(profile.experience.level as i64)
        .bind(profile.coins as i64)
        .bind(profile.hearts.count as i64)
        .bind(profile.hearts.updated_at.timestamp_millis())
        .bind(profile.streak.current_streak as i64)
        .bind(profile.streak.longest_streak as i64)
        .bind(
            profile
                .streak
                .last_activity_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
        )
        .bind(profile.lessons_completed as i64)
        .bind(profile.perfect_lessons as i64)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn content(&self, content_id: &str) -> Result<ContentRecord, StoreError> {
        let row = sqlx::query(r#"SELECT * FROM "contents" WHERE "id" = $1"#)
            .bind(content_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::ContentNotFound(content_id.to_string()))?;

        let kind_raw: String = row.try_get("kind")?;
        let kind = ContentKind::parse(&kind_raw)
            .ok_or_else(|| StoreError::Corrupt(format!("unknown content kind: {kind_raw}")))?;

        let required: Option<i64> = row.try_get("requiredScorePercent")?;
        let required_score_percent = match required {
            Some(v) => Some(non_negative(v, "requiredScorePercent")?),
            None => None,
        };

        Ok(ContentRecord {
            id: row.try_get("id")?,
            kind,
            title: row.try_get("title")?,
            base_xp_reward: non_negative(row.try_get("baseXpReward")?, "baseXpReward")?,
            base_coin_reward: non_negative(row.try_get("baseCoinReward")?, "baseCoinReward")?,
            required_score_percent,
            question_count: non_negative(row.try_get("questionCount")?, "questionCount")?,
        })
    }

    async fn achievement_rules(&self) -> Result<Vec<AchievementRule>, StoreError> {
        let rows = sqlx::query(r#"SELECT * FROM "achievement_definitions" ORDER BY "id""#)
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|row| {
                let condition_raw: String = row.try_get("conditionType")?;
                let condition_type = AchievementCondition::parse(&condition_raw).ok_or_else(|| {
                    StoreError::Corrupt(format!("unknown condition type: {condition_raw}"))
                })?;
                Ok(AchievementRule {
                    id: row.try_get("id")?,
                    title: row.try_get("title")?,
                    condition_type,
                    condition_value: non_negative(
                        row.try_get("conditionValue")?,
                        "conditionValue",
                    )?,
                    coin_reward: non_negative(row.try_get("coinReward")?, "coinReward")?,
                })
            })
            .collect()
    }

    async fn unlocked_achievements(&self, user_id: &str) -> Result<HashSet<String>, StoreError> {
        let rows =
            sqlx::query(r#"SELECT "achievementId" FROM "user_achievements" WHERE "userId" = $1"#)
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        rows.iter()
            .map(|row| row.try_get::<String, _>("achievementId").map_err(Into::into))
            .collect()
    }

    async fn record_unlocks(
        &self,
        user_id: &str,
        achievement_ids: &[String],
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        for achievement_id in achievement_ids {
            sqlx::query(
                r#"INSERT OR IGNORE INTO "user_achievements"
                   ("userId","achievementId","unlockedAt") VALUES ($1,$2,$3)"#,
            )
            .bind(user_id)
            .bind(achievement_id)
            .bind(now.timestamp_millis())
            .execute(&self.pool)
            .await?;
        }
        Ok(())
    }
}
