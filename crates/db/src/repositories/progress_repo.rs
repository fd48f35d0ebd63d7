//! Repository for the `user_progress` table.

use lingo_core::progress::{NewUserProgress, ProgressChanges};
use lingo_core::types::DbId;
use sqlx::PgPool;

use crate::models::progress::UserProgressRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, chapter_id, score, last_activity, extra_data, completed_at, \
                        created_at, updated_at";

pub struct ProgressRepo;

impl ProgressRepo {
    /// Insert or refresh the (user, chapter) row.
    ///
    /// Supplied values overwrite stored ones; `NULL` inputs keep them.
    pub async fn upsert(
        pool: &PgPool,
        input: &NewUserProgress,
    ) -> Result<UserProgressRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_progress (user_id, chapter_id, score, extra_data, last_activity)
             VALUES ($1, $2, $3, $4, NOW())
             ON CONFLICT ON CONSTRAINT uq_user_progress_user_chapter
             DO UPDATE SET
                score         = COALESCE(EXCLUDED.score, user_progress.score),
                extra_data    = COALESCE(EXCLUDED.extra_data, user_progress.extra_data),
                last_activity = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProgressRow>(&query)
            .bind(input.user_id)
            .bind(&input.chapter_id)
            .bind(input.score)
            .bind(&input.extra_data)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserProgressRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM user_progress WHERE id = $1");
        sqlx::query_as::<_, UserProgressRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All rows for a user, most recent activity first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<UserProgressRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM user_progress
             WHERE user_id = $1
             ORDER BY last_activity DESC, id DESC"
        );
        sqlx::query_as::<_, UserProgressRow>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Merge changes into a row. Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ProgressChanges,
    ) -> Result<Option<UserProgressRow>, sqlx::Error> {
        let query = format!(
            "UPDATE user_progress SET
                score         = COALESCE($2, score),
                extra_data    = COALESCE($3, extra_data),
                last_activity = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProgressRow>(&query)
            .bind(id)
            .bind(changes.score)
            .bind(&changes.extra_data)
            .fetch_optional(pool)
            .await
    }

    /// Stamp the (user, chapter) row as completed, inserting it if missing.
    /// An existing `completed_at` is left as is.
    pub async fn mark_completed(
        pool: &PgPool,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<UserProgressRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_progress (user_id, chapter_id, last_activity, completed_at)
             VALUES ($1, $2, NOW(), NOW())
             ON CONFLICT ON CONSTRAINT uq_user_progress_user_chapter
             DO UPDATE SET
                completed_at  = COALESCE(user_progress.completed_at, NOW()),
                last_activity = NOW()
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserProgressRow>(&query)
            .bind(user_id)
            .bind(chapter_id)
            .fetch_one(pool)
            .await
    }
}
