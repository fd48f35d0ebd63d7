//! Repository for the `practice_sessions` table.

use lingo_core::practice::{
    NewPracticeSession, PracticeFilter, PracticeType, SESSION_ABANDONED, SESSION_COMPLETED,
    SESSION_IN_PROGRESS, SESSION_STARTED,
};
use lingo_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::daily_lives::DailyLivesRow;
use crate::models::practice::PracticeSessionRow;
use crate::repositories::DailyLivesRepo;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, chapter_id, practice_type, status, score, started_at, \
                        completed_at, created_at, updated_at";

pub struct PracticeSessionRepo;

impl PracticeSessionRepo {
    /// Spend one life and insert a session in the `started` state, in one
    /// transaction.
    ///
    /// Returns `None` when the user has no lives left. A failed insert rolls
    /// the decrement back with it.
    pub async fn start_with_life(
        pool: &PgPool,
        input: &NewPracticeSession,
        today: Date,
    ) -> Result<Option<(PracticeSessionRow, DailyLivesRow)>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(lives) = DailyLivesRepo::take_life(&mut *tx, input.user_id, today).await? else {
            tx.rollback().await?;
            return Ok(None);
        };

        let query = format!(
            "INSERT INTO practice_sessions (user_id, chapter_id, practice_type, status)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        let session = sqlx::query_as::<_, PracticeSessionRow>(&query)
            .bind(input.user_id)
            .bind(&input.chapter_id)
            .bind(input.practice_type.as_str())
            .bind(SESSION_STARTED)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some((session, lives)))
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PracticeSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM practice_sessions WHERE id = $1");
        sqlx::query_as::<_, PracticeSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// A page of a user's sessions, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: &PracticeFilter,
    ) -> Result<Vec<PracticeSessionRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM practice_sessions
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR practice_type = $2)
             ORDER BY created_at DESC, id DESC
             LIMIT $3 OFFSET $4"
        );
        sqlx::query_as::<_, PracticeSessionRow>(&query)
            .bind(user_id)
            .bind(filter.practice_type.map(|t| t.as_str()))
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        practice_type: Option<PracticeType>,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM practice_sessions
             WHERE user_id = $1 AND ($2::TEXT IS NULL OR practice_type = $2)",
        )
        .bind(user_id)
        .bind(practice_type.map(|t| t.as_str()))
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Close an open session as completed. Returns `None` when the session is
    /// missing or already terminal.
    pub async fn mark_completed(
        pool: &PgPool,
        id: DbId,
        score: f64,
    ) -> Result<Option<PracticeSessionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE practice_sessions
             SET status = $2, score = $3, completed_at = NOW()
             WHERE id = $1 AND status IN ($4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PracticeSessionRow>(&query)
            .bind(id)
            .bind(SESSION_COMPLETED)
            .bind(score)
            .bind(SESSION_STARTED)
            .bind(SESSION_IN_PROGRESS)
            .fetch_optional(pool)
            .await
    }

    /// Close an open session as abandoned. Returns `None` when the session is
    /// missing or already terminal.
    pub async fn mark_abandoned(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PracticeSessionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE practice_sessions
             SET status = $2, completed_at = NOW()
             WHERE id = $1 AND status IN ($3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PracticeSessionRow>(&query)
            .bind(id)
            .bind(SESSION_ABANDONED)
            .bind(SESSION_STARTED)
            .bind(SESSION_IN_PROGRESS)
            .fetch_optional(pool)
            .await
    }
}
