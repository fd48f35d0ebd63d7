//! Repository for the `daily_lives` table.
//!
//! Consumption runs inside a transaction holding `SELECT ... FOR UPDATE` on
//! the user's row, so concurrent requests for one user are serialised.

use lingo_core::lives::{DailyLives, MAX_DAILY_LIVES};
use lingo_core::types::{Date, DbId};
use sqlx::{PgConnection, PgPool};

use crate::models::daily_lives::DailyLivesRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, current_lives, last_reset_date, created_at, updated_at";

pub struct DailyLivesRepo;

impl DailyLivesRepo {
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<DailyLivesRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM daily_lives WHERE user_id = $1");
        sqlx::query_as::<_, DailyLivesRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Return the user's row, inserting a full one dated `today` when missing.
    pub async fn ensure(
        pool: &PgPool,
        user_id: DbId,
        today: Date,
    ) -> Result<DailyLivesRow, sqlx::Error> {
        sqlx::query(
            "INSERT INTO daily_lives (user_id, current_lives, last_reset_date)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(MAX_DAILY_LIVES)
        .bind(today)
        .execute(pool)
        .await?;

        let query = format!("SELECT {COLUMNS} FROM daily_lives WHERE user_id = $1");
        sqlx::query_as::<_, DailyLivesRow>(&query)
            .bind(user_id)
            .fetch_one(pool)
            .await
    }

    /// Spend one life under an exclusive row lock.
    ///
    /// Refills first when `last_reset_date < today`. Returns `None` and rolls
    /// back when the user has no row or no lives left.
    pub async fn consume(
        pool: &PgPool,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLivesRow>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let Some(updated) = Self::take_life(&mut *tx, user_id, today).await? else {
            tx.rollback().await?;
            return Ok(None);
        };
        tx.commit().await?;
        Ok(Some(updated))
    }

    /// Lock the user's row and decrement it on the caller's transaction.
    ///
    /// Writes nothing and returns `None` when there is no row or no life left.
    pub(crate) async fn take_life(
        conn: &mut PgConnection,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLivesRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM daily_lives WHERE user_id = $1 FOR UPDATE");
        let Some(row) = sqlx::query_as::<_, DailyLivesRow>(&query)
            .bind(user_id)
            .fetch_optional(&mut *conn)
            .await?
        else {
            tracing::debug!(user_id, "No daily lives record to consume from");
            return Ok(None);
        };

        let mut lives = DailyLives::from(row);
        lives.reset_if_due(today);
        if !lives.consume() {
            tracing::debug!(user_id, "Daily lives exhausted");
            return Ok(None);
        }

        let query = format!(
            "UPDATE daily_lives SET current_lives = $2, last_reset_date = $3
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DailyLivesRow>(&query)
            .bind(user_id)
            .bind(lives.current_lives)
            .bind(lives.last_reset_date)
            .fetch_one(&mut *conn)
            .await
            .map(Some)
    }

    /// Day rollover for one user. Only matches while the row is still dated
    /// before `today`, so a concurrent consumer's decrement is never undone.
    pub async fn refill_if_due(
        pool: &PgPool,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLivesRow>, sqlx::Error> {
        let query = format!(
            "UPDATE daily_lives SET current_lives = $2, last_reset_date = $3
             WHERE user_id = $1 AND last_reset_date < $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DailyLivesRow>(&query)
            .bind(user_id)
            .bind(MAX_DAILY_LIVES)
            .bind(today)
            .fetch_optional(pool)
            .await
    }

    /// Unconditional refill of a single user's lives. Returns `None` if the
    /// user has no row.
    pub async fn reset(
        pool: &PgPool,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLivesRow>, sqlx::Error> {
        let query = format!(
            "UPDATE daily_lives SET current_lives = $2, last_reset_date = $3
             WHERE user_id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, DailyLivesRow>(&query)
            .bind(user_id)
            .bind(MAX_DAILY_LIVES)
            .bind(today)
            .fetch_optional(pool)
            .await
    }

    /// Refill every row last reset before `today`. Returns the number of rows updated.
    pub async fn reset_all(pool: &PgPool, today: Date) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE daily_lives SET current_lives = $1, last_reset_date = $2
             WHERE last_reset_date < $2",
        )
        .bind(MAX_DAILY_LIVES)
        .bind(today)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
