//! Repository for the `approval_evaluations` table.
//!
//! Evaluations are append-only: there is no update or delete.

use lingo_core::approval::{EvaluationFilter, NewApprovalEvaluation, STATUS_APPROVED};
use lingo_core::types::DbId;
use sqlx::PgPool;

use crate::models::approval::{ApprovalEvaluationRow, ChapterStatsRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, user_id, rule_id, chapter_id, score, threshold, status, attempt_number, \
                        errors_from_previous_attempts, feedback, evaluation_data, evaluated_at, \
                        created_at";

/// Filter clause shared by the history page and its count. Binds `$1` user,
/// `$2` optional chapter, `$3` optional status.
const HISTORY_FILTER: &str = "user_id = $1
               AND ($2::TEXT IS NULL OR chapter_id = $2)
               AND ($3::TEXT IS NULL OR status = $3)";

pub struct ApprovalEvaluationRepo;

impl ApprovalEvaluationRepo {
    /// Insert a settled evaluation, returning the created row.
    ///
    /// Two concurrent attempts claiming the same number violate
    /// `uq_approval_evaluations_attempt`.
    pub async fn create(
        pool: &PgPool,
        input: &NewApprovalEvaluation,
    ) -> Result<ApprovalEvaluationRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO approval_evaluations
                (user_id, rule_id, chapter_id, score, threshold, status, attempt_number,
                 errors_from_previous_attempts, feedback, evaluation_data)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalEvaluationRow>(&query)
            .bind(input.user_id)
            .bind(input.rule_id)
            .bind(&input.chapter_id)
            .bind(input.score)
            .bind(input.threshold)
            .bind(input.status.as_str())
            .bind(input.attempt_number)
            .bind(input.errors_from_previous_attempts)
            .bind(&input.feedback)
            .bind(&input.evaluation_data)
            .fetch_one(pool)
            .await
    }

    /// Number of evaluations already recorded for (user, chapter).
    pub async fn count_attempts(
        pool: &PgPool,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<i64, sqlx::Error> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM approval_evaluations WHERE user_id = $1 AND chapter_id = $2",
        )
        .bind(user_id)
        .bind(chapter_id)
        .fetch_one(pool)
        .await?;
        Ok(count)
    }

    /// Most recent evaluation for (user, chapter).
    pub async fn find_latest(
        pool: &PgPool,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<Option<ApprovalEvaluationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_evaluations
             WHERE user_id = $1 AND chapter_id = $2
             ORDER BY attempt_number DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, ApprovalEvaluationRow>(&query)
            .bind(user_id)
            .bind(chapter_id)
            .fetch_optional(pool)
            .await
    }

    /// A page of a user's history, newest first.
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: &EvaluationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApprovalEvaluationRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_evaluations
             WHERE {HISTORY_FILTER}
             ORDER BY evaluated_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, ApprovalEvaluationRow>(&query)
            .bind(user_id)
            .bind(&filter.chapter_id)
            .bind(filter.status.map(|s| s.as_str()))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total rows matching the same filter as [`list_for_user`](Self::list_for_user).
    pub async fn count_for_user(
        pool: &PgPool,
        user_id: DbId,
        filter: &EvaluationFilter,
    ) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM approval_evaluations WHERE {HISTORY_FILTER}");
        let (count,): (i64,) = sqlx::query_as(&query)
            .bind(user_id)
            .bind(&filter.chapter_id)
            .bind(filter.status.map(|s| s.as_str()))
            .fetch_one(pool)
            .await?;
        Ok(count)
    }

    /// Aggregates over every evaluation for a chapter.
    pub async fn chapter_stats(
        pool: &PgPool,
        chapter_id: &str,
    ) -> Result<ChapterStatsRow, sqlx::Error> {
        sqlx::query_as::<_, ChapterStatsRow>(
            "SELECT
                COUNT(*)                                        AS total_evaluations,
                COUNT(*) FILTER (WHERE status = 'approved')     AS approved_count,
                COUNT(*) FILTER (WHERE status = 'rejected')     AS rejected_count,
                AVG(score)                                      AS average_score,
                AVG(attempt_number)::DOUBLE PRECISION           AS average_attempts
             FROM approval_evaluations
             WHERE chapter_id = $1",
        )
        .bind(chapter_id)
        .fetch_one(pool)
        .await
    }

    /// Distinct chapters with at least one approved evaluation for the user.
    pub async fn approved_chapters(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT DISTINCT chapter_id FROM approval_evaluations
             WHERE user_id = $1 AND status = $2
             ORDER BY chapter_id",
        )
        .bind(user_id)
        .bind(STATUS_APPROVED)
        .fetch_all(pool)
        .await
    }
}
