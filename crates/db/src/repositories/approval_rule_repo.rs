//! Repository for the `approval_rules` table.

use lingo_core::approval::{ApprovalRuleChanges, NewApprovalRule};
use lingo_core::types::DbId;
use sqlx::PgPool;

use crate::models::approval::ApprovalRuleRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, chapter_id, min_score_threshold, max_attempts, allow_error_carryover, \
                        is_active, metadata, description, created_at, updated_at";

/// Provides CRUD operations for approval rules. Rules are deactivated, never deleted.
pub struct ApprovalRuleRepo;

impl ApprovalRuleRepo {
    /// Insert a rule, returning the created row.
    ///
    /// A second rule for the same scope violates `uq_approval_rules_chapter`
    /// or `uq_approval_rules_global`.
    pub async fn create(
        pool: &PgPool,
        input: &NewApprovalRule,
    ) -> Result<ApprovalRuleRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO approval_rules
                (chapter_id, min_score_threshold, max_attempts, allow_error_carryover,
                 is_active, metadata, description)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalRuleRow>(&query)
            .bind(&input.chapter_id)
            .bind(input.min_score_threshold)
            .bind(input.max_attempts)
            .bind(input.allow_error_carryover)
            .bind(input.is_active)
            .bind(&input.metadata)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ApprovalRuleRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM approval_rules WHERE id = $1");
        sqlx::query_as::<_, ApprovalRuleRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The rule for a scope (`None` = global), regardless of `is_active`.
    pub async fn find_by_scope(
        pool: &PgPool,
        chapter_id: Option<&str>,
    ) -> Result<Option<ApprovalRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_rules
             WHERE chapter_id IS NOT DISTINCT FROM $1"
        );
        sqlx::query_as::<_, ApprovalRuleRow>(&query)
            .bind(chapter_id)
            .fetch_optional(pool)
            .await
    }

    /// All active rules, the global rule first.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<ApprovalRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_rules
             WHERE is_active = true
             ORDER BY chapter_id NULLS FIRST"
        );
        sqlx::query_as::<_, ApprovalRuleRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Active rules that may govern `chapter_id`: its own rule and the global one.
    ///
    /// The chapter rule sorts first, then the most recently updated.
    pub async fn list_applicable(
        pool: &PgPool,
        chapter_id: &str,
    ) -> Result<Vec<ApprovalRuleRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM approval_rules
             WHERE is_active = true AND (chapter_id = $1 OR chapter_id IS NULL)
             ORDER BY chapter_id IS NULL ASC, updated_at DESC"
        );
        sqlx::query_as::<_, ApprovalRuleRow>(&query)
            .bind(chapter_id)
            .fetch_all(pool)
            .await
    }

    /// Update a rule. Only non-`None` fields in `changes` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        changes: &ApprovalRuleChanges,
    ) -> Result<Option<ApprovalRuleRow>, sqlx::Error> {
        let query = format!(
            "UPDATE approval_rules SET
                min_score_threshold   = COALESCE($2, min_score_threshold),
                max_attempts          = COALESCE($3, max_attempts),
                allow_error_carryover = COALESCE($4, allow_error_carryover),
                is_active             = COALESCE($5, is_active),
                metadata              = COALESCE($6, metadata),
                description           = COALESCE($7, description)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ApprovalRuleRow>(&query)
            .bind(id)
            .bind(changes.min_score_threshold)
            .bind(changes.max_attempts)
            .bind(changes.allow_error_carryover)
            .bind(changes.is_active)
            .bind(&changes.metadata)
            .bind(&changes.description)
            .fetch_optional(pool)
            .await
    }
}
