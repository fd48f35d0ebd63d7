//! Approval rule and evaluation rows.

use lingo_core::approval::{
    ApprovalEvaluation, ApprovalRule, ChapterEvaluationStats, EvaluationStatus,
};
use lingo_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::DecodeError;

/// A row from the `approval_rules` table. Maps one-to-one onto [`ApprovalRule`].
#[derive(Debug, Clone, FromRow)]
pub struct ApprovalRuleRow {
    pub id: DbId,
    pub chapter_id: Option<String>,
    pub min_score_threshold: f64,
    pub max_attempts: i32,
    pub allow_error_carryover: bool,
    pub is_active: bool,
    pub metadata: Option<serde_json::Value>,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ApprovalRuleRow> for ApprovalRule {
    fn from(row: ApprovalRuleRow) -> Self {
        ApprovalRule {
            id: row.id,
            chapter_id: row.chapter_id,
            min_score_threshold: row.min_score_threshold,
            max_attempts: row.max_attempts,
            allow_error_carryover: row.allow_error_carryover,
            is_active: row.is_active,
            metadata: row.metadata,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// A row from the `approval_evaluations` table.
#[derive(Debug, Clone, FromRow)]
pub struct ApprovalEvaluationRow {
    pub id: DbId,
    pub user_id: DbId,
    pub rule_id: DbId,
    pub chapter_id: String,
    pub score: f64,
    pub threshold: f64,
    pub status: String,
    pub attempt_number: i32,
    pub errors_from_previous_attempts: i32,
    pub feedback: Option<String>,
    pub evaluation_data: Option<serde_json::Value>,
    pub evaluated_at: Timestamp,
    pub created_at: Timestamp,
}

impl TryFrom<ApprovalEvaluationRow> for ApprovalEvaluation {
    type Error = DecodeError;

    fn try_from(row: ApprovalEvaluationRow) -> Result<Self, Self::Error> {
        let status = EvaluationStatus::from_str_value(&row.status)
            .map_err(|e| DecodeError::new("approval_evaluations.status", e))?;
        Ok(ApprovalEvaluation {
            id: row.id,
            user_id: row.user_id,
            rule_id: row.rule_id,
            chapter_id: row.chapter_id,
            score: row.score,
            threshold: row.threshold,
            status,
            attempt_number: row.attempt_number,
            errors_from_previous_attempts: row.errors_from_previous_attempts,
            feedback: row.feedback,
            evaluation_data: row.evaluation_data,
            evaluated_at: row.evaluated_at,
            created_at: row.created_at,
        })
    }
}

/// Aggregate row for one chapter. Averages are NULL when there are no rows.
#[derive(Debug, Clone, FromRow)]
pub struct ChapterStatsRow {
    pub total_evaluations: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
    pub average_score: Option<f64>,
    pub average_attempts: Option<f64>,
}

impl From<ChapterStatsRow> for ChapterEvaluationStats {
    fn from(row: ChapterStatsRow) -> Self {
        ChapterEvaluationStats {
            total_evaluations: row.total_evaluations,
            approved_count: row.approved_count,
            rejected_count: row.rejected_count,
            average_score: row.average_score.unwrap_or(0.0),
            average_attempts: row.average_attempts.unwrap_or(0.0),
        }
    }
}
