//! Score a chapter attempt against the rule that governs the chapter.

use std::sync::Arc;

use serde::Serialize;

use crate::approval::{
    adjusted_score, approval_feedback, carried_errors, decide_status, rejection_feedback,
    select_applicable_rule, ApprovalEvaluation, EvaluationStatus, NewApprovalEvaluation,
};
use crate::error::CoreError;
use crate::store::{ApprovalEvaluationStore, ApprovalRuleStore, UserDirectory};
use crate::types::DbId;
use crate::validation::{validate_chapter_key, validate_id, validate_percentage};

#[derive(Debug, Clone)]
pub struct EvaluateApprovalInput {
    pub user_id: DbId,
    pub chapter_id: String,
    pub score: f64,
    pub additional_data: Option<serde_json::Value>,
}

/// Result of an evaluation: the stored record plus derived retry information.
#[derive(Debug, Clone, Serialize)]
pub struct EvaluationOutcome {
    pub evaluation: ApprovalEvaluation,
    /// Score after the carryover penalty; equals the raw score without carryover.
    pub adjusted_score: f64,
    pub attempts_remaining: i32,
    pub can_retry: bool,
}

pub struct EvaluateApproval {
    users: Arc<dyn UserDirectory>,
    rules: Arc<dyn ApprovalRuleStore>,
    evaluations: Arc<dyn ApprovalEvaluationStore>,
}

impl EvaluateApproval {
    pub fn new(
        users: Arc<dyn UserDirectory>,
        rules: Arc<dyn ApprovalRuleStore>,
        evaluations: Arc<dyn ApprovalEvaluationStore>,
    ) -> Self {
        Self {
            users,
            rules,
            evaluations,
        }
    }

    pub async fn execute(&self, input: EvaluateApprovalInput) -> Result<EvaluationOutcome, CoreError> {
        validate_percentage(input.score, "score")?;
        validate_id(input.user_id, "user_id")?;
        validate_chapter_key(&input.chapter_id)?;

        if self.users.find_user(input.user_id).await?.is_none() {
            return Err(CoreError::not_found("User", input.user_id));
        }

        let candidates = self.rules.list_applicable_rules(&input.chapter_id).await?;
        let rule = select_applicable_rule(candidates, &input.chapter_id)
            .ok_or_else(|| CoreError::not_found("ApprovalRule", &input.chapter_id))?;

        let prior = self
            .evaluations
            .count_attempts(input.user_id, &input.chapter_id)
            .await?;
        let attempt_number = i32::try_from(prior + 1)
            .map_err(|_| CoreError::Internal("attempt counter overflow".to_string()))?;

        let carried = if rule.allow_error_carryover {
            let previous = self
                .evaluations
                .find_latest_evaluation(input.user_id, &input.chapter_id)
                .await?;
            carried_errors(previous.as_ref())
        } else {
            0
        };
        let adjusted = adjusted_score(input.score, carried);

        let mut draft = NewApprovalEvaluation {
            user_id: input.user_id,
            rule_id: rule.id,
            chapter_id: input.chapter_id,
            score: input.score,
            threshold: rule.min_score_threshold,
            status: EvaluationStatus::Pending,
            attempt_number,
            errors_from_previous_attempts: carried,
            feedback: None,
            evaluation_data: input.additional_data,
        };

        let attempts_remaining = rule.attempts_remaining(attempt_number);
        match decide_status(adjusted, rule.min_score_threshold) {
            EvaluationStatus::Approved => {
                draft.approve(approval_feedback(adjusted, rule.min_score_threshold))
            }
            _ => draft.reject(rejection_feedback(
                adjusted,
                rule.min_score_threshold,
                attempts_remaining,
            )),
        }

        let evaluation = self.evaluations.create_evaluation(&draft).await?;
        let can_retry = !evaluation.is_approved() && attempts_remaining > 0;

        tracing::info!(
            user_id = evaluation.user_id,
            chapter_id = %evaluation.chapter_id,
            rule_id = evaluation.rule_id,
            attempt = evaluation.attempt_number,
            status = evaluation.status.as_str(),
            "Approval evaluated",
        );

        Ok(EvaluationOutcome {
            evaluation,
            adjusted_score: adjusted,
            attempts_remaining,
            can_retry,
        })
    }
}
