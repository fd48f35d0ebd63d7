//! Chapter approval rules and evaluation policy.
//!
//! An [`ApprovalRule`] states the minimum score a learner needs to pass a
//! chapter, how many attempts are budgeted, and whether errors from rejected
//! attempts carry over as a penalty. Each scoring attempt is recorded as an
//! [`ApprovalEvaluation`]. Everything in this module is pure; the
//! orchestration lives in [`crate::usecases::evaluate_approval`].

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};
use crate::validation::validate_percentage;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

pub const STATUS_APPROVED: &str = "approved";
pub const STATUS_REJECTED: &str = "rejected";
pub const STATUS_PENDING: &str = "pending";
pub const STATUS_REQUIRES_REVIEW: &str = "requires_review";

/// All valid evaluation status values.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_APPROVED,
    STATUS_REJECTED,
    STATUS_PENDING,
    STATUS_REQUIRES_REVIEW,
];

/// Lowest accepted `max_attempts`.
pub const MIN_ATTEMPTS: i32 = 1;

/// Highest accepted `max_attempts`.
pub const MAX_ATTEMPTS_LIMIT: i32 = 10;

/// Attempts budget used when a rule is created without one.
pub const DEFAULT_MAX_ATTEMPTS: i32 = 3;

/// Threshold of chapters that demand a perfect score.
pub const PERFECT_SCORE: f64 = 100.0;

/// Points subtracted from the raw score for every carried error.
pub const CARRYOVER_PENALTY_PER_ERROR: f64 = 0.5;

// ---------------------------------------------------------------------------
// Status
// ---------------------------------------------------------------------------

/// Outcome of a single evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationStatus {
    Approved,
    Rejected,
    Pending,
    RequiresReview,
}

impl EvaluationStatus {
    /// Convert from a database string value.
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            STATUS_APPROVED => Ok(Self::Approved),
            STATUS_REJECTED => Ok(Self::Rejected),
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_REQUIRES_REVIEW => Ok(Self::RequiresReview),
            _ => Err(format!(
                "Invalid evaluation status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            )),
        }
    }

    /// Convert to the database string value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approved => STATUS_APPROVED,
            Self::Rejected => STATUS_REJECTED,
            Self::Pending => STATUS_PENDING,
            Self::RequiresReview => STATUS_REQUIRES_REVIEW,
        }
    }
}

// ---------------------------------------------------------------------------
// Rules
// ---------------------------------------------------------------------------

/// A configured approval policy. `chapter_id == None` marks a global rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRule {
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

impl ApprovalRule {
    pub fn is_global(&self) -> bool {
        self.chapter_id.is_none()
    }

    /// Active rules apply to their own chapter; active global rules apply everywhere.
    pub fn is_applicable_to_chapter(&self, chapter_id: &str) -> bool {
        self.is_active
            && self
                .chapter_id
                .as_deref()
                .is_none_or(|own| own == chapter_id)
    }

    pub fn is_score_approved(&self, score: f64) -> bool {
        score >= self.min_score_threshold
    }

    /// Chapters that require a perfect score.
    pub fn has_special_requirements(&self) -> bool {
        self.min_score_threshold >= PERFECT_SCORE
    }

    pub fn can_retry_after_failure(&self, attempts_so_far: i32) -> bool {
        attempts_so_far < self.max_attempts
    }

    pub fn attempts_remaining(&self, attempts_so_far: i32) -> i32 {
        (self.max_attempts - attempts_so_far).max(0)
    }
}

/// DTO for inserting a rule.
#[derive(Debug, Clone, Deserialize)]
pub struct NewApprovalRule {
    pub chapter_id: Option<String>,
    pub min_score_threshold: f64,
    pub max_attempts: i32,
    pub allow_error_carryover: bool,
    pub is_active: bool,
    pub metadata: Option<serde_json::Value>,
    pub description: Option<String>,
}

/// Partial rule update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApprovalRuleChanges {
    pub min_score_threshold: Option<f64>,
    pub max_attempts: Option<i32>,
    pub allow_error_carryover: Option<bool>,
    pub is_active: Option<bool>,
    pub metadata: Option<serde_json::Value>,
    pub description: Option<String>,
}

impl ApprovalRuleChanges {
    pub fn is_empty(&self) -> bool {
        self.min_score_threshold.is_none()
            && self.max_attempts.is_none()
            && self.allow_error_carryover.is_none()
            && self.is_active.is_none()
            && self.metadata.is_none()
            && self.description.is_none()
    }
}

/// Validate a score threshold.
pub fn validate_threshold(threshold: f64) -> Result<(), CoreError> {
    validate_percentage(threshold, "min_score_threshold")
}

/// Validate an attempts budget.
pub fn validate_max_attempts(max_attempts: i32) -> Result<(), CoreError> {
    if !(MIN_ATTEMPTS..=MAX_ATTEMPTS_LIMIT).contains(&max_attempts) {
        return Err(CoreError::Validation(format!(
            "max_attempts must be between {MIN_ATTEMPTS} and {MAX_ATTEMPTS_LIMIT}, got {max_attempts}"
        )));
    }
    Ok(())
}

/// Pick the rule that governs `chapter_id`.
///
/// A chapter-specific rule wins over a global one. Among several candidates of
/// the same scope the most recently updated wins.
pub fn select_applicable_rule(rules: Vec<ApprovalRule>, chapter_id: &str) -> Option<ApprovalRule> {
    rules
        .into_iter()
        .filter(|r| r.is_applicable_to_chapter(chapter_id))
        .max_by(|a, b| {
            a.chapter_id
                .is_some()
                .cmp(&b.chapter_id.is_some())
                .then(a.updated_at.cmp(&b.updated_at))
        })
}

// ---------------------------------------------------------------------------
// Evaluations
// ---------------------------------------------------------------------------

/// A recorded scoring attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalEvaluation {
    pub id: DbId,
    pub user_id: DbId,
    pub rule_id: DbId,
    pub chapter_id: String,
    /// Raw score submitted for the attempt.
    pub score: f64,
    /// Rule threshold at the time of evaluation.
    pub threshold: f64,
    pub status: EvaluationStatus,
    pub attempt_number: i32,
    pub errors_from_previous_attempts: i32,
    pub feedback: Option<String>,
    pub evaluation_data: Option<serde_json::Value>,
    pub evaluated_at: Timestamp,
    pub created_at: Timestamp,
}

impl ApprovalEvaluation {
    pub fn is_approved(&self) -> bool {
        self.status == EvaluationStatus::Approved
    }

    pub fn is_rejected(&self) -> bool {
        self.status == EvaluationStatus::Rejected
    }

    pub fn has_error_carryover(&self) -> bool {
        self.errors_from_previous_attempts > 0
    }

    /// Raw score minus the carryover penalty recorded on this attempt.
    pub fn score_with_penalty(&self) -> f64 {
        adjusted_score(self.score, self.errors_from_previous_attempts)
    }

    /// Points missing to reach the threshold, rounded up.
    pub fn shortfall(&self) -> i32 {
        (self.threshold - self.score).max(0.0).ceil() as i32
    }
}

/// An evaluation that has not been persisted yet.
///
/// Starts as `pending`; [`approve`](Self::approve) or [`reject`](Self::reject)
/// settle it exactly once before it is handed to the store.
#[derive(Debug, Clone, PartialEq)]
pub struct NewApprovalEvaluation {
    pub user_id: DbId,
    pub rule_id: DbId,
    pub chapter_id: String,
    pub score: f64,
    pub threshold: f64,
    pub status: EvaluationStatus,
    pub attempt_number: i32,
    pub errors_from_previous_attempts: i32,
    pub feedback: Option<String>,
    pub evaluation_data: Option<serde_json::Value>,
}

impl NewApprovalEvaluation {
    pub fn approve(&mut self, feedback: impl Into<String>) {
        debug_assert_eq!(self.status, EvaluationStatus::Pending);
        self.status = EvaluationStatus::Approved;
        self.feedback = Some(feedback.into());
    }

    pub fn reject(&mut self, feedback: impl Into<String>) {
        debug_assert_eq!(self.status, EvaluationStatus::Pending);
        self.status = EvaluationStatus::Rejected;
        self.feedback = Some(feedback.into());
    }
}

/// Errors carried into the next attempt.
///
/// A rejected predecessor passes on its own carried count plus its shortfall.
/// An approved (or absent) predecessor starts the count over.
pub fn carried_errors(previous: Option<&ApprovalEvaluation>) -> i32 {
    match previous {
        Some(prev) if prev.is_rejected() => prev.errors_from_previous_attempts + prev.shortfall(),
        _ => 0,
    }
}

/// Apply the carryover penalty to a raw score, never going below zero.
pub fn adjusted_score(score: f64, carried_errors: i32) -> f64 {
    (score - f64::from(carried_errors) * CARRYOVER_PENALTY_PER_ERROR).max(0.0)
}

/// Approved iff `score >= threshold`.
pub fn decide_status(score: f64, threshold: f64) -> EvaluationStatus {
    if score >= threshold {
        EvaluationStatus::Approved
    } else {
        EvaluationStatus::Rejected
    }
}

/// Feedback text stored with an approved evaluation.
pub fn approval_feedback(adjusted: f64, threshold: f64) -> String {
    format!("Approved with score {adjusted:.1} (required {threshold:.1})")
}

/// Feedback text stored with a rejected evaluation.
pub fn rejection_feedback(adjusted: f64, threshold: f64, attempts_remaining: i32) -> String {
    if attempts_remaining > 0 {
        format!(
            "Score {adjusted:.1} is below the required {threshold:.1}; \
             {attempts_remaining} attempt(s) remaining"
        )
    } else {
        format!(
            "Score {adjusted:.1} is below the required {threshold:.1}; \
             maximum attempts reached"
        )
    }
}

// ---------------------------------------------------------------------------
// Read models
// ---------------------------------------------------------------------------

/// Optional filters for evaluation history.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EvaluationFilter {
    pub chapter_id: Option<String>,
    pub status: Option<EvaluationStatus>,
}

/// Evaluation as exposed in history listings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationHistoryItem {
    pub id: DbId,
    pub chapter_id: String,
    pub score: f64,
    pub threshold: f64,
    pub status: EvaluationStatus,
    pub attempt_number: i32,
    pub errors_from_previous_attempts: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
    pub evaluated_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub evaluation_data: Option<serde_json::Value>,
}

impl From<ApprovalEvaluation> for EvaluationHistoryItem {
    fn from(e: ApprovalEvaluation) -> Self {
        Self {
            id: e.id,
            chapter_id: e.chapter_id,
            score: e.score,
            threshold: e.threshold,
            status: e.status,
            attempt_number: e.attempt_number,
            errors_from_previous_attempts: e.errors_from_previous_attempts,
            feedback: e.feedback,
            evaluated_at: e.evaluated_at,
            evaluation_data: e.evaluation_data,
        }
    }
}

/// Aggregates over every evaluation recorded for one chapter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChapterEvaluationStats {
    pub total_evaluations: i64,
    pub approved_count: i64,
    pub rejected_count: i64,
    pub average_score: f64,
    pub average_attempts: f64,
}
