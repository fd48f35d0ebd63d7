//! Persistence seams used by the use cases.
//!
//! The PostgreSQL implementation lives in `lingo_db::store::PgStore`; tests
//! substitute in-memory fakes. Every method reports failures as
//! [`CoreError`], with driver errors wrapped in [`CoreError::Store`].

use async_trait::async_trait;

use crate::approval::{
    ApprovalEvaluation, ApprovalRule, ApprovalRuleChanges, ChapterEvaluationStats,
    EvaluationFilter, NewApprovalEvaluation, NewApprovalRule,
};
use crate::error::CoreError;
use crate::lives::DailyLives;
use crate::practice::{
    NewPracticeSession, PracticeFilter, PracticeSession, PracticeType, StartedSession,
};
use crate::progress::{NewUserProgress, ProgressChanges, UserProgress};
use crate::types::{Date, DbId};
use crate::users::User;

// =============================================================================
// Approval
// =============================================================================

#[async_trait]
pub trait ApprovalRuleStore: Send + Sync {
    async fn find_rule(&self, id: DbId) -> Result<Option<ApprovalRule>, CoreError>;

    /// The rule configured for a scope (`None` = global), active or not.
    async fn find_rule_for_scope(
        &self,
        chapter_id: Option<&str>,
    ) -> Result<Option<ApprovalRule>, CoreError>;

    /// Active rules, global first, then by chapter.
    async fn list_active_rules(&self) -> Result<Vec<ApprovalRule>, CoreError>;

    /// Active rules that could govern `chapter_id`: its own rule plus global ones.
    async fn list_applicable_rules(&self, chapter_id: &str)
        -> Result<Vec<ApprovalRule>, CoreError>;

    async fn create_rule(&self, input: &NewApprovalRule) -> Result<ApprovalRule, CoreError>;

    /// Merge `changes` into the rule. `None` when the id is unknown.
    async fn update_rule(
        &self,
        id: DbId,
        changes: &ApprovalRuleChanges,
    ) -> Result<Option<ApprovalRule>, CoreError>;
}

#[async_trait]
pub trait ApprovalEvaluationStore: Send + Sync {
    async fn create_evaluation(
        &self,
        input: &NewApprovalEvaluation,
    ) -> Result<ApprovalEvaluation, CoreError>;

    async fn count_attempts(&self, user_id: DbId, chapter_id: &str) -> Result<i64, CoreError>;

    async fn find_latest_evaluation(
        &self,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<Option<ApprovalEvaluation>, CoreError>;

    /// Newest first.
    async fn list_evaluations(
        &self,
        user_id: DbId,
        filter: &EvaluationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApprovalEvaluation>, CoreError>;

    async fn count_evaluations(
        &self,
        user_id: DbId,
        filter: &EvaluationFilter,
    ) -> Result<i64, CoreError>;

    async fn chapter_stats(&self, chapter_id: &str) -> Result<ChapterEvaluationStats, CoreError>;

    /// Chapters in which the user holds at least one approved evaluation.
    async fn approved_chapters(&self, user_id: DbId) -> Result<Vec<String>, CoreError>;
}

// =============================================================================
// Users
// =============================================================================

#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn find_user(&self, id: DbId) -> Result<Option<User>, CoreError>;
}

// =============================================================================
// Daily lives
// =============================================================================

#[async_trait]
pub trait DailyLivesStore: Send + Sync {
    async fn find_lives(&self, user_id: DbId) -> Result<Option<DailyLives>, CoreError>;

    /// Return the user's record, creating a full one dated `today` if missing.
    async fn ensure_lives(&self, user_id: DbId, today: Date) -> Result<DailyLives, CoreError>;

    /// Spend one life under an exclusive row lock, refilling first when the
    /// day rolled over. `None` when there is no record or no life left; in
    /// that case nothing is written.
    async fn consume_life(
        &self,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLives>, CoreError>;

    /// Day rollover for one user. Refills only while `last_reset_date` is
    /// still before `today`; `None` when the record is missing or a
    /// concurrent writer already rolled it over.
    async fn refill_if_due(&self, user_id: DbId, today: Date)
        -> Result<Option<DailyLives>, CoreError>;

    /// Unconditional refill for one user. `None` when the user has no record.
    async fn reset_lives(&self, user_id: DbId, today: Date)
        -> Result<Option<DailyLives>, CoreError>;

    /// Refill every record last reset before `today`. Returns the row count.
    async fn reset_all_lives(&self, today: Date) -> Result<u64, CoreError>;
}

// =============================================================================
// Progress
// =============================================================================

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Insert or update the (user, chapter) row, refreshing `last_activity`.
    async fn upsert_progress(&self, input: &NewUserProgress) -> Result<UserProgress, CoreError>;

    async fn find_progress(&self, id: DbId) -> Result<Option<UserProgress>, CoreError>;

    /// Most recent activity first.
    async fn list_progress(&self, user_id: DbId) -> Result<Vec<UserProgress>, CoreError>;

    async fn update_progress(
        &self,
        id: DbId,
        changes: &ProgressChanges,
    ) -> Result<Option<UserProgress>, CoreError>;

    /// Stamp `completed_at` on the (user, chapter) row, creating it if
    /// needed. An earlier completion time is kept.
    async fn mark_chapter_completed(
        &self,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<UserProgress, CoreError>;
}

// =============================================================================
// Practice sessions
// =============================================================================

#[async_trait]
pub trait PracticeSessionStore: Send + Sync {
    /// Spend one of the user's lives and open a session as a single unit.
    ///
    /// Refills first when the day rolled over. `None` when there is no lives
    /// record or no life left. On `None` or on error nothing is written.
    async fn start_session(
        &self,
        input: &NewPracticeSession,
        today: Date,
    ) -> Result<Option<StartedSession>, CoreError>;

    async fn find_session(&self, id: DbId) -> Result<Option<PracticeSession>, CoreError>;

    /// Newest first.
    async fn list_sessions(
        &self,
        user_id: DbId,
        filter: &PracticeFilter,
    ) -> Result<Vec<PracticeSession>, CoreError>;

    async fn count_sessions(
        &self,
        user_id: DbId,
        practice_type: Option<PracticeType>,
    ) -> Result<i64, CoreError>;

    /// Mark completed with a score. `None` when the session is not open.
    async fn complete_session(
        &self,
        id: DbId,
        score: f64,
    ) -> Result<Option<PracticeSession>, CoreError>;

    /// Mark abandoned. `None` when the session is not open.
    async fn abandon_session(&self, id: DbId) -> Result<Option<PracticeSession>, CoreError>;
}
