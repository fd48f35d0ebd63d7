//! PostgreSQL implementation of the `lingo_core` store traits.
//!
//! Delegates to the zero-sized repositories and converts rows into domain
//! entities. Driver errors are wrapped with [`CoreError::store`] so callers
//! can still downcast them to [`sqlx::Error`].

use async_trait::async_trait;
use lingo_core::approval::{
    ApprovalEvaluation, ApprovalRule, ApprovalRuleChanges, ChapterEvaluationStats,
    EvaluationFilter, NewApprovalEvaluation, NewApprovalRule,
};
use lingo_core::error::CoreError;
use lingo_core::lives::DailyLives;
use lingo_core::practice::{
    NewPracticeSession, PracticeFilter, PracticeSession, PracticeType, StartedSession,
};
use lingo_core::progress::{NewUserProgress, ProgressChanges, UserProgress};
use lingo_core::store::{
    ApprovalEvaluationStore, ApprovalRuleStore, DailyLivesStore, PracticeSessionStore,
    ProgressStore, UserDirectory,
};
use lingo_core::types::{Date, DbId};
use lingo_core::users::User;
use sqlx::PgPool;

use crate::repositories::{
    ApprovalEvaluationRepo, ApprovalRuleRepo, DailyLivesRepo, PracticeSessionRepo, ProgressRepo,
    UserRepo,
};

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn convert_all<R, T, E>(rows: Vec<R>) -> Result<Vec<T>, CoreError>
where
    R: TryInto<T, Error = E>,
    E: std::error::Error + Send + Sync + 'static,
{
    rows.into_iter()
        .map(|r| r.try_into().map_err(CoreError::store))
        .collect()
}

#[async_trait]
impl ApprovalRuleStore for PgStore {
    async fn find_rule(&self, id: DbId) -> Result<Option<ApprovalRule>, CoreError> {
        let row = ApprovalRuleRepo::find_by_id(&self.pool, id)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(ApprovalRule::from))
    }

    async fn find_rule_for_scope(
        &self,
        chapter_id: Option<&str>,
    ) -> Result<Option<ApprovalRule>, CoreError> {
        let row = ApprovalRuleRepo::find_by_scope(&self.pool, chapter_id)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(ApprovalRule::from))
    }

    async fn list_active_rules(&self) -> Result<Vec<ApprovalRule>, CoreError> {
        let rows = ApprovalRuleRepo::list_active(&self.pool)
            .await
            .map_err(CoreError::store)?;
        Ok(rows.into_iter().map(ApprovalRule::from).collect())
    }

    async fn list_applicable_rules(
        &self,
        chapter_id: &str,
    ) -> Result<Vec<ApprovalRule>, CoreError> {
        let rows = ApprovalRuleRepo::list_applicable(&self.pool, chapter_id)
            .await
            .map_err(CoreError::store)?;
        Ok(rows.into_iter().map(ApprovalRule::from).collect())
    }

    async fn create_rule(&self, input: &NewApprovalRule) -> Result<ApprovalRule, CoreError> {
        let row = ApprovalRuleRepo::create(&self.pool, input)
            .await
            .map_err(CoreError::store)?;
        Ok(row.into())
    }

    async fn update_rule(
        &self,
        id: DbId,
        changes: &ApprovalRuleChanges,
    ) -> Result<Option<ApprovalRule>, CoreError> {
        let row = ApprovalRuleRepo::update(&self.pool, id, changes)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(ApprovalRule::from))
    }
}

#[async_trait]
impl ApprovalEvaluationStore for PgStore {
    async fn create_evaluation(
        &self,
        input: &NewApprovalEvaluation,
    ) -> Result<ApprovalEvaluation, CoreError> {
        let row = ApprovalEvaluationRepo::create(&self.pool, input)
            .await
            .map_err(CoreError::store)?;
        ApprovalEvaluation::try_from(row).map_err(CoreError::store)
    }

    async fn count_attempts(&self, user_id: DbId, chapter_id: &str) -> Result<i64, CoreError> {
        ApprovalEvaluationRepo::count_attempts(&self.pool, user_id, chapter_id)
            .await
            .map_err(CoreError::store)
    }

    async fn find_latest_evaluation(
        &self,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<Option<ApprovalEvaluation>, CoreError> {
        let row = ApprovalEvaluationRepo::find_latest(&self.pool, user_id, chapter_id)
            .await
            .map_err(CoreError::store)?;
        row.map(ApprovalEvaluation::try_from)
            .transpose()
            .map_err(CoreError::store)
    }

    async fn list_evaluations(
        &self,
        user_id: DbId,
        filter: &EvaluationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApprovalEvaluation>, CoreError> {
        let rows = ApprovalEvaluationRepo::list_for_user(&self.pool, user_id, filter, limit, offset)
            .await
            .map_err(CoreError::store)?;
        convert_all(rows)
    }

    async fn count_evaluations(
        &self,
        user_id: DbId,
        filter: &EvaluationFilter,
    ) -> Result<i64, CoreError> {
        ApprovalEvaluationRepo::count_for_user(&self.pool, user_id, filter)
            .await
            .map_err(CoreError::store)
    }

    async fn chapter_stats(&self, chapter_id: &str) -> Result<ChapterEvaluationStats, CoreError> {
        let row = ApprovalEvaluationRepo::chapter_stats(&self.pool, chapter_id)
            .await
            .map_err(CoreError::store)?;
        Ok(row.into())
    }

    async fn approved_chapters(&self, user_id: DbId) -> Result<Vec<String>, CoreError> {
        ApprovalEvaluationRepo::approved_chapters(&self.pool, user_id)
            .await
            .map_err(CoreError::store)
    }
}

#[async_trait]
impl UserDirectory for PgStore {
    async fn find_user(&self, id: DbId) -> Result<Option<User>, CoreError> {
        let row = UserRepo::find_by_id(&self.pool, id)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(User::from))
    }
}

#[async_trait]
impl DailyLivesStore for PgStore {
    async fn find_lives(&self, user_id: DbId) -> Result<Option<DailyLives>, CoreError> {
        let row = DailyLivesRepo::find_by_user(&self.pool, user_id)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(DailyLives::from))
    }

    async fn ensure_lives(&self, user_id: DbId, today: Date) -> Result<DailyLives, CoreError> {
        let row = DailyLivesRepo::ensure(&self.pool, user_id, today)
            .await
            .map_err(CoreError::store)?;
        Ok(row.into())
    }

    async fn consume_life(
        &self,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLives>, CoreError> {
        let row = DailyLivesRepo::consume(&self.pool, user_id, today)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(DailyLives::from))
    }

    async fn refill_if_due(
        &self,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLives>, CoreError> {
        let row = DailyLivesRepo::refill_if_due(&self.pool, user_id, today)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(DailyLives::from))
    }

    async fn reset_lives(
        &self,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLives>, CoreError> {
        let row = DailyLivesRepo::reset(&self.pool, user_id, today)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(DailyLives::from))
    }

    async fn reset_all_lives(&self, today: Date) -> Result<u64, CoreError> {
        DailyLivesRepo::reset_all(&self.pool, today)
            .await
            .map_err(CoreError::store)
    }
}

#[async_trait]
impl ProgressStore for PgStore {
    async fn upsert_progress(&self, input: &NewUserProgress) -> Result<UserProgress, CoreError> {
        let row = ProgressRepo::upsert(&self.pool, input)
            .await
            .map_err(CoreError::store)?;
        Ok(row.into())
    }

    async fn find_progress(&self, id: DbId) -> Result<Option<UserProgress>, CoreError> {
        let row = ProgressRepo::find_by_id(&self.pool, id)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(UserProgress::from))
    }

    async fn list_progress(&self, user_id: DbId) -> Result<Vec<UserProgress>, CoreError> {
        let rows = ProgressRepo::list_for_user(&self.pool, user_id)
            .await
            .map_err(CoreError::store)?;
        Ok(rows.into_iter().map(UserProgress::from).collect())
    }

    async fn update_progress(
        &self,
        id: DbId,
        changes: &ProgressChanges,
    ) -> Result<Option<UserProgress>, CoreError> {
        let row = ProgressRepo::update(&self.pool, id, changes)
            .await
            .map_err(CoreError::store)?;
        Ok(row.map(UserProgress::from))
    }

    async fn mark_chapter_completed(
        &self,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<UserProgress, CoreError> {
        let row = ProgressRepo::mark_completed(&self.pool, user_id, chapter_id)
            .await
            .map_err(CoreError::store)?;
        Ok(row.into())
    }
}

#[async_trait]
impl PracticeSessionStore for PgStore {
    async fn start_session(
        &self,
        input: &NewPracticeSession,
        today: Date,
    ) -> Result<Option<StartedSession>, CoreError> {
        let Some((session, lives)) = PracticeSessionRepo::start_with_life(&self.pool, input, today)
            .await
            .map_err(CoreError::store)?
        else {
            return Ok(None);
        };
        Ok(Some(StartedSession {
            session: PracticeSession::try_from(session).map_err(CoreError::store)?,
            lives_remaining: lives.current_lives,
        }))
    }

    async fn find_session(&self, id: DbId) -> Result<Option<PracticeSession>, CoreError> {
        let row = PracticeSessionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(CoreError::store)?;
        row.map(PracticeSession::try_from)
            .transpose()
            .map_err(CoreError::store)
    }

    async fn list_sessions(
        &self,
        user_id: DbId,
        filter: &PracticeFilter,
    ) -> Result<Vec<PracticeSession>, CoreError> {
        let rows = PracticeSessionRepo::list_for_user(&self.pool, user_id, filter)
            .await
            .map_err(CoreError::store)?;
        convert_all(rows)
    }

    async fn count_sessions(
        &self,
        user_id: DbId,
        practice_type: Option<PracticeType>,
    ) -> Result<i64, CoreError> {
        PracticeSessionRepo::count_for_user(&self.pool, user_id, practice_type)
            .await
            .map_err(CoreError::store)
    }

    async fn complete_session(
        &self,
        id: DbId,
        score: f64,
    ) -> Result<Option<PracticeSession>, CoreError> {
        let row = PracticeSessionRepo::mark_completed(&self.pool, id, score)
            .await
            .map_err(CoreError::store)?;
        row.map(PracticeSession::try_from)
            .transpose()
            .map_err(CoreError::store)
    }

    async fn abandon_session(&self, id: DbId) -> Result<Option<PracticeSession>, CoreError> {
        let row = PracticeSessionRepo::mark_abandoned(&self.pool, id)
            .await
            .map_err(CoreError::store)?;
        row.map(PracticeSession::try_from)
            .transpose()
            .map_err(CoreError::store)
    }
}
