//! In-memory store used by the use-case tests.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use crate::approval::{
    ApprovalEvaluation, ApprovalRule, ApprovalRuleChanges, ChapterEvaluationStats,
    EvaluationFilter, EvaluationStatus, NewApprovalEvaluation, NewApprovalRule,
};
use crate::error::CoreError;
use crate::lives::{DailyLives, MAX_DAILY_LIVES};
use crate::practice::{
    NewPracticeSession, PracticeFilter, PracticeSession, PracticeType, SessionStatus,
    StartedSession,
};
use crate::progress::{NewUserProgress, ProgressChanges, UserProgress};
use crate::roles::ROLE_STUDENT;
use crate::store::{
    ApprovalEvaluationStore, ApprovalRuleStore, DailyLivesStore, PracticeSessionStore,
    ProgressStore, UserDirectory,
};
use crate::types::{Date, DbId};
use crate::users::{User, AUTH_PROVIDER_LOCAL};

#[derive(Default)]
struct State {
    next_id: DbId,
    users: Vec<User>,
    rules: Vec<ApprovalRule>,
    evaluations: Vec<ApprovalEvaluation>,
    lives: Vec<DailyLives>,
    progress: Vec<UserProgress>,
    sessions: Vec<PracticeSession>,
}

impl State {
    fn next_id(&mut self) -> DbId {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<State>,
    fail_session_writes: AtomicBool,
}

impl MemoryStore {
    pub async fn add_user(&self, role: &str) -> User {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let now = Utc::now();
        let user = User {
            id,
            email: format!("user{id}@example.com"),
            full_name: format!("User {id}"),
            role: role.to_string(),
            auth_provider: AUTH_PROVIDER_LOCAL.to_string(),
            is_active: true,
            is_email_verified: false,
            last_login_at: None,
            created_at: now,
            updated_at: now,
        };
        state.users.push(user.clone());
        user
    }

    pub async fn add_student(&self) -> User {
        self.add_user(ROLE_STUDENT).await
    }

    pub async fn put_lives(&self, user_id: DbId, current_lives: i32, last_reset_date: Date) {
        let mut state = self.state.lock().await;
        let id = state.next_id();
        let now = Utc::now();
        state.lives.retain(|l| l.user_id != user_id);
        state.lives.push(DailyLives {
            id,
            user_id,
            current_lives,
            last_reset_date,
            created_at: now,
            updated_at: now,
        });
    }

    pub async fn session_count(&self) -> usize {
        self.state.lock().await.sessions.len()
    }

    /// Make every later session insert fail.
    pub fn fail_session_writes(&self) {
        self.fail_session_writes.store(true, Ordering::SeqCst);
    }
}

fn matches_filter(e: &ApprovalEvaluation, user_id: DbId, filter: &EvaluationFilter) -> bool {
    e.user_id == user_id
        && filter.chapter_id.as_deref().is_none_or(|c| c == e.chapter_id)
        && filter.status.is_none_or(|s| s == e.status)
}

#[async_trait]
impl ApprovalRuleStore for MemoryStore {
    async fn find_rule(&self, id: DbId) -> Result<Option<ApprovalRule>, CoreError> {
        let state = self.state.lock().await;
        Ok(state.rules.iter().find(|r| r.id == id).cloned())
    }

    async fn find_rule_for_scope(
        &self,
        chapter_id: Option<&str>,
    ) -> Result<Option<ApprovalRule>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .rules
            .iter()
            .find(|r| r.chapter_id.as_deref() == chapter_id)
            .cloned())
    }

    async fn list_active_rules(&self) -> Result<Vec<ApprovalRule>, CoreError> {
        let state = self.state.lock().await;
        let mut rules: Vec<_> = state.rules.iter().filter(|r| r.is_active).cloned().collect();
        rules.sort_by(|a, b| a.chapter_id.cmp(&b.chapter_id));
        Ok(rules)
    }

    async fn list_applicable_rules(
        &self,
        chapter_id: &str,
    ) -> Result<Vec<ApprovalRule>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .rules
            .iter()
            .filter(|r| r.is_applicable_to_chapter(chapter_id))
            .cloned()
            .collect())
    }

    async fn create_rule(&self, input: &NewApprovalRule) -> Result<ApprovalRule, CoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let rule = ApprovalRule {
            id: state.next_id(),
            chapter_id: input.chapter_id.clone(),
            min_score_threshold: input.min_score_threshold,
            max_attempts: input.max_attempts,
            allow_error_carryover: input.allow_error_carryover,
            is_active: input.is_active,
            metadata: input.metadata.clone(),
            description: input.description.clone(),
            created_at: now,
            updated_at: now,
        };
        state.rules.push(rule.clone());
        Ok(rule)
    }

    async fn update_rule(
        &self,
        id: DbId,
        changes: &ApprovalRuleChanges,
    ) -> Result<Option<ApprovalRule>, CoreError> {
        let mut state = self.state.lock().await;
        let Some(rule) = state.rules.iter_mut().find(|r| r.id == id) else {
            return Ok(None);
        };
        if let Some(v) = changes.min_score_threshold {
            rule.min_score_threshold = v;
        }
        if let Some(v) = changes.max_attempts {
            rule.max_attempts = v;
        }
        if let Some(v) = changes.allow_error_carryover {
            rule.allow_error_carryover = v;
        }
        if let Some(v) = changes.is_active {
            rule.is_active = v;
        }
        if let Some(v) = &changes.metadata {
            rule.metadata = Some(v.clone());
        }
        if let Some(v) = &changes.description {
            rule.description = Some(v.clone());
        }
        rule.updated_at = Utc::now();
        Ok(Some(rule.clone()))
    }
}

#[async_trait]
impl ApprovalEvaluationStore for MemoryStore {
    async fn create_evaluation(
        &self,
        input: &NewApprovalEvaluation,
    ) -> Result<ApprovalEvaluation, CoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        let evaluation = ApprovalEvaluation {
            id: state.next_id(),
            user_id: input.user_id,
            rule_id: input.rule_id,
            chapter_id: input.chapter_id.clone(),
            score: input.score,
            threshold: input.threshold,
            status: input.status,
            attempt_number: input.attempt_number,
            errors_from_previous_attempts: input.errors_from_previous_attempts,
            feedback: input.feedback.clone(),
            evaluation_data: input.evaluation_data.clone(),
            evaluated_at: now,
            created_at: now,
        };
        state.evaluations.push(evaluation.clone());
        Ok(evaluation)
    }

    async fn count_attempts(&self, user_id: DbId, chapter_id: &str) -> Result<i64, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .evaluations
            .iter()
            .filter(|e| e.user_id == user_id && e.chapter_id == chapter_id)
            .count() as i64)
    }

    async fn find_latest_evaluation(
        &self,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<Option<ApprovalEvaluation>, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .evaluations
            .iter()
            .filter(|e| e.user_id == user_id && e.chapter_id == chapter_id)
            .max_by_key(|e| e.id)
            .cloned())
    }

    async fn list_evaluations(
        &self,
        user_id: DbId,
        filter: &EvaluationFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<ApprovalEvaluation>, CoreError> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .evaluations
            .iter()
            .filter(|e| matches_filter(e, user_id, filter))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count_evaluations(
        &self,
        user_id: DbId,
        filter: &EvaluationFilter,
    ) -> Result<i64, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .evaluations
            .iter()
            .filter(|e| matches_filter(e, user_id, filter))
            .count() as i64)
    }

    async fn chapter_stats(&self, chapter_id: &str) -> Result<ChapterEvaluationStats, CoreError> {
        let state = self.state.lock().await;
        let rows: Vec<_> = state
            .evaluations
            .iter()
            .filter(|e| e.chapter_id == chapter_id)
            .collect();
        if rows.is_empty() {
            return Ok(ChapterEvaluationStats::default());
        }
        let n = rows.len() as f64;
        Ok(ChapterEvaluationStats {
            total_evaluations: rows.len() as i64,
            approved_count: rows
                .iter()
                .filter(|e| e.status == EvaluationStatus::Approved)
                .count() as i64,
            rejected_count: rows
                .iter()
                .filter(|e| e.status == EvaluationStatus::Rejected)
                .count() as i64,
            average_score: rows.iter().map(|e| e.score).sum::<f64>() / n,
            average_attempts: rows.iter().map(|e| f64::from(e.attempt_number)).sum::<f64>() / n,
        })
    }

    async fn approved_chapters(&self, user_id: DbId) -> Result<Vec<String>, CoreError> {
        let state = self.state.lock().await;
        let mut chapters: Vec<String> = state
            .evaluations
            .iter()
            .filter(|e| e.user_id == user_id && e.status == EvaluationStatus::Approved)
            .map(|e| e.chapter_id.clone())
            .collect();
        chapters.sort();
        chapters.dedup();
        Ok(chapters)
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_user(&self, id: DbId) -> Result<Option<User>, CoreError> {
        let state = self.state.lock().await;
        Ok(state.users.iter().find(|u| u.id == id).cloned())
    }
}

#[async_trait]
impl DailyLivesStore for MemoryStore {
    async fn find_lives(&self, user_id: DbId) -> Result<Option<DailyLives>, CoreError> {
        let state = self.state.lock().await;
        Ok(state.lives.iter().find(|l| l.user_id == user_id).cloned())
    }

    async fn ensure_lives(&self, user_id: DbId, today: Date) -> Result<DailyLives, CoreError> {
        let mut state = self.state.lock().await;
        if let Some(existing) = state.lives.iter().find(|l| l.user_id == user_id) {
            return Ok(existing.clone());
        }
        let now = Utc::now();
        let lives = DailyLives {
            id: state.next_id(),
            user_id,
            current_lives: MAX_DAILY_LIVES,
            last_reset_date: today,
            created_at: now,
            updated_at: now,
        };
        state.lives.push(lives.clone());
        Ok(lives)
    }

    async fn consume_life(
        &self,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLives>, CoreError> {
        let mut state = self.state.lock().await;
        let Some(row) = state.lives.iter().find(|l| l.user_id == user_id) else {
            return Ok(None);
        };
        // Work on a copy so an exhausted record is left untouched.
        let mut working = row.clone();
        working.reset_if_due(today);
        if !working.consume() {
            return Ok(None);
        }
        working.updated_at = Utc::now();
        if let Some(slot) = state.lives.iter_mut().find(|l| l.user_id == user_id) {
            *slot = working.clone();
        }
        Ok(Some(working))
    }

    async fn refill_if_due(
        &self,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLives>, CoreError> {
        let mut state = self.state.lock().await;
        Ok(state
            .lives
            .iter_mut()
            .find(|l| l.user_id == user_id && l.needs_reset(today))
            .map(|l| {
                l.reset(today);
                l.clone()
            }))
    }

    async fn reset_lives(
        &self,
        user_id: DbId,
        today: Date,
    ) -> Result<Option<DailyLives>, CoreError> {
        let mut state = self.state.lock().await;
        Ok(state
            .lives
            .iter_mut()
            .find(|l| l.user_id == user_id)
            .map(|l| {
                l.reset(today);
                l.clone()
            }))
    }

    async fn reset_all_lives(&self, today: Date) -> Result<u64, CoreError> {
        let mut state = self.state.lock().await;
        let mut n = 0;
        for l in state.lives.iter_mut().filter(|l| l.needs_reset(today)) {
            l.reset(today);
            n += 1;
        }
        Ok(n)
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn upsert_progress(&self, input: &NewUserProgress) -> Result<UserProgress, CoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        if let Some(row) = state
            .progress
            .iter_mut()
            .find(|p| p.user_id == input.user_id && p.chapter_id == input.chapter_id)
        {
            if input.score.is_some() {
                row.score = input.score;
            }
            if input.extra_data.is_some() {
                row.extra_data = input.extra_data.clone();
            }
            row.last_activity = now;
            row.updated_at = now;
            return Ok(row.clone());
        }
        let row = UserProgress {
            id: state.next_id(),
            user_id: input.user_id,
            chapter_id: input.chapter_id.clone(),
            score: input.score,
            last_activity: now,
            extra_data: input.extra_data.clone(),
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        state.progress.push(row.clone());
        Ok(row)
    }

    async fn find_progress(&self, id: DbId) -> Result<Option<UserProgress>, CoreError> {
        let state = self.state.lock().await;
        Ok(state.progress.iter().find(|p| p.id == id).cloned())
    }

    async fn list_progress(&self, user_id: DbId) -> Result<Vec<UserProgress>, CoreError> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .progress
            .iter()
            .filter(|p| p.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));
        Ok(rows)
    }

    async fn update_progress(
        &self,
        id: DbId,
        changes: &ProgressChanges,
    ) -> Result<Option<UserProgress>, CoreError> {
        let mut state = self.state.lock().await;
        let Some(row) = state.progress.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        if changes.score.is_some() {
            row.score = changes.score;
        }
        if changes.extra_data.is_some() {
            row.extra_data = changes.extra_data.clone();
        }
        let now = Utc::now();
        row.last_activity = now;
        row.updated_at = now;
        Ok(Some(row.clone()))
    }

    async fn mark_chapter_completed(
        &self,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<UserProgress, CoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        if let Some(row) = state
            .progress
            .iter_mut()
            .find(|p| p.user_id == user_id && p.chapter_id == chapter_id)
        {
            row.completed_at.get_or_insert(now);
            row.last_activity = now;
            row.updated_at = now;
            return Ok(row.clone());
        }
        let row = UserProgress {
            id: state.next_id(),
            user_id,
            chapter_id: chapter_id.to_string(),
            score: None,
            last_activity: now,
            extra_data: None,
            completed_at: Some(now),
            created_at: now,
            updated_at: now,
        };
        state.progress.push(row.clone());
        Ok(row)
    }
}

#[async_trait]
impl PracticeSessionStore for MemoryStore {
    async fn start_session(
        &self,
        input: &NewPracticeSession,
        today: Date,
    ) -> Result<Option<StartedSession>, CoreError> {
        let mut state = self.state.lock().await;
        let Some(row) = state.lives.iter().find(|l| l.user_id == input.user_id) else {
            return Ok(None);
        };
        let mut lives = row.clone();
        lives.reset_if_due(today);
        if !lives.consume() {
            return Ok(None);
        }
        if self.fail_session_writes.load(Ordering::SeqCst) {
            return Err(CoreError::store(ConnectionLost));
        }

        let now = Utc::now();
        lives.updated_at = now;
        if let Some(slot) = state.lives.iter_mut().find(|l| l.user_id == input.user_id) {
            *slot = lives.clone();
        }
        let session = PracticeSession {
            id: state.next_id(),
            user_id: input.user_id,
            chapter_id: input.chapter_id.clone(),
            practice_type: input.practice_type,
            status: SessionStatus::Started,
            score: None,
            started_at: now,
            completed_at: None,
            created_at: now,
            updated_at: now,
        };
        state.sessions.push(session.clone());
        Ok(Some(StartedSession {
            session,
            lives_remaining: lives.current_lives,
        }))
    }

    async fn find_session(&self, id: DbId) -> Result<Option<PracticeSession>, CoreError> {
        let state = self.state.lock().await;
        Ok(state.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn list_sessions(
        &self,
        user_id: DbId,
        filter: &PracticeFilter,
    ) -> Result<Vec<PracticeSession>, CoreError> {
        let state = self.state.lock().await;
        let mut rows: Vec<_> = state
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter(|s| filter.practice_type.is_none_or(|t| t == s.practice_type))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(rows
            .into_iter()
            .skip(filter.offset as usize)
            .take(filter.limit as usize)
            .collect())
    }

    async fn count_sessions(
        &self,
        user_id: DbId,
        practice_type: Option<PracticeType>,
    ) -> Result<i64, CoreError> {
        let state = self.state.lock().await;
        Ok(state
            .sessions
            .iter()
            .filter(|s| s.user_id == user_id)
            .filter(|s| practice_type.is_none_or(|t| t == s.practice_type))
            .count() as i64)
    }

    async fn complete_session(
        &self,
        id: DbId,
        score: f64,
    ) -> Result<Option<PracticeSession>, CoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        Ok(state
            .sessions
            .iter_mut()
            .find(|s| s.id == id && !s.status.is_terminal())
            .map(|s| {
                s.status = SessionStatus::Completed;
                s.score = Some(score);
                s.completed_at = Some(now);
                s.updated_at = now;
                s.clone()
            }))
    }

    async fn abandon_session(&self, id: DbId) -> Result<Option<PracticeSession>, CoreError> {
        let mut state = self.state.lock().await;
        let now = Utc::now();
        Ok(state
            .sessions
            .iter_mut()
            .find(|s| s.id == id && !s.status.is_terminal())
            .map(|s| {
                s.status = SessionStatus::Abandoned;
                s.completed_at = Some(now);
                s.updated_at = now;
                s.clone()
            }))
    }
}

// ---------------------------------------------------------------------------
// Failure injection
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
#[error("Database connection failed")]
pub struct ConnectionLost;

/// Evaluation store whose writes always fail.
pub struct FailingEvaluations;

#[async_trait]
impl ApprovalEvaluationStore for FailingEvaluations {
    async fn create_evaluation(
        &self,
        _input: &NewApprovalEvaluation,
    ) -> Result<ApprovalEvaluation, CoreError> {
        Err(CoreError::store(ConnectionLost))
    }

    async fn count_attempts(&self, _user_id: DbId, _chapter_id: &str) -> Result<i64, CoreError> {
        Ok(0)
    }

    async fn find_latest_evaluation(
        &self,
        _user_id: DbId,
        _chapter_id: &str,
    ) -> Result<Option<ApprovalEvaluation>, CoreError> {
        Ok(None)
    }

    async fn list_evaluations(
        &self,
        _user_id: DbId,
        _filter: &EvaluationFilter,
        _limit: i64,
        _offset: i64,
    ) -> Result<Vec<ApprovalEvaluation>, CoreError> {
        Err(CoreError::store(ConnectionLost))
    }

    async fn count_evaluations(
        &self,
        _user_id: DbId,
        _filter: &EvaluationFilter,
    ) -> Result<i64, CoreError> {
        Err(CoreError::store(ConnectionLost))
    }

    async fn chapter_stats(
        &self,
        _chapter_id: &str,
    ) -> Result<ChapterEvaluationStats, CoreError> {
        Err(CoreError::store(ConnectionLost))
    }

    async fn approved_chapters(&self, _user_id: DbId) -> Result<Vec<String>, CoreError> {
        Err(CoreError::store(ConnectionLost))
    }
}
