//! Practice session lifecycle. Starting a session costs one daily life.

use std::sync::Arc;

use serde::Serialize;

use crate::error::CoreError;
use crate::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::practice::{
    NewPracticeSession, PracticeFilter, PracticeSession, PracticeType, StartedSession,
};
use crate::store::{DailyLivesStore, PracticeSessionStore};
use crate::types::{today_utc, DbId};
use crate::usecases::progress::Requester;
use crate::validation::{validate_chapter_key, validate_percentage};

const ENTITY: &str = "PracticeSession";

pub struct StartPracticeSession {
    lives: Arc<dyn DailyLivesStore>,
    sessions: Arc<dyn PracticeSessionStore>,
}

impl StartPracticeSession {
    pub fn new(lives: Arc<dyn DailyLivesStore>, sessions: Arc<dyn PracticeSessionStore>) -> Self {
        Self { lives, sessions }
    }

    /// The life is only spent when the session row is written with it.
    pub async fn execute(&self, input: NewPracticeSession) -> Result<StartedSession, CoreError> {
        if let Some(chapter_id) = &input.chapter_id {
            validate_chapter_key(chapter_id)?;
        }

        let today = today_utc();
        self.lives.ensure_lives(input.user_id, today).await?;
        let started = self
            .sessions
            .start_session(&input, today)
            .await?
            .ok_or_else(|| CoreError::Conflict("No lives remaining for today".to_string()))?;

        tracing::info!(
            user_id = started.session.user_id,
            session_id = started.session.id,
            practice_type = started.session.practice_type.as_str(),
            lives_remaining = started.lives_remaining,
            "Practice session started",
        );
        Ok(started)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PracticeSessionPage {
    pub sessions: Vec<PracticeSession>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

pub struct ListPracticeSessions {
    sessions: Arc<dyn PracticeSessionStore>,
}

impl ListPracticeSessions {
    pub fn new(sessions: Arc<dyn PracticeSessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn execute(
        &self,
        user_id: DbId,
        practice_type: Option<PracticeType>,
        limit: Option<i64>,
        offset: Option<i64>,
    ) -> Result<PracticeSessionPage, CoreError> {
        let filter = PracticeFilter {
            practice_type,
            limit: clamp_limit(limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT),
            offset: clamp_offset(offset),
        };
        let sessions = self.sessions.list_sessions(user_id, &filter).await?;
        let total = self.sessions.count_sessions(user_id, practice_type).await?;
        Ok(PracticeSessionPage {
            sessions,
            total,
            limit: filter.limit,
            offset: filter.offset,
        })
    }
}

async fn load_accessible(
    sessions: &dyn PracticeSessionStore,
    id: DbId,
    requester: Requester,
) -> Result<PracticeSession, CoreError> {
    let session = sessions
        .find_session(id)
        .await?
        .ok_or_else(|| CoreError::not_found(ENTITY, id))?;
    if !requester.can_access(session.user_id) {
        return Err(CoreError::Forbidden(
            "Cannot access another user's practice session".to_string(),
        ));
    }
    Ok(session)
}

pub struct GetPracticeSession {
    sessions: Arc<dyn PracticeSessionStore>,
}

impl GetPracticeSession {
    pub fn new(sessions: Arc<dyn PracticeSessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn execute(&self, id: DbId, requester: Requester) -> Result<PracticeSession, CoreError> {
        load_accessible(self.sessions.as_ref(), id, requester).await
    }
}

pub struct CompletePracticeSession {
    sessions: Arc<dyn PracticeSessionStore>,
}

impl CompletePracticeSession {
    pub fn new(sessions: Arc<dyn PracticeSessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn execute(
        &self,
        id: DbId,
        requester: Requester,
        score: f64,
    ) -> Result<PracticeSession, CoreError> {
        validate_percentage(score, "score")?;
        let session = load_accessible(self.sessions.as_ref(), id, requester).await?;
        session.ensure_open()?;

        let completed = self
            .sessions
            .complete_session(id, score)
            .await?
            .ok_or_else(|| CoreError::Conflict(format!("Practice session {id} is no longer open")))?;
        tracing::info!(session_id = id, score, "Practice session completed");
        Ok(completed)
    }
}

pub struct AbandonPracticeSession {
    sessions: Arc<dyn PracticeSessionStore>,
}

impl AbandonPracticeSession {
    pub fn new(sessions: Arc<dyn PracticeSessionStore>) -> Self {
        Self { sessions }
    }

    pub async fn execute(&self, id: DbId, requester: Requester) -> Result<PracticeSession, CoreError> {
        let session = load_accessible(self.sessions.as_ref(), id, requester).await?;
        session.ensure_open()?;

        let abandoned = self
            .sessions
            .abandon_session(id)
            .await?
            .ok_or_else(|| CoreError::Conflict(format!("Practice session {id} is no longer open")))?;
        tracing::info!(session_id = id, "Practice session abandoned");
        Ok(abandoned)
    }
}
