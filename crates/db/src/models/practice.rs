//! Practice session row.

use lingo_core::practice::{PracticeSession, PracticeType, SessionStatus};
use lingo_core::types::{DbId, Timestamp};
use sqlx::FromRow;

use super::DecodeError;

/// A row from the `practice_sessions` table.
#[derive(Debug, Clone, FromRow)]
pub struct PracticeSessionRow {
    pub id: DbId,
    pub user_id: DbId,
    pub chapter_id: Option<String>,
    pub practice_type: String,
    pub status: String,
    pub score: Option<f64>,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PracticeSessionRow> for PracticeSession {
    type Error = DecodeError;

    fn try_from(row: PracticeSessionRow) -> Result<Self, Self::Error> {
        let practice_type = PracticeType::from_str_value(&row.practice_type)
            .map_err(|e| DecodeError::new("practice_sessions.practice_type", e))?;
        let status = SessionStatus::from_str_value(&row.status)
            .map_err(|e| DecodeError::new("practice_sessions.status", e))?;
        Ok(PracticeSession {
            id: row.id,
            user_id: row.user_id,
            chapter_id: row.chapter_id,
            practice_type,
            status,
            score: row.score,
            started_at: row.started_at,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
