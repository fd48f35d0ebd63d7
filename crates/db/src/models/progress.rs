//! User progress row.

use lingo_core::progress::UserProgress;
use lingo_core::types::{DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `user_progress` table.
#[derive(Debug, Clone, FromRow)]
pub struct UserProgressRow {
    pub id: DbId,
    pub user_id: DbId,
    pub chapter_id: String,
    pub score: Option<f64>,
    pub last_activity: Timestamp,
    pub extra_data: Option<serde_json::Value>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<UserProgressRow> for UserProgress {
    fn from(row: UserProgressRow) -> Self {
        UserProgress {
            id: row.id,
            user_id: row.user_id,
            chapter_id: row.chapter_id,
            score: row.score,
            last_activity: row.last_activity,
            extra_data: row.extra_data,
            completed_at: row.completed_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
