//! Daily lives row.

use lingo_core::lives::DailyLives;
use lingo_core::types::{Date, DbId, Timestamp};
use sqlx::FromRow;

/// A row from the `daily_lives` table.
#[derive(Debug, Clone, FromRow)]
pub struct DailyLivesRow {
    pub id: DbId,
    pub user_id: DbId,
    pub current_lives: i32,
    pub last_reset_date: Date,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<DailyLivesRow> for DailyLives {
    fn from(row: DailyLivesRow) -> Self {
        DailyLives {
            id: row.id,
            user_id: row.user_id,
            current_lives: row.current_lives,
            last_reset_date: row.last_reset_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}
