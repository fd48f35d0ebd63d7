//! Per-chapter learner progress.

use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

/// One row per (user, chapter).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub id: DbId,
    pub user_id: DbId,
    pub chapter_id: String,
    pub score: Option<f64>,
    pub last_activity: Timestamp,
    pub extra_data: Option<serde_json::Value>,
    /// Set once the learner completes the chapter.
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl UserProgress {
    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.user_id == user_id
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }
}

/// Upsert payload keyed by (user, chapter).
#[derive(Debug, Clone, PartialEq)]
pub struct NewUserProgress {
    pub user_id: DbId,
    pub chapter_id: String,
    pub score: Option<f64>,
    pub extra_data: Option<serde_json::Value>,
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProgressChanges {
    pub score: Option<f64>,
    pub extra_data: Option<serde_json::Value>,
}

/// A user's progress across chapters, newest activity first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressListing {
    pub progress: Vec<UserProgress>,
    pub total: i64,
}
