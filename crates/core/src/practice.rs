//! Practice sessions and their lifecycle.
//!
//! ```text
//! started ──► in_progress ──► completed
//!    │             │
//!    └─────────────┴────────► abandoned
//! ```
//!
//! `completed` and `abandoned` are terminal.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Practice type
// ---------------------------------------------------------------------------

pub const TYPE_VOCABULARY: &str = "vocabulary";
pub const TYPE_QUIZ: &str = "quiz";
pub const TYPE_READING: &str = "reading";
pub const TYPE_INTERVIEW: &str = "interview";

pub const VALID_PRACTICE_TYPES: &[&str] = &[TYPE_VOCABULARY, TYPE_QUIZ, TYPE_READING, TYPE_INTERVIEW];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PracticeType {
    Vocabulary,
    Quiz,
    Reading,
    Interview,
}

impl PracticeType {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            TYPE_VOCABULARY => Ok(Self::Vocabulary),
            TYPE_QUIZ => Ok(Self::Quiz),
            TYPE_READING => Ok(Self::Reading),
            TYPE_INTERVIEW => Ok(Self::Interview),
            _ => Err(format!(
                "Invalid practice type '{s}'. Must be one of: {}",
                VALID_PRACTICE_TYPES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Vocabulary => TYPE_VOCABULARY,
            Self::Quiz => TYPE_QUIZ,
            Self::Reading => TYPE_READING,
            Self::Interview => TYPE_INTERVIEW,
        }
    }
}

// ---------------------------------------------------------------------------
// Session status
// ---------------------------------------------------------------------------

pub const SESSION_STARTED: &str = "started";
pub const SESSION_IN_PROGRESS: &str = "in_progress";
pub const SESSION_COMPLETED: &str = "completed";
pub const SESSION_ABANDONED: &str = "abandoned";

pub const VALID_SESSION_STATUSES: &[&str] = &[
    SESSION_STARTED,
    SESSION_IN_PROGRESS,
    SESSION_COMPLETED,
    SESSION_ABANDONED,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Started,
    InProgress,
    Completed,
    Abandoned,
}

impl SessionStatus {
    pub fn from_str_value(s: &str) -> Result<Self, String> {
        match s {
            SESSION_STARTED => Ok(Self::Started),
            SESSION_IN_PROGRESS => Ok(Self::InProgress),
            SESSION_COMPLETED => Ok(Self::Completed),
            SESSION_ABANDONED => Ok(Self::Abandoned),
            _ => Err(format!(
                "Invalid session status '{s}'. Must be one of: {}",
                VALID_SESSION_STATUSES.join(", ")
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Started => SESSION_STARTED,
            Self::InProgress => SESSION_IN_PROGRESS,
            Self::Completed => SESSION_COMPLETED,
            Self::Abandoned => SESSION_ABANDONED,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Abandoned)
    }
}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeSession {
    pub id: DbId,
    pub user_id: DbId,
    pub chapter_id: Option<String>,
    pub practice_type: PracticeType,
    pub status: SessionStatus,
    pub score: Option<f64>,
    pub started_at: Timestamp,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl PracticeSession {
    pub fn is_owned_by(&self, user_id: DbId) -> bool {
        self.user_id == user_id
    }

    /// Reject a transition out of a terminal state.
    pub fn ensure_open(&self) -> Result<(), CoreError> {
        if self.status.is_terminal() {
            return Err(CoreError::Conflict(format!(
                "Practice session {} is already {}",
                self.id,
                self.status.as_str()
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPracticeSession {
    pub user_id: DbId,
    pub chapter_id: Option<String>,
    pub practice_type: PracticeType,
}

/// A freshly started session and the lives left after paying for it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartedSession {
    pub session: PracticeSession,
    pub lives_remaining: i32,
}

/// Listing filter for a user's sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PracticeFilter {
    pub practice_type: Option<PracticeType>,
    pub limit: i64,
    pub offset: i64,
}
