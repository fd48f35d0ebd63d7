//! Learner progress per chapter.

use std::sync::Arc;

use crate::error::CoreError;
use crate::progress::{NewUserProgress, ProgressChanges, ProgressListing, UserProgress};
use crate::store::{ProgressStore, UserDirectory};
use crate::types::DbId;
use crate::users::User;
use crate::validation::{validate_chapter_key, validate_percentage};

/// The caller on whose behalf an operation runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Requester {
    pub user_id: DbId,
    pub is_admin: bool,
}

impl Requester {
    pub fn can_access(&self, owner_id: DbId) -> bool {
        self.is_admin || self.user_id == owner_id
    }
}

fn validate_score(score: Option<f64>) -> Result<(), CoreError> {
    match score {
        Some(s) => validate_percentage(s, "score"),
        None => Ok(()),
    }
}

async fn require_user(users: &dyn UserDirectory, user_id: DbId) -> Result<User, CoreError> {
    users
        .find_user(user_id)
        .await?
        .ok_or_else(|| CoreError::not_found("User", user_id))
}

/// Record activity on a chapter, creating the row on first contact.
pub struct CreateProgress {
    users: Arc<dyn UserDirectory>,
    progress: Arc<dyn ProgressStore>,
}

impl CreateProgress {
    pub fn new(users: Arc<dyn UserDirectory>, progress: Arc<dyn ProgressStore>) -> Self {
        Self { users, progress }
    }

    pub async fn execute(&self, input: NewUserProgress) -> Result<UserProgress, CoreError> {
        validate_chapter_key(&input.chapter_id)?;
        validate_score(input.score)?;
        require_user(self.users.as_ref(), input.user_id).await?;

        let row = self.progress.upsert_progress(&input).await?;
        tracing::info!(user_id = row.user_id, chapter_id = %row.chapter_id, "Progress recorded");
        Ok(row)
    }
}

pub struct GetUserProgress {
    users: Arc<dyn UserDirectory>,
    progress: Arc<dyn ProgressStore>,
}

impl GetUserProgress {
    pub fn new(users: Arc<dyn UserDirectory>, progress: Arc<dyn ProgressStore>) -> Self {
        Self { users, progress }
    }

    pub async fn execute(
        &self,
        target_user_id: DbId,
        requester: Requester,
    ) -> Result<ProgressListing, CoreError> {
        if !requester.can_access(target_user_id) {
            return Err(CoreError::Forbidden(
                "Cannot view another user's progress".to_string(),
            ));
        }
        require_user(self.users.as_ref(), target_user_id).await?;

        let progress = self.progress.list_progress(target_user_id).await?;
        Ok(ProgressListing {
            total: progress.len() as i64,
            progress,
        })
    }
}

pub struct UpdateProgress {
    progress: Arc<dyn ProgressStore>,
}

impl UpdateProgress {
    pub fn new(progress: Arc<dyn ProgressStore>) -> Self {
        Self { progress }
    }

    pub async fn execute(
        &self,
        id: DbId,
        requester: Requester,
        changes: ProgressChanges,
    ) -> Result<UserProgress, CoreError> {
        validate_score(changes.score)?;

        let existing = self
            .progress
            .find_progress(id)
            .await?
            .ok_or_else(|| CoreError::not_found("UserProgress", id))?;
        if !existing.is_owned_by(requester.user_id) {
            return Err(CoreError::Forbidden(
                "Cannot update another user's progress".to_string(),
            ));
        }

        self.progress
            .update_progress(id, &changes)
            .await?
            .ok_or_else(|| CoreError::not_found("UserProgress", id))
    }
}
