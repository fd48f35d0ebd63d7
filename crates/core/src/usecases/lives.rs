//! Daily lives operations.

use std::sync::Arc;

use crate::error::CoreError;
use crate::lives::DailyLives;
use crate::store::DailyLivesStore;
use crate::types::{today_utc, DbId};

/// Current lives for a user, creating the record and applying a pending
/// day rollover as needed.
pub struct GetDailyLives {
    lives: Arc<dyn DailyLivesStore>,
}

impl GetDailyLives {
    pub fn new(lives: Arc<dyn DailyLivesStore>) -> Self {
        Self { lives }
    }

    pub async fn execute(&self, user_id: DbId) -> Result<DailyLives, CoreError> {
        let today = today_utc();
        let record = self.lives.ensure_lives(user_id, today).await?;
        if !record.needs_reset(today) {
            return Ok(record);
        }
        if let Some(refilled) = self.lives.refill_if_due(user_id, today).await? {
            return Ok(refilled);
        }
        // Someone else rolled the day over first; their write stands.
        self.lives
            .find_lives(user_id)
            .await?
            .ok_or_else(|| CoreError::not_found("DailyLives", user_id))
    }
}

/// Spend one life. `Ok(None)` means the user is out of lives for today.
pub struct ConsumeLife {
    lives: Arc<dyn DailyLivesStore>,
}

impl ConsumeLife {
    pub fn new(lives: Arc<dyn DailyLivesStore>) -> Self {
        Self { lives }
    }

    pub async fn execute(&self, user_id: DbId) -> Result<Option<DailyLives>, CoreError> {
        let today = today_utc();
        self.lives.ensure_lives(user_id, today).await?;
        let consumed = self.lives.consume_life(user_id, today).await?;
        match &consumed {
            Some(l) => tracing::debug!(user_id, remaining = l.current_lives, "Life consumed"),
            None => tracing::info!(user_id, "No lives remaining"),
        }
        Ok(consumed)
    }
}

/// Admin refill for a single user.
pub struct ResetDailyLives {
    lives: Arc<dyn DailyLivesStore>,
}

impl ResetDailyLives {
    pub fn new(lives: Arc<dyn DailyLivesStore>) -> Self {
        Self { lives }
    }

    pub async fn execute(&self, user_id: DbId) -> Result<Option<DailyLives>, CoreError> {
        let reset = self.lives.reset_lives(user_id, today_utc()).await?;
        if reset.is_some() {
            tracing::info!(user_id, "Daily lives reset");
        }
        Ok(reset)
    }
}

/// Bulk refill of every record not yet reset today.
pub struct ResetAllLives {
    lives: Arc<dyn DailyLivesStore>,
}

impl ResetAllLives {
    pub fn new(lives: Arc<dyn DailyLivesStore>) -> Self {
        Self { lives }
    }

    pub async fn execute(&self) -> Result<u64, CoreError> {
        self.lives.reset_all_lives(today_utc()).await
    }
}
