//! Chapter status and completion for a learner.

use std::sync::Arc;

use crate::chapters::{
    chapter_statuses, course_chapters, ChapterCompletion, ChapterStatus, ChaptersOverview,
};
use crate::error::CoreError;
use crate::store::{ApprovalEvaluationStore, ApprovalRuleStore, ProgressStore};
use crate::types::DbId;
use crate::validation::validate_chapter_key;

async fn load_statuses(
    rules: &dyn ApprovalRuleStore,
    evaluations: &dyn ApprovalEvaluationStore,
    progress: &dyn ProgressStore,
    user_id: DbId,
) -> Result<Vec<ChapterStatus>, CoreError> {
    let course = course_chapters(&rules.list_active_rules().await?);
    let rows = progress.list_progress(user_id).await?;
    let approved = evaluations.approved_chapters(user_id).await?;
    Ok(chapter_statuses(&course, &rows, &approved))
}

pub struct GetChaptersStatus {
    rules: Arc<dyn ApprovalRuleStore>,
    evaluations: Arc<dyn ApprovalEvaluationStore>,
    progress: Arc<dyn ProgressStore>,
}

impl GetChaptersStatus {
    pub fn new(
        rules: Arc<dyn ApprovalRuleStore>,
        evaluations: Arc<dyn ApprovalEvaluationStore>,
        progress: Arc<dyn ProgressStore>,
    ) -> Self {
        Self {
            rules,
            evaluations,
            progress,
        }
    }

    pub async fn execute(&self, user_id: DbId) -> Result<ChaptersOverview, CoreError> {
        let statuses = load_statuses(
            self.rules.as_ref(),
            self.evaluations.as_ref(),
            self.progress.as_ref(),
            user_id,
        )
        .await?;
        Ok(ChaptersOverview::new(statuses))
    }
}

/// Mark an unlocked, approved chapter as completed. This opens the next one.
pub struct CompleteChapter {
    rules: Arc<dyn ApprovalRuleStore>,
    evaluations: Arc<dyn ApprovalEvaluationStore>,
    progress: Arc<dyn ProgressStore>,
}

impl CompleteChapter {
    pub fn new(
        rules: Arc<dyn ApprovalRuleStore>,
        evaluations: Arc<dyn ApprovalEvaluationStore>,
        progress: Arc<dyn ProgressStore>,
    ) -> Self {
        Self {
            rules,
            evaluations,
            progress,
        }
    }

    pub async fn execute(
        &self,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<ChapterCompletion, CoreError> {
        validate_chapter_key(chapter_id)?;

        let statuses = load_statuses(
            self.rules.as_ref(),
            self.evaluations.as_ref(),
            self.progress.as_ref(),
            user_id,
        )
        .await?;
        let index = statuses
            .iter()
            .position(|s| s.chapter_id == chapter_id)
            .ok_or_else(|| CoreError::not_found("Chapter", chapter_id))?;
        let status = &statuses[index];

        if !status.is_unlocked {
            return Err(CoreError::Forbidden(format!(
                "Chapter {chapter_id} is not unlocked yet"
            )));
        }
        if !status.is_approved {
            return Err(CoreError::Validation(format!(
                "Chapter {chapter_id} requires an approved evaluation before completion"
            )));
        }

        let newly_completed = !status.is_completed;
        let progress = self
            .progress
            .mark_chapter_completed(user_id, chapter_id)
            .await?;
        let next_chapter_id = statuses.get(index + 1).map(|s| s.chapter_id.clone());

        if newly_completed {
            tracing::info!(
                user_id,
                chapter_id,
                next_chapter_id = next_chapter_id.as_deref(),
                "Chapter completed",
            );
        }
        Ok(ChapterCompletion {
            chapter_completed: true,
            newly_completed,
            next_chapter_unlocked: next_chapter_id.is_some(),
            next_chapter_id,
            progress,
        })
    }
}
