//! Read side of the approval engine: history pages, chapter stats, latest attempt.

use std::sync::Arc;

use serde::Serialize;

use crate::approval::{ChapterEvaluationStats, EvaluationFilter, EvaluationHistoryItem};
use crate::error::CoreError;
use crate::pagination::{clamp_limit, clamp_offset, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};
use crate::store::ApprovalEvaluationStore;
use crate::types::DbId;
use crate::validation::{validate_chapter_key, validate_id};

#[derive(Debug, Clone, Default)]
pub struct HistoryQuery {
    pub filter: EvaluationFilter,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationHistory {
    pub evaluations: Vec<EvaluationHistoryItem>,
    pub total: i64,
    /// True when the page came back full. A full last page also reports
    /// `true`; callers rely on `total` for an exact answer.
    pub has_more: bool,
}

pub struct GetEvaluationHistory {
    evaluations: Arc<dyn ApprovalEvaluationStore>,
}

impl GetEvaluationHistory {
    pub fn new(evaluations: Arc<dyn ApprovalEvaluationStore>) -> Self {
        Self { evaluations }
    }

    pub async fn execute(
        &self,
        user_id: DbId,
        query: HistoryQuery,
    ) -> Result<EvaluationHistory, CoreError> {
        validate_id(user_id, "user_id")?;
        if let Some(chapter_id) = &query.filter.chapter_id {
            validate_chapter_key(chapter_id)?;
        }
        let limit = clamp_limit(query.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
        let offset = clamp_offset(query.offset);

        let page = self
            .evaluations
            .list_evaluations(user_id, &query.filter, limit, offset)
            .await?;
        let total = self
            .evaluations
            .count_evaluations(user_id, &query.filter)
            .await?;

        let has_more = page.len() as i64 == limit;
        Ok(EvaluationHistory {
            evaluations: page.into_iter().map(EvaluationHistoryItem::from).collect(),
            total,
            has_more,
        })
    }
}

pub struct GetChapterEvaluationStats {
    evaluations: Arc<dyn ApprovalEvaluationStore>,
}

impl GetChapterEvaluationStats {
    pub fn new(evaluations: Arc<dyn ApprovalEvaluationStore>) -> Self {
        Self { evaluations }
    }

    pub async fn execute(&self, chapter_id: &str) -> Result<ChapterEvaluationStats, CoreError> {
        validate_chapter_key(chapter_id)?;
        self.evaluations.chapter_stats(chapter_id).await
    }
}

/// The newest attempt for (user, chapter), in the history item shape.
pub struct GetLatestEvaluation {
    evaluations: Arc<dyn ApprovalEvaluationStore>,
}

impl GetLatestEvaluation {
    pub fn new(evaluations: Arc<dyn ApprovalEvaluationStore>) -> Self {
        Self { evaluations }
    }

    pub async fn execute(
        &self,
        user_id: DbId,
        chapter_id: &str,
    ) -> Result<Option<EvaluationHistoryItem>, CoreError> {
        validate_id(user_id, "user_id")?;
        validate_chapter_key(chapter_id)?;
        let latest = self
            .evaluations
            .find_latest_evaluation(user_id, chapter_id)
            .await?;
        Ok(latest.map(EvaluationHistoryItem::from))
    }
}
