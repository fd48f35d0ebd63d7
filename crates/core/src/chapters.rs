//! Chapter progression.
//!
//! The course is the ordered set of chapters that carry their own active
//! approval rule. The first chapter is always open; each later one unlocks
//! when the chapter before it is completed. A chapter can be completed once
//! the learner holds an approved evaluation for it.

use std::cmp::Ordering;

use serde::Serialize;

use crate::approval::ApprovalRule;
use crate::progress::UserProgress;
use crate::types::Timestamp;

/// Numeric keys sort numerically and ahead of slugs; slugs sort lexically.
pub fn compare_chapter_keys(a: &str, b: &str) -> Ordering {
    match (a.parse::<u64>(), b.parse::<u64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

/// Ordered chapter keys of the course, taken from active chapter rules.
pub fn course_chapters(rules: &[ApprovalRule]) -> Vec<String> {
    let mut chapters: Vec<String> = rules
        .iter()
        .filter(|r| r.is_active)
        .filter_map(|r| r.chapter_id.clone())
        .collect();
    chapters.sort_by(|a, b| compare_chapter_keys(a, b));
    chapters.dedup();
    chapters
}

/// One chapter as seen by a learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterStatus {
    pub chapter_id: String,
    /// 1-based position in the course.
    pub position: i32,
    pub is_unlocked: bool,
    pub is_approved: bool,
    pub is_completed: bool,
    pub score: Option<f64>,
    pub last_activity: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

/// Every chapter of the course for one learner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChaptersOverview {
    pub chapters: Vec<ChapterStatus>,
    pub total: i64,
    pub completed: i64,
    /// First unlocked chapter not yet completed.
    pub current_chapter_id: Option<String>,
}

/// Fold progress rows and approvals onto the course order.
pub fn chapter_statuses(
    course: &[String],
    progress: &[UserProgress],
    approved: &[String],
) -> Vec<ChapterStatus> {
    let mut previous_completed = true;
    course
        .iter()
        .enumerate()
        .map(|(i, chapter_id)| {
            let row = progress.iter().find(|p| &p.chapter_id == chapter_id);
            let is_completed = row.is_some_and(UserProgress::is_completed);
            let status = ChapterStatus {
                chapter_id: chapter_id.clone(),
                position: i as i32 + 1,
                is_unlocked: previous_completed,
                is_approved: approved.contains(chapter_id),
                is_completed,
                score: row.and_then(|p| p.score),
                last_activity: row.map(|p| p.last_activity),
                completed_at: row.and_then(|p| p.completed_at),
            };
            previous_completed = is_completed;
            status
        })
        .collect()
}

impl ChaptersOverview {
    pub fn new(chapters: Vec<ChapterStatus>) -> Self {
        let completed = chapters.iter().filter(|c| c.is_completed).count() as i64;
        let current_chapter_id = chapters
            .iter()
            .find(|c| c.is_unlocked && !c.is_completed)
            .map(|c| c.chapter_id.clone());
        Self {
            total: chapters.len() as i64,
            completed,
            current_chapter_id,
            chapters,
        }
    }
}

/// Result of completing a chapter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterCompletion {
    pub chapter_completed: bool,
    /// `false` when the chapter had already been completed earlier.
    pub newly_completed: bool,
    pub next_chapter_unlocked: bool,
    pub next_chapter_id: Option<String>,
    pub progress: UserProgress,
}
