//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod approval_evaluation_repo;
pub mod approval_rule_repo;
pub mod daily_lives_repo;
pub mod practice_session_repo;
pub mod progress_repo;
pub mod user_repo;

pub use approval_evaluation_repo::ApprovalEvaluationRepo;
pub use approval_rule_repo::ApprovalRuleRepo;
pub use daily_lives_repo::DailyLivesRepo;
pub use practice_session_repo::PracticeSessionRepo;
pub use progress_repo::ProgressRepo;
pub use user_repo::UserRepo;
