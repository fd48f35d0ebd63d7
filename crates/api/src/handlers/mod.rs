pub mod approval;
pub mod auth;
pub mod chapters;
pub mod lives;
pub mod practice;
pub mod progress;

use lingo_core::error::CoreError;
use lingo_core::types::DbId;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;

/// Pick the learner an approval request is about.
///
/// Defaults to the caller. Naming somebody else requires a staff role.
pub(crate) fn resolve_subject(auth: &AuthUser, requested: Option<DbId>) -> AppResult<DbId> {
    match requested {
        Some(user_id) if user_id != auth.user_id && !auth.is_staff() => {
            Err(AppError::Core(CoreError::Forbidden(
                "Only staff may act on behalf of another user".into(),
            )))
        }
        Some(user_id) => Ok(user_id),
        None => Ok(auth.user_id),
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use lingo_core::roles::{ROLE_STUDENT, ROLE_TEACHER};

    use super::*;

    fn caller(role: &str) -> AuthUser {
        AuthUser {
            user_id: 7,
            email: "caller@example.com".into(),
            role: role.into(),
        }
    }

    #[test]
    fn defaults_to_caller() {
        assert_eq!(resolve_subject(&caller(ROLE_STUDENT), None).unwrap(), 7);
        assert_eq!(resolve_subject(&caller(ROLE_STUDENT), Some(7)).unwrap(), 7);
    }

    #[test]
    fn students_cannot_name_other_users() {
        assert_matches!(
            resolve_subject(&caller(ROLE_STUDENT), Some(8)),
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
    }

    #[test]
    fn staff_can_name_other_users() {
        assert_eq!(resolve_subject(&caller(ROLE_TEACHER), Some(8)).unwrap(), 8);
    }
}
