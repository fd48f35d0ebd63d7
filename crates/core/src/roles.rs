//! Well-known role name constants.
//!
//! These must match the `users.role` check constraint in the initial migration.

pub const ROLE_STUDENT: &str = "student";
pub const ROLE_TEACHER: &str = "teacher";
pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPER_ADMIN: &str = "super_admin";

/// All valid role values.
pub const VALID_ROLES: &[&str] = &[ROLE_STUDENT, ROLE_TEACHER, ROLE_ADMIN, ROLE_SUPER_ADMIN];

/// Role assigned to self-registered accounts.
pub const DEFAULT_ROLE: &str = ROLE_STUDENT;

/// Admin or super admin.
pub fn is_admin_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_SUPER_ADMIN
}

/// Teachers and admins may inspect other learners' results.
pub fn is_staff_role(role: &str) -> bool {
    role == ROLE_TEACHER || is_admin_role(role)
}
