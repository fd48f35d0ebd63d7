//! User accounts.

use serde::{Deserialize, Serialize};

use crate::roles::{is_admin_role, is_staff_role, ROLE_TEACHER};
use crate::types::{DbId, Timestamp};

pub const AUTH_PROVIDER_LOCAL: &str = "local";
pub const AUTH_PROVIDER_GOOGLE: &str = "google";

/// Password length bounds enforced at registration.
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 128;

/// A user account. The password hash never leaves the db crate's row model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub full_name: String,
    pub role: String,
    pub auth_provider: String,
    pub is_active: bool,
    pub is_email_verified: bool,
    pub last_login_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl User {
    pub fn is_admin(&self) -> bool {
        is_admin_role(&self.role)
    }

    pub fn is_teacher(&self) -> bool {
        self.role == ROLE_TEACHER
    }

    pub fn is_staff(&self) -> bool {
        is_staff_role(&self.role)
    }

    pub fn is_google_auth(&self) -> bool {
        self.auth_provider == AUTH_PROVIDER_GOOGLE
    }

    pub fn can_login(&self) -> bool {
        self.is_active
    }
}
