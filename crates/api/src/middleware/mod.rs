//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller, decoded from a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- `admin` or `super_admin`.
//! - [`rbac::RequireStaff`] -- `teacher`, `admin` or `super_admin`.

pub mod auth;
pub mod rbac;
