//! Repository for the `users` table.

use lingo_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{CreateUser, UpdateProfile, UserRow};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, email, password_hash, full_name, role, auth_provider, is_active, \
                        is_email_verified, last_login_at, created_at, updated_at";

/// Provides account lookups and writes.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new local account, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<UserRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (email, password_hash, full_name, role)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.full_name)
            .bind(&input.role)
            .fetch_one(pool)
            .await
    }

    /// Find a user by internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a user by email (case-insensitive).
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE lower(email) = lower($1)");
        sqlx::query_as::<_, UserRow>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Set `last_login_at` to now.
    pub async fn record_login(pool: &PgPool, id: DbId) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE users SET last_login_at = NOW() WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }

    /// Apply a profile change. `None` fields keep their stored value.
    ///
    /// A changed email drops the verified flag. Returns `None` if the user
    /// does not exist.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        changes: &UpdateProfile,
    ) -> Result<Option<UserRow>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                is_email_verified = CASE
                    WHEN $2::TEXT IS NOT NULL AND $2 <> email THEN false
                    ELSE is_email_verified
                END,
                email     = COALESCE($2, email),
                full_name = COALESCE($3, full_name)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserRow>(&query)
            .bind(id)
            .bind(&changes.email)
            .bind(&changes.full_name)
            .fetch_optional(pool)
            .await
    }

    /// Replace the stored password hash. Returns `false` if the user does not exist.
    pub async fn set_password_hash(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
            .bind(id)
            .bind(password_hash)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
