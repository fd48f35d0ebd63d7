//! Handlers for the `/auth` resource (register, login, me, account changes).

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use lingo_core::error::CoreError;
use lingo_core::roles::DEFAULT_ROLE;
use lingo_core::users::User;
use lingo_db::models::user::{CreateUser, UpdateProfile};
use lingo_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::auth::jwt::generate_access_token;
use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(email)]
    pub email: String,
    pub password: String,
    #[validate(length(min = 1, max = 255))]
    pub full_name: String,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

/// Request body for `PATCH /auth/me`. Omitted fields are left unchanged.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(min = 1, max = 255))]
    pub full_name: Option<String>,
}

/// Request body for `PUT /auth/me/password`.
#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1))]
    pub current_password: String,
    pub new_password: String,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub token_type: &'static str,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a local student account and return an access token for it.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    validate_password_strength(&input.password).map_err(AppError::BadRequest)?;

    let email = input.email.trim().to_lowercase();
    if UserRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "Email is already registered".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let create = CreateUser {
        email,
        password_hash,
        full_name: input.full_name.trim().to_string(),
        role: DEFAULT_ROLE.to_string(),
    };
    // A concurrent duplicate still trips `uq_users_email` and maps to 409.
    let user: User = UserRepo::create(&state.pool, &create).await?.into();

    tracing::info!(user_id = user.id, "User registered");

    let response = auth_response(&state, user)?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    input.validate()?;

    let row = UserRepo::find_by_email(&state.pool, &input.email)
        .await?
        .ok_or_else(invalid_credentials)?;

    // Accounts created through an external provider have no local password.
    let Some(password_hash) = row.password_hash.clone() else {
        return Err(invalid_credentials());
    };

    let password_valid = verify_password(&input.password, &password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::debug!(user_id = row.id, "Login rejected: wrong password");
        return Err(invalid_credentials());
    }

    let user: User = row.into();
    if !user.can_login() {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Account is deactivated".into(),
        )));
    }

    UserRepo::record_login(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, "User logged in");

    Ok(Json(auth_response(&state, user)?))
}

/// GET /api/v1/auth/me
pub async fn me(auth: AuthUser, State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let user: User = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", auth.user_id)))?
        .into();

    Ok(Json(DataResponse { data: user }))
}

/// PATCH /api/v1/auth/me
///
/// Change the caller's email and/or full name. A new email must not belong
/// to another account and has to be verified again.
pub async fn update_me(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;

    let changes = UpdateProfile {
        email: input.email.map(|e| e.trim().to_lowercase()),
        full_name: input.full_name.map(|n| n.trim().to_string()),
    };
    if changes.email.is_none() && changes.full_name.is_none() {
        return Err(AppError::BadRequest("No profile changes supplied".into()));
    }
    if changes.full_name.as_deref() == Some("") {
        return Err(AppError::BadRequest("full_name must not be blank".into()));
    }

    if let Some(email) = &changes.email {
        if let Some(owner) = UserRepo::find_by_email(&state.pool, email).await? {
            if owner.id != auth.user_id {
                return Err(AppError::Core(CoreError::Conflict(
                    "Email is already registered".into(),
                )));
            }
        }
    }

    // A concurrent claim on the same email still trips `uq_users_email`.
    let user: User = UserRepo::update_profile(&state.pool, auth.user_id, &changes)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", auth.user_id)))?
        .into();

    tracing::info!(user_id = user.id, "Profile updated");

    Ok(Json(DataResponse { data: user }))
}

/// PUT /api/v1/auth/me/password
///
/// Replace the caller's password after checking the current one.
pub async fn change_password(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    input.validate()?;

    let row = UserRepo::find_by_id(&state.pool, auth.user_id)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::not_found("User", auth.user_id)))?;
    let Some(password_hash) = row.password_hash else {
        return Err(AppError::BadRequest(
            "Account has no local password to change".into(),
        ));
    };

    let current_valid = verify_password(&input.current_password, &password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(AppError::Core(CoreError::Unauthorized(
            "Current password is incorrect".into(),
        )));
    }
    validate_password_strength(&input.new_password).map_err(AppError::BadRequest)?;

    let new_hash = hash_password(&input.new_password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::set_password_hash(&state.pool, auth.user_id, &new_hash).await?;

    tracing::info!(user_id = auth.user_id, "Password changed");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn invalid_credentials() -> AppError {
    AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into()))
}

fn auth_response(state: &AppState, user: User) -> AppResult<AuthResponse> {
    let access_token = generate_access_token(user.id, &user.email, &user.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        access_token,
        token_type: "Bearer",
        expires_in: state.config.jwt.expires_in_secs(),
        user,
    })
}
