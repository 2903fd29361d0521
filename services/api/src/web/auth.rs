//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for login and logout, plus the argon2 helpers the
//! rest of the service uses to hash and verify passwords.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{Duration, Utc};
use cotbe_portal_core::ports::PortError;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{error, info};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::{session_id_from_cookies, AuthUser};
use crate::web::state::AppState;

/// How long a session cookie stays valid.
const SESSION_TTL_DAYS: i64 = 30;

//=========================================================================================
// Password Helpers
//=========================================================================================

/// Hashes a raw password with argon2 and a fresh salt.
pub fn hash_password(password: &str) -> Result<String, PortError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PortError::Unexpected(format!("Failed to hash password: {}", e)))
}

/// Verifies a raw password against a stored argon2 hash. A hash that fails to
/// parse counts as a failed verification.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            error!("Failed to parse stored password hash: {:?}", e);
            false
        }
    }
}

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

fn invalid_credentials() -> ApiFailure {
    ApiFailure {
        status: StatusCode::UNAUTHORIZED,
        error: "Invalid username or password".to_string(),
    }
}

/// POST /api/auth/login - Sign in with username and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful; the session cookie is set"),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiFailure> {
    // 1. Look the account up. Unknown usernames and bad passwords produce
    //    the same response.
    let user = state
        .store
        .get_user_by_username(&req.username)
        .await
        .map_err(|_| invalid_credentials())?;
    if !user.is_active {
        return Err(invalid_credentials());
    }

    // 2. Verify the password
    if !verify_password(&req.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    // 3. Create the auth session
    let auth_session_id = Uuid::new_v4().to_string();
    let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
    state
        .store
        .create_auth_session(&auth_session_id, user.id, expires_at)
        .await?;

    record_audit(
        &state,
        &user.username,
        "auth.login",
        "user",
        Some(user.id),
        format!("{} signed in", user.full_name()),
    )
    .await;
    info!("User '{}' logged in", user.username);

    // 4. Return the user inside the envelope with the session cookie set
    let cookie = format!(
        "session={}; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age={}",
        auth_session_id,
        Duration::days(SESSION_TTL_DAYS).num_seconds()
    );
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie)],
        Json(ApiEnvelope::data(user)),
    ))
}

/// POST /api/auth/logout - Sign out and invalidate the session
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    ),
    tag = "auth"
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiFailure> {
    let cookie_header = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiFailure {
            status: StatusCode::UNAUTHORIZED,
            error: "No session found".to_string(),
        })?;
    let auth_session_id = session_id_from_cookies(cookie_header).ok_or_else(|| ApiFailure {
        status: StatusCode::UNAUTHORIZED,
        error: "No session found".to_string(),
    })?;

    // Audit under the session's user while it still resolves.
    if let Ok(user) = state.store.validate_auth_session(auth_session_id).await {
        record_audit(
            &state,
            &user.username,
            "auth.logout",
            "user",
            Some(user.id),
            format!("{} signed out", user.full_name()),
        )
        .await;
        info!("User '{}' logged out", user.username);
    }
    state.store.delete_auth_session(auth_session_id).await?;

    let cookie = "session=; HttpOnly; Secure; SameSite=Lax; Path=/; Max-Age=0";
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, cookie.to_string())],
        Json(ApiEnvelope::message("Logged out")),
    ))
}

/// GET /api/auth/me - The authenticated caller's own account
pub async fn me_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiFailure> {
    let user = state.store.get_user(auth.id).await?;
    Ok(Json(ApiEnvelope::data(user)))
}
