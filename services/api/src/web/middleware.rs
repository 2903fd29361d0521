//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes, plus the role gate used
//! by handlers that are restricted to particular portal roles.

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
};
use cotbe_portal_core::domain::UserRole;
use cotbe_portal_core::ports::PortError;
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::web::envelope::ApiFailure;
use crate::web::state::AppState;

/// The authenticated caller, inserted into request extensions by
/// `require_auth` and read back by handlers via `Extension<AuthUser>`.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: Uuid,
    pub username: String,
    pub role: UserRole,
}

/// Pulls the session id out of a `Cookie` header value.
pub fn session_id_from_cookies(cookie_header: &str) -> Option<&str> {
    cookie_header
        .split(';')
        .find_map(|c| c.trim().strip_prefix("session="))
}

/// Middleware that validates the auth session cookie and resolves the user.
///
/// If valid, inserts an `AuthUser` into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract cookie header
    let cookie_header = req
        .headers()
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Parse session ID from cookie
    let auth_session_id =
        session_id_from_cookies(cookie_header).ok_or(StatusCode::UNAUTHORIZED)?;

    // 3. Validate auth session in the store, get the user back
    let user = state
        .store
        .validate_auth_session(auth_session_id)
        .await
        .map_err(|e| {
            warn!("Rejected session cookie: {}", e);
            StatusCode::UNAUTHORIZED
        })?;

    // 4. Insert the authenticated caller into request extensions
    req.extensions_mut().insert(AuthUser {
        id: user.id,
        username: user.username,
        role: user.role,
    });

    // 5. Continue to the handler
    Ok(next.run(req).await)
}

/// Rejects callers whose role is not in `allowed`. `action` names the
/// operation for the error message.
pub fn require_role(
    auth: &AuthUser,
    allowed: &[UserRole],
    action: &str,
) -> Result<(), ApiFailure> {
    if allowed.contains(&auth.role) {
        Ok(())
    } else {
        Err(ApiFailure::from(PortError::Forbidden(format!(
            "Role {} may not {}",
            auth.role, action
        ))))
    }
}

/// The roles allowed to administer users, audit data, and the staff dashboard.
pub const STAFF_ROLES: &[UserRole] = &[UserRole::StaffHead, UserRole::Admin];

/// The roles allowed to grade and to manage course records.
pub const TEACHING_ROLES: &[UserRole] =
    &[UserRole::Teacher, UserRole::StaffHead, UserRole::Admin];
