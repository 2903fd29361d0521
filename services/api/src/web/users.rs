//! services/api/src/web/users.rs
//!
//! Account management endpoints. Every route is staff-only. Raw passwords are
//! hashed here at the edge; the store and core never see them.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::Json;
use chrono::NaiveDate;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use cotbe_portal_core::domain::{NewUser, User, UserRole, UserUpdate};
use cotbe_portal_core::ports::PortError;

use crate::web::audit::record_audit;
use crate::web::auth::hash_password;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::{require_role, AuthUser, STAFF_ROLES};
use crate::web::state::AppState;

//=========================================================================================
// Request Types
//=========================================================================================

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub department_id: Option<Uuid>,
    pub office: Option<String>,
    pub job_title: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

/// Same shape as the store's user update, with a raw `password` in place of
/// the hash.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub role: Option<UserRole>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub is_active: Option<bool>,
    pub password: Option<String>,
    pub department_id: Option<Uuid>,
    pub office: Option<String>,
    pub job_title: Option<String>,
    pub enrollment_date: Option<NaiveDate>,
    pub date_of_birth: Option<NaiveDate>,
    pub address: Option<String>,
    pub phone: Option<String>,
}

fn hash_raw_password(password: &str) -> Result<String, ApiFailure> {
    if password.trim().is_empty() {
        return Err(PortError::Invalid("Password must not be empty".to_string()).into());
    }
    Ok(hash_password(password)?)
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /api/users - All accounts
pub async fn list_users_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<ApiEnvelope<Vec<User>>>, ApiFailure> {
    require_role(&auth, STAFF_ROLES, "manage user accounts")?;
    let users = state.store.list_users().await?;
    Ok(Json(ApiEnvelope::data(users)))
}

/// GET /api/users/{id}
pub async fn get_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<User>>, ApiFailure> {
    require_role(&auth, STAFF_ROLES, "manage user accounts")?;
    let user = state.store.get_user(id).await?;
    Ok(Json(ApiEnvelope::data(user)))
}

/// POST /api/users
pub async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiEnvelope<User>>, ApiFailure> {
    require_role(&auth, STAFF_ROLES, "manage user accounts")?;
    let password_hash = hash_raw_password(&req.password)?;
    let user = state
        .store
        .create_user(NewUser {
            username: req.username,
            email: req.email,
            role: req.role,
            first_name: req.first_name,
            last_name: req.last_name,
            password_hash,
            department_id: req.department_id,
            office: req.office,
            job_title: req.job_title,
            enrollment_date: req.enrollment_date,
            date_of_birth: req.date_of_birth,
            address: req.address,
            phone: req.phone,
        })
        .await?;
    record_audit(
        &state,
        &auth.username,
        "user.created",
        "user",
        Some(user.id),
        format!("Created {} account '{}'", user.role, user.username),
    )
    .await;
    info!("User '{}' created by '{}'", user.username, auth.username);
    Ok(Json(ApiEnvelope::data(user)))
}

/// PUT /api/users/{id}
pub async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiEnvelope<User>>, ApiFailure> {
    require_role(&auth, STAFF_ROLES, "manage user accounts")?;
    let password_hash = match req.password.as_deref() {
        Some(raw) => Some(hash_raw_password(raw)?),
        None => None,
    };
    let user = state
        .store
        .update_user(
            id,
            UserUpdate {
                email: req.email,
                role: req.role,
                first_name: req.first_name,
                last_name: req.last_name,
                is_active: req.is_active,
                password_hash,
                department_id: req.department_id,
                office: req.office,
                job_title: req.job_title,
                enrollment_date: req.enrollment_date,
                date_of_birth: req.date_of_birth,
                address: req.address,
                phone: req.phone,
            },
        )
        .await?;
    record_audit(
        &state,
        &auth.username,
        "user.updated",
        "user",
        Some(user.id),
        format!("Updated account '{}'", user.username),
    )
    .await;
    Ok(Json(ApiEnvelope::data(user)))
}

/// DELETE /api/users/{id}
pub async fn delete_user_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    require_role(&auth, STAFF_ROLES, "manage user accounts")?;
    let user = state.store.get_user(id).await?;
    state.store.delete_user(id).await?;
    record_audit(
        &state,
        &auth.username,
        "user.deleted",
        "user",
        Some(id),
        format!("Deleted account '{}'", user.username),
    )
    .await;
    info!("User '{}' deleted by '{}'", user.username, auth.username);
    Ok(Json(ApiEnvelope::message("User deleted")))
}
