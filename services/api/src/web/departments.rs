//! services/api/src/web/departments.rs
//!
//! CRUD endpoints for academic departments.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::Json;
use uuid::Uuid;

use cotbe_portal_core::domain::{Department, DepartmentUpdate, NewDepartment};

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// GET /api/departments
pub async fn list_departments_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<Vec<Department>>>, ApiFailure> {
    let departments = state.store.list_departments().await?;
    Ok(Json(ApiEnvelope::data(departments)))
}

/// GET /api/departments/{id}
pub async fn get_department_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<Department>>, ApiFailure> {
    let department = state.store.get_department(id).await?;
    Ok(Json(ApiEnvelope::data(department)))
}

/// POST /api/departments
pub async fn create_department_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewDepartment>,
) -> Result<Json<ApiEnvelope<Department>>, ApiFailure> {
    let department = state.store.create_department(new).await?;
    record_audit(
        &state,
        &auth.username,
        "department.created",
        "department",
        Some(department.id),
        format!("Created department '{}'", department.name),
    )
    .await;
    Ok(Json(ApiEnvelope::data(department)))
}

/// PUT /api/departments/{id}
pub async fn update_department_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<DepartmentUpdate>,
) -> Result<Json<ApiEnvelope<Department>>, ApiFailure> {
    let department = state.store.update_department(id, update).await?;
    record_audit(
        &state,
        &auth.username,
        "department.updated",
        "department",
        Some(id),
        format!("Updated department '{}'", department.name),
    )
    .await;
    Ok(Json(ApiEnvelope::data(department)))
}

/// DELETE /api/departments/{id}
pub async fn delete_department_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let department = state.store.get_department(id).await?;
    state.store.delete_department(id).await?;
    record_audit(
        &state,
        &auth.username,
        "department.deleted",
        "department",
        Some(id),
        format!("Deleted department '{}'", department.name),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Department deleted")))
}
