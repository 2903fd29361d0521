//! services/api/src/web/semesters.rs
//!
//! CRUD endpoints for semesters. The registration and add/drop windows that
//! gate enrollment live on these rows.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::Json;
use uuid::Uuid;

use cotbe_portal_core::domain::{NewSemester, Semester, SemesterUpdate};

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// GET /api/semesters
pub async fn list_semesters_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<Vec<Semester>>>, ApiFailure> {
    let semesters = state.store.list_semesters().await?;
    Ok(Json(ApiEnvelope::data(semesters)))
}

/// GET /api/semesters/{id}
pub async fn get_semester_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<Semester>>, ApiFailure> {
    let semester = state.store.get_semester(id).await?;
    Ok(Json(ApiEnvelope::data(semester)))
}

/// POST /api/semesters
pub async fn create_semester_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewSemester>,
) -> Result<Json<ApiEnvelope<Semester>>, ApiFailure> {
    let semester = state.store.create_semester(new).await?;
    record_audit(
        &state,
        &auth.username,
        "semester.created",
        "semester",
        Some(semester.id),
        format!("Created semester '{}'", semester.name),
    )
    .await;
    Ok(Json(ApiEnvelope::data(semester)))
}

/// PUT /api/semesters/{id}
pub async fn update_semester_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<SemesterUpdate>,
) -> Result<Json<ApiEnvelope<Semester>>, ApiFailure> {
    let semester = state.store.update_semester(id, update).await?;
    record_audit(
        &state,
        &auth.username,
        "semester.updated",
        "semester",
        Some(id),
        format!("Updated semester '{}'", semester.name),
    )
    .await;
    Ok(Json(ApiEnvelope::data(semester)))
}

/// DELETE /api/semesters/{id}
pub async fn delete_semester_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let semester = state.store.get_semester(id).await?;
    state.store.delete_semester(id).await?;
    record_audit(
        &state,
        &auth.username,
        "semester.deleted",
        "semester",
        Some(id),
        format!("Deleted semester '{}'", semester.name),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Semester deleted")))
}
