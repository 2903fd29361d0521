//! services/api/src/web/sections.rs
//!
//! CRUD endpoints for scheduled courses, the concrete sections students
//! register into. The list endpoint filters by semester and teacher so the
//! catalog page and the teacher dashboard share it.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use cotbe_portal_core::domain::{NewScheduledCourse, ScheduledCourse, ScheduledCourseUpdate};

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SectionListQuery {
    pub semester_id: Option<Uuid>,
    pub teacher_id: Option<Uuid>,
}

/// GET /api/scheduled-courses?semester_id=&teacher_id=
pub async fn list_scheduled_courses_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<SectionListQuery>,
) -> Result<Json<ApiEnvelope<Vec<ScheduledCourse>>>, ApiFailure> {
    let sections = state
        .store
        .list_scheduled_courses(query.semester_id, query.teacher_id)
        .await?;
    Ok(Json(ApiEnvelope::data(sections)))
}

/// GET /api/scheduled-courses/{id}
pub async fn get_scheduled_course_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<ScheduledCourse>>, ApiFailure> {
    let section = state.store.get_scheduled_course(id).await?;
    Ok(Json(ApiEnvelope::data(section)))
}

/// POST /api/scheduled-courses
pub async fn create_scheduled_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewScheduledCourse>,
) -> Result<Json<ApiEnvelope<ScheduledCourse>>, ApiFailure> {
    let section = state.store.create_scheduled_course(new).await?;
    record_audit(
        &state,
        &auth.username,
        "scheduled_course.created",
        "scheduled_course",
        Some(section.id),
        format!(
            "Scheduled section {} (capacity {})",
            section.section_number, section.max_capacity
        ),
    )
    .await;
    Ok(Json(ApiEnvelope::data(section)))
}

/// PUT /api/scheduled-courses/{id}
pub async fn update_scheduled_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<ScheduledCourseUpdate>,
) -> Result<Json<ApiEnvelope<ScheduledCourse>>, ApiFailure> {
    let section = state.store.update_scheduled_course(id, update).await?;
    record_audit(
        &state,
        &auth.username,
        "scheduled_course.updated",
        "scheduled_course",
        Some(id),
        format!("Updated section {}", section.section_number),
    )
    .await;
    Ok(Json(ApiEnvelope::data(section)))
}

/// DELETE /api/scheduled-courses/{id}
pub async fn delete_scheduled_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let section = state.store.get_scheduled_course(id).await?;
    state.store.delete_scheduled_course(id).await?;
    record_audit(
        &state,
        &auth.username,
        "scheduled_course.deleted",
        "scheduled_course",
        Some(id),
        format!("Deleted section {}", section.section_number),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Scheduled course deleted")))
}
