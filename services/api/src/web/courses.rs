//! services/api/src/web/courses.rs
//!
//! CRUD endpoints for the catalog courses (the offerings a department owns,
//! independent of any particular semester).

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::Json;
use uuid::Uuid;

use cotbe_portal_core::domain::{Course, CourseUpdate, NewCourse};

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

/// GET /api/courses
pub async fn list_courses_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<Vec<Course>>>, ApiFailure> {
    let courses = state.store.list_courses().await?;
    Ok(Json(ApiEnvelope::data(courses)))
}

/// GET /api/courses/{id}
pub async fn get_course_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<Course>>, ApiFailure> {
    let course = state.store.get_course(id).await?;
    Ok(Json(ApiEnvelope::data(course)))
}

/// POST /api/courses
pub async fn create_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewCourse>,
) -> Result<Json<ApiEnvelope<Course>>, ApiFailure> {
    let course = state.store.create_course(new).await?;
    record_audit(
        &state,
        &auth.username,
        "course.created",
        "course",
        Some(course.id),
        format!("Created course {} '{}'", course.code, course.title),
    )
    .await;
    Ok(Json(ApiEnvelope::data(course)))
}

/// PUT /api/courses/{id}
pub async fn update_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<CourseUpdate>,
) -> Result<Json<ApiEnvelope<Course>>, ApiFailure> {
    let course = state.store.update_course(id, update).await?;
    record_audit(
        &state,
        &auth.username,
        "course.updated",
        "course",
        Some(id),
        format!("Updated course {}", course.code),
    )
    .await;
    Ok(Json(ApiEnvelope::data(course)))
}

/// DELETE /api/courses/{id}
pub async fn delete_course_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let course = state.store.get_course(id).await?;
    state.store.delete_course(id).await?;
    record_audit(
        &state,
        &auth.username,
        "course.deleted",
        "course",
        Some(id),
        format!("Deleted course {}", course.code),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Course deleted")))
}
