//! services/api/src/web/assessments.rs
//!
//! Assessment endpoints: the quizzes, assignments, and exams attached to a
//! section, with their weights and due dates.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use cotbe_portal_core::domain::{Assessment, AssessmentUpdate, NewAssessment};

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AssessmentListQuery {
    pub scheduled_course_id: Option<Uuid>,
}

/// GET /api/assessments?scheduled_course_id=
pub async fn list_assessments_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AssessmentListQuery>,
) -> Result<Json<ApiEnvelope<Vec<Assessment>>>, ApiFailure> {
    let assessments = state
        .store
        .list_assessments(query.scheduled_course_id)
        .await?;
    Ok(Json(ApiEnvelope::data(assessments)))
}

/// GET /api/assessments/{id}
pub async fn get_assessment_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<Assessment>>, ApiFailure> {
    let assessment = state.store.get_assessment(id).await?;
    Ok(Json(ApiEnvelope::data(assessment)))
}

/// POST /api/assessments
pub async fn create_assessment_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewAssessment>,
) -> Result<Json<ApiEnvelope<Assessment>>, ApiFailure> {
    let assessment = state.store.create_assessment(new).await?;
    record_audit(
        &state,
        &auth.username,
        "assessment.created",
        "assessment",
        Some(assessment.id),
        format!("Created assessment '{}'", assessment.title),
    )
    .await;
    Ok(Json(ApiEnvelope::data(assessment)))
}

/// PUT /api/assessments/{id}
pub async fn update_assessment_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<AssessmentUpdate>,
) -> Result<Json<ApiEnvelope<Assessment>>, ApiFailure> {
    let assessment = state.store.update_assessment(id, update).await?;
    record_audit(
        &state,
        &auth.username,
        "assessment.updated",
        "assessment",
        Some(id),
        format!("Updated assessment '{}'", assessment.title),
    )
    .await;
    Ok(Json(ApiEnvelope::data(assessment)))
}

/// DELETE /api/assessments/{id}
pub async fn delete_assessment_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let assessment = state.store.get_assessment(id).await?;
    state.store.delete_assessment(id).await?;
    record_audit(
        &state,
        &auth.username,
        "assessment.deleted",
        "assessment",
        Some(id),
        format!("Deleted assessment '{}'", assessment.title),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Assessment deleted")))
}
