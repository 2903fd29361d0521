//! services/api/src/web/registrations.rs
//!
//! Registration endpoints: enrolling into sections, dropping, and grading.
//! The store decides between `Registered` and `Waitlisted` and keeps the
//! section enrollment counters in step; this layer adds the grading role
//! gate and the audit trail.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

use cotbe_portal_core::domain::{NewRegistration, Registration, RegistrationUpdate};

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::{require_role, AuthUser, TEACHING_ROLES};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct RegistrationListQuery {
    pub student_id: Option<Uuid>,
    pub scheduled_course_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegistrationCreateRequest {
    pub student_id: Uuid,
    pub scheduled_course_id: Uuid,
}

/// GET /api/registrations?student_id=&scheduled_course_id=
pub async fn list_registrations_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RegistrationListQuery>,
) -> Result<Json<ApiEnvelope<Vec<Registration>>>, ApiFailure> {
    let registrations = state
        .store
        .list_registrations(query.student_id, query.scheduled_course_id)
        .await?;
    Ok(Json(ApiEnvelope::data(registrations)))
}

/// GET /api/registrations/{id}
pub async fn get_registration_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<Registration>>, ApiFailure> {
    let registration = state.store.get_registration(id).await?;
    Ok(Json(ApiEnvelope::data(registration)))
}

/// POST /api/registrations - Register a student into a section
#[utoipa::path(
    post,
    path = "/api/registrations",
    request_body = RegistrationCreateRequest,
    responses(
        (status = 200, description = "Registered, or waitlisted when the section is full"),
        (status = 400, description = "Unknown references or registration window closed"),
        (status = 401, description = "Not signed in"),
        (status = 409, description = "Student already registered for this section")
    ),
    tag = "registrations"
)]
pub async fn create_registration_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(req): Json<RegistrationCreateRequest>,
) -> Result<Json<ApiEnvelope<Registration>>, ApiFailure> {
    let registration = state
        .store
        .create_registration(NewRegistration {
            student_id: req.student_id,
            scheduled_course_id: req.scheduled_course_id,
        })
        .await?;
    record_audit(
        &state,
        &auth.username,
        "registration.created",
        "registration",
        Some(registration.id),
        format!(
            "Student {} -> section {} ({:?})",
            registration.student_id, registration.scheduled_course_id, registration.status
        ),
    )
    .await;
    info!(
        "Registration {} created with status {:?}",
        registration.id, registration.status
    );
    Ok(Json(ApiEnvelope::data(registration)))
}

/// PUT /api/registrations/{id} - Change status or record a final grade
pub async fn update_registration_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<RegistrationUpdate>,
) -> Result<Json<ApiEnvelope<Registration>>, ApiFailure> {
    let grading = update.final_grade.is_some();
    if grading {
        require_role(&auth, TEACHING_ROLES, "record grades")?;
    }
    let registration = state.store.update_registration(id, update).await?;
    let action = if grading {
        "registration.graded"
    } else {
        "registration.updated"
    };
    let detail = match (grading, registration.final_grade) {
        (true, Some(grade)) => format!("Recorded final grade {}", grade),
        _ => format!("Status now {:?}", registration.status),
    };
    record_audit(
        &state,
        &auth.username,
        action,
        "registration",
        Some(id),
        detail,
    )
    .await;
    Ok(Json(ApiEnvelope::data(registration)))
}

/// DELETE /api/registrations/{id}
pub async fn delete_registration_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let registration = state.store.get_registration(id).await?;
    state.store.delete_registration(id).await?;
    record_audit(
        &state,
        &auth.username,
        "registration.deleted",
        "registration",
        Some(id),
        format!(
            "Removed registration of student {} in section {}",
            registration.student_id, registration.scheduled_course_id
        ),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Registration deleted")))
}
