//! services/api/src/web/announcements.rs
//!
//! Announcement endpoints. Anyone signed in can read; posting is reserved
//! for teachers and staff. Announcements can be portal-wide, audience-scoped,
//! or pinned to a single section.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use cotbe_portal_core::domain::{Announcement, AnnouncementUpdate, Audience, NewAnnouncement};

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::{require_role, AuthUser, TEACHING_ROLES};
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AnnouncementListQuery {
    pub audience: Option<Audience>,
    pub scheduled_course_id: Option<Uuid>,
}

/// GET /api/announcements?audience=&scheduled_course_id=
pub async fn list_announcements_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AnnouncementListQuery>,
) -> Result<Json<ApiEnvelope<Vec<Announcement>>>, ApiFailure> {
    let announcements = state
        .store
        .list_announcements(query.audience, query.scheduled_course_id)
        .await?;
    Ok(Json(ApiEnvelope::data(announcements)))
}

/// GET /api/announcements/{id}
pub async fn get_announcement_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<Announcement>>, ApiFailure> {
    let announcement = state.store.get_announcement(id).await?;
    Ok(Json(ApiEnvelope::data(announcement)))
}

/// POST /api/announcements - Post an announcement (poster = caller)
pub async fn create_announcement_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewAnnouncement>,
) -> Result<Json<ApiEnvelope<Announcement>>, ApiFailure> {
    require_role(&auth, TEACHING_ROLES, "post announcements")?;
    let announcement = state.store.create_announcement(new, auth.id).await?;
    record_audit(
        &state,
        &auth.username,
        "announcement.created",
        "announcement",
        Some(announcement.id),
        format!(
            "Posted '{}' to {}",
            announcement.title, announcement.audience
        ),
    )
    .await;
    Ok(Json(ApiEnvelope::data(announcement)))
}

/// PUT /api/announcements/{id}
pub async fn update_announcement_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<AnnouncementUpdate>,
) -> Result<Json<ApiEnvelope<Announcement>>, ApiFailure> {
    let announcement = state.store.update_announcement(id, update).await?;
    record_audit(
        &state,
        &auth.username,
        "announcement.updated",
        "announcement",
        Some(id),
        format!("Updated announcement '{}'", announcement.title),
    )
    .await;
    Ok(Json(ApiEnvelope::data(announcement)))
}

/// DELETE /api/announcements/{id}
pub async fn delete_announcement_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let announcement = state.store.get_announcement(id).await?;
    state.store.delete_announcement(id).await?;
    record_audit(
        &state,
        &auth.username,
        "announcement.deleted",
        "announcement",
        Some(id),
        format!("Deleted announcement '{}'", announcement.title),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Announcement deleted")))
}
