//! services/api/src/web/materials.rs
//!
//! Course material endpoints. Material bodies double as the context the
//! course question-answering assistant reads, so they are plain text.

use std::sync::Arc;

use axum::extract::{Extension, Path, Query, State};
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use cotbe_portal_core::domain::{CourseMaterial, MaterialUpdate, NewMaterial};

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct MaterialListQuery {
    pub scheduled_course_id: Option<Uuid>,
}

/// GET /api/materials?scheduled_course_id=
pub async fn list_materials_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<MaterialListQuery>,
) -> Result<Json<ApiEnvelope<Vec<CourseMaterial>>>, ApiFailure> {
    let materials = state.store.list_materials(query.scheduled_course_id).await?;
    Ok(Json(ApiEnvelope::data(materials)))
}

/// GET /api/materials/{id}
pub async fn get_material_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<CourseMaterial>>, ApiFailure> {
    let material = state.store.get_material(id).await?;
    Ok(Json(ApiEnvelope::data(material)))
}

/// POST /api/materials - Upload material to a section (uploader = caller)
pub async fn create_material_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewMaterial>,
) -> Result<Json<ApiEnvelope<CourseMaterial>>, ApiFailure> {
    let material = state.store.create_material(new, auth.id).await?;
    record_audit(
        &state,
        &auth.username,
        "material.created",
        "material",
        Some(material.id),
        format!("Uploaded material '{}'", material.title),
    )
    .await;
    Ok(Json(ApiEnvelope::data(material)))
}

/// PUT /api/materials/{id}
pub async fn update_material_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<MaterialUpdate>,
) -> Result<Json<ApiEnvelope<CourseMaterial>>, ApiFailure> {
    let material = state.store.update_material(id, update).await?;
    record_audit(
        &state,
        &auth.username,
        "material.updated",
        "material",
        Some(id),
        format!("Updated material '{}'", material.title),
    )
    .await;
    Ok(Json(ApiEnvelope::data(material)))
}

/// DELETE /api/materials/{id}
pub async fn delete_material_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let material = state.store.get_material(id).await?;
    state.store.delete_material(id).await?;
    record_audit(
        &state,
        &auth.username,
        "material.deleted",
        "material",
        Some(id),
        format!("Deleted material '{}'", material.title),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Material deleted")))
}
