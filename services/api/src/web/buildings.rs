//! services/api/src/web/buildings.rs
//!
//! CRUD endpoints for campus buildings and the rooms inside them. Rooms live
//! here rather than in their own module because every room operation is
//! anchored to a building.

use std::sync::Arc;

use axum::extract::{Extension, Path, State};
use axum::Json;
use uuid::Uuid;

use cotbe_portal_core::domain::{
    Building, BuildingUpdate, NewBuilding, NewRoom, Room, RoomUpdate,
};

use crate::web::audit::record_audit;
use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::AuthUser;
use crate::web::state::AppState;

//=========================================================================================
// Buildings
//=========================================================================================

/// GET /api/buildings
pub async fn list_buildings_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<Vec<Building>>>, ApiFailure> {
    let buildings = state.store.list_buildings().await?;
    Ok(Json(ApiEnvelope::data(buildings)))
}

/// GET /api/buildings/{id}
pub async fn get_building_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<Building>>, ApiFailure> {
    let building = state.store.get_building(id).await?;
    Ok(Json(ApiEnvelope::data(building)))
}

/// POST /api/buildings
pub async fn create_building_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewBuilding>,
) -> Result<Json<ApiEnvelope<Building>>, ApiFailure> {
    let building = state.store.create_building(new).await?;
    record_audit(
        &state,
        &auth.username,
        "building.created",
        "building",
        Some(building.id),
        format!("Created building '{}'", building.name),
    )
    .await;
    Ok(Json(ApiEnvelope::data(building)))
}

/// PUT /api/buildings/{id}
pub async fn update_building_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<BuildingUpdate>,
) -> Result<Json<ApiEnvelope<Building>>, ApiFailure> {
    let building = state.store.update_building(id, update).await?;
    record_audit(
        &state,
        &auth.username,
        "building.updated",
        "building",
        Some(id),
        format!("Updated building '{}'", building.name),
    )
    .await;
    Ok(Json(ApiEnvelope::data(building)))
}

/// DELETE /api/buildings/{id}
pub async fn delete_building_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let building = state.store.get_building(id).await?;
    state.store.delete_building(id).await?;
    record_audit(
        &state,
        &auth.username,
        "building.deleted",
        "building",
        Some(id),
        format!("Deleted building '{}'", building.name),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Building deleted")))
}

//=========================================================================================
// Rooms
//=========================================================================================

/// GET /api/rooms
pub async fn list_rooms_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiEnvelope<Vec<Room>>>, ApiFailure> {
    let rooms = state.store.list_rooms().await?;
    Ok(Json(ApiEnvelope::data(rooms)))
}

/// GET /api/rooms/{id}
pub async fn get_room_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<Room>>, ApiFailure> {
    let room = state.store.get_room(id).await?;
    Ok(Json(ApiEnvelope::data(room)))
}

/// POST /api/rooms
pub async fn create_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(new): Json<NewRoom>,
) -> Result<Json<ApiEnvelope<Room>>, ApiFailure> {
    let room = state.store.create_room(new).await?;
    record_audit(
        &state,
        &auth.username,
        "room.created",
        "room",
        Some(room.id),
        format!("Created room {}", room.number),
    )
    .await;
    Ok(Json(ApiEnvelope::data(room)))
}

/// PUT /api/rooms/{id}
pub async fn update_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
    Json(update): Json<RoomUpdate>,
) -> Result<Json<ApiEnvelope<Room>>, ApiFailure> {
    let room = state.store.update_room(id, update).await?;
    record_audit(
        &state,
        &auth.username,
        "room.updated",
        "room",
        Some(id),
        format!("Updated room {}", room.number),
    )
    .await;
    Ok(Json(ApiEnvelope::data(room)))
}

/// DELETE /api/rooms/{id}
pub async fn delete_room_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiFailure> {
    let room = state.store.get_room(id).await?;
    state.store.delete_room(id).await?;
    record_audit(
        &state,
        &auth.username,
        "room.deleted",
        "room",
        Some(id),
        format!("Deleted room {}", room.number),
    )
    .await;
    Ok(Json(ApiEnvelope::message("Room deleted")))
}
