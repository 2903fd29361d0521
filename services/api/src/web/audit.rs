//! services/api/src/web/audit.rs
//!
//! Audit trail plumbing. Mutating handlers call `record_audit` after the
//! store write succeeds; a failed audit write is logged and swallowed so it
//! never turns a completed mutation into an error response. Staff reads the
//! trail back through the list handler.

use std::sync::Arc;

use axum::extract::{Extension, Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::warn;
use uuid::Uuid;

use cotbe_portal_core::domain::AuditLogEntry;

use crate::web::envelope::{ApiEnvelope, ApiFailure};
use crate::web::middleware::{require_role, AuthUser, STAFF_ROLES};
use crate::web::state::AppState;

const DEFAULT_AUDIT_LIMIT: usize = 50;

/// Appends one audit entry, logging instead of failing when the store write
/// does not go through.
pub async fn record_audit(
    state: &AppState,
    actor: &str,
    action: &str,
    entity: &str,
    entity_id: Option<Uuid>,
    detail: String,
) {
    if let Err(err) = state
        .store
        .append_audit(actor, action, entity, entity_id, detail)
        .await
    {
        warn!("Failed to record audit entry '{}' by {}: {}", action, actor, err);
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct AuditLogQuery {
    pub limit: Option<usize>,
}

/// GET /api/audit-log - Newest entries first, staff only
pub async fn list_audit_log_handler(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Query(query): Query<AuditLogQuery>,
) -> Result<Json<ApiEnvelope<Vec<AuditLogEntry>>>, ApiFailure> {
    require_role(&auth, STAFF_ROLES, "read the audit log")?;
    let limit = query.limit.unwrap_or(DEFAULT_AUDIT_LIMIT);
    let entries = state.store.list_audit(limit).await?;
    Ok(Json(ApiEnvelope::data(entries)))
}
