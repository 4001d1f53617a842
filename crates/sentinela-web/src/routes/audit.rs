use std::sync::Arc;

use axum::Json;
use axum::extract::{Query, State};
use axum::http::header;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use sentinela_auth::audit::{MAX_PAGE, actions, to_csv};
use sentinela_auth::permissions::{EXPORT_CSV, VIEW_AUDIT};
use sentinela_auth::{AuditEntry, AuthError, PermissionGate, Session, require_permission};

use super::record;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

#[derive(Serialize)]
pub struct AuditPage {
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub entries: Vec<AuditEntry>,
}

pub async fn list_audit(
    session: Session,
    State(state): State<Arc<AppState>>,
    Query(query): Query<AuditQuery>,
) -> Result<Json<AuditPage>, AuthError> {
    require_permission(&session, VIEW_AUDIT)?;

    let limit = query.limit.unwrap_or(50).min(MAX_PAGE);
    let offset = query.offset.unwrap_or(0);

    let total = state.audit.count().await?;
    let entries = state.audit.list(limit, offset).await?;
    record(&state, &session, actions::VIEW_AUDIT, "audit", "").await?;

    Ok(Json(AuditPage {
        total,
        limit,
        offset,
        entries,
    }))
}

pub async fn export_audit(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AuthError> {
    PermissionGate::all_of([VIEW_AUDIT, EXPORT_CSV]).check(&session)?;

    let mut entries = Vec::new();
    loop {
        let page = state.audit.list(MAX_PAGE, entries.len() as u32).await?;
        let done = page.len() < MAX_PAGE as usize;
        entries.extend(page);
        if done {
            break;
        }
    }
    record(
        &state,
        &session,
        actions::EXPORT_CSV,
        "audit",
        &format!("rows={}", entries.len()),
    )
    .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"audit_log.csv\"",
            ),
        ],
        to_csv(&entries),
    ))
}
