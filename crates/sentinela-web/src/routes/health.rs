use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use sentinela_auth::permissions::VIEW_DASHBOARD;
use sentinela_auth::{Session, require_permission};
use sentinela_core::types::prinad::HealthStatus;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_health(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<HealthStatus>> {
    require_permission(&session, VIEW_DASHBOARD)?;
    let status = state.backends()?.prinad.health().await?;
    if !status.is_healthy() {
        tracing::warn!(status = %status.status, "PRINAD reports unhealthy");
    }
    Ok(Json(status))
}
