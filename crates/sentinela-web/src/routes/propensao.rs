use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use sentinela_auth::permissions::{SIMULATE_LIMITS, VIEW_PROPENSAO};
use sentinela_auth::{Session, require_permission, require_writable};
use sentinela_core::types::propensao::*;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn score(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ScoreRequest>,
) -> ApiResult<Json<PropensityScore>> {
    require_permission(&session, VIEW_PROPENSAO)?;
    Ok(Json(state.backends()?.propensao.score(&req).await?))
}

pub async fn recomendar(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecommendRequest>,
) -> ApiResult<Json<Recommendation>> {
    require_permission(&session, VIEW_PROPENSAO)?;
    Ok(Json(state.backends()?.propensao.recomendar(&req).await?))
}

pub async fn simular(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<SimulationRequest>,
) -> ApiResult<Json<SimulationResult>> {
    require_writable(&session, SIMULATE_LIMITS)?;
    Ok(Json(state.backends()?.propensao.simular(&req).await?))
}

pub async fn produtos(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<Product>>> {
    require_permission(&session, VIEW_PROPENSAO)?;
    Ok(Json(state.backends()?.propensao.produtos().await?))
}
