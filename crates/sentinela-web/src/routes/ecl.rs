use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use sentinela_auth::permissions::VIEW_ECL;
use sentinela_auth::{Session, require_permission};
use sentinela_core::types::ecl::*;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn calcular(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<EclRequest>,
) -> ApiResult<Json<EclResult>> {
    require_permission(&session, VIEW_ECL)?;
    Ok(Json(state.backends()?.ecl.calcular(&req).await?))
}

pub async fn calcular_direto(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<EclDirectRequest>,
) -> ApiResult<Json<EclResult>> {
    require_permission(&session, VIEW_ECL)?;
    Ok(Json(state.backends()?.ecl.calcular_direto(&req).await?))
}

pub async fn calcular_portfolio(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PortfolioRequest>,
) -> ApiResult<Json<PortfolioResult>> {
    require_permission(&session, VIEW_ECL)?;
    Ok(Json(state.backends()?.ecl.calcular_portfolio(&req).await?))
}

pub async fn grupos_homogeneos(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Vec<HomogeneousGroup>>> {
    require_permission(&session, VIEW_ECL)?;
    Ok(Json(state.backends()?.ecl.grupos_homogeneos().await?))
}
