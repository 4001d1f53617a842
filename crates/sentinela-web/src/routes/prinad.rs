use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use sentinela_auth::permissions::RUN_CLASSIFICATION;
use sentinela_auth::{Session, require_writable};
use sentinela_core::types::prinad::*;

use crate::error::ApiResult;
use crate::state::AppState;

pub async fn simple_classify(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> ApiResult<Json<Classification>> {
    require_writable(&session, RUN_CLASSIFICATION)?;
    Ok(Json(state.backends()?.prinad.simple_classify(&req).await?))
}

pub async fn explained_classify(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> ApiResult<Json<ExplainedClassification>> {
    require_writable(&session, RUN_CLASSIFICATION)?;
    Ok(Json(state.backends()?.prinad.explained_classify(&req).await?))
}

pub async fn multiple_classify(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<BatchClassifyRequest>,
) -> ApiResult<Json<BatchClassifyResponse>> {
    require_writable(&session, RUN_CLASSIFICATION)?;
    let resp = state.backends()?.prinad.multiple_classify(&req).await?;
    tracing::info!(
        user = %session.actor(),
        submitted = req.clientes.len(),
        classified = resp.resultados.len(),
        "batch classification"
    );
    Ok(Json(resp))
}
