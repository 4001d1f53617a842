use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use sentinela_auth::permissions::VIEW_ANALYTICS;
use sentinela_auth::{Session, require_permission};
use sentinela_client::AnalyticsClient;
use sentinela_core::types::analytics::*;

use crate::error::ApiResult;
use crate::state::AppState;

fn client(session: &Session, state: &AppState) -> ApiResult<AnalyticsClient> {
    require_permission(session, VIEW_ANALYTICS)?;
    Ok(state.backends()?.analytics)
}

pub async fn model_performance(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ModelPerformance>> {
    Ok(Json(client(&session, &state)?.model_performance().await?))
}

pub async fn drift_report(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<DriftReport>> {
    Ok(Json(client(&session, &state)?.drift_report().await?))
}

pub async fn accuracy_trend(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<AccuracyTrend>> {
    Ok(Json(client(&session, &state)?.accuracy_trend().await?))
}

pub async fn backtest(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<BacktestReport>> {
    Ok(Json(client(&session, &state)?.backtest().await?))
}

pub async fn full_report(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<FullReport>> {
    Ok(Json(client(&session, &state)?.full_report().await?))
}
