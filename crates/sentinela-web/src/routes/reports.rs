use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use serde::Deserialize;

use sentinela_auth::audit::actions;
use sentinela_auth::permissions::{EXPORT_REPORT, VIEW_ANALYTICS, VIEW_ECL};
use sentinela_auth::{PermissionGate, Session};
use sentinela_core::report::{ReportMeta, render_model_health_report, render_portfolio_report};
use sentinela_core::types::ecl::PortfolioRequest;

use super::record;
use crate::error::ApiResult;
use crate::state::AppState;

const MARKDOWN: &str = "text/markdown; charset=utf-8";

#[derive(Debug, Deserialize)]
pub struct PortfolioReportRequest {
    #[serde(default)]
    pub title: Option<String>,
    /// Defaults to today.
    #[serde(default)]
    pub reference_date: Option<String>,
    #[serde(flatten)]
    pub portfolio: PortfolioRequest,
}

fn report_meta(session: &Session, title: String, reference_date: Option<String>) -> ReportMeta {
    let author = session
        .user()
        .map(|u| format!("{} ({})", u.name, u.matricula))
        .unwrap_or_default();
    ReportMeta {
        title,
        reference_date: reference_date
            .unwrap_or_else(|| chrono::Local::now().format("%Y-%m-%d").to_string()),
        author,
    }
}

pub async fn portfolio_report(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<PortfolioReportRequest>,
) -> ApiResult<impl IntoResponse> {
    PermissionGate::all_of([VIEW_ECL, EXPORT_REPORT]).check(&session)?;

    let result = state
        .backends()?
        .ecl
        .calcular_portfolio(&req.portfolio)
        .await?;
    let meta = report_meta(
        &session,
        req.title.unwrap_or_else(|| "Portfolio ECL report".to_string()),
        req.reference_date,
    );
    let body = render_portfolio_report(&meta, &result);
    record(
        &state,
        &session,
        actions::EXPORT_REPORT,
        "portfolio",
        &format!("operacoes={}", req.portfolio.operacoes.len()),
    )
    .await?;

    Ok(([(header::CONTENT_TYPE, MARKDOWN)], body))
}

pub async fn model_health_report(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<impl IntoResponse> {
    PermissionGate::all_of([VIEW_ANALYTICS, EXPORT_REPORT]).check(&session)?;

    let report = state.backends()?.analytics.full_report().await?;
    let meta = report_meta(&session, "Model health report".to_string(), None);
    let body = render_model_health_report(&meta, &report);
    record(&state, &session, actions::EXPORT_REPORT, "model-health", "").await?;

    Ok(([(header::CONTENT_TYPE, MARKDOWN)], body))
}
