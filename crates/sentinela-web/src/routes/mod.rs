pub mod analytics;
pub mod audit;
pub mod auth;
pub mod ecl;
pub mod health;
pub mod navigation;
pub mod prinad;
pub mod propensao;
pub mod reports;
pub mod settings;
pub mod users;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, patch, post};
use axum::{Extension, Router};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;

use sentinela_auth::{AuthError, Session};

use crate::state::AppState;

/// Large enough for a full portfolio upload.
const MAX_BODY_BYTES: usize = 32 * 1024 * 1024;

pub fn build_router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        // Session
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        .route("/navigation", get(navigation::get_navigation))
        .route("/health", get(health::get_health))
        // Administration
        .route(
            "/settings",
            get(settings::get_settings).put(settings::update_settings),
        )
        .route("/settings/reset", post(settings::reset_settings))
        .route("/audit", get(audit::list_audit))
        .route("/audit/export", get(audit::export_audit))
        .route("/users", get(users::list_users).post(users::create_user))
        .route("/users/{id}", patch(users::update_user))
        // PRINAD
        .route("/prinad/simple_classify", post(prinad::simple_classify))
        .route("/prinad/explained_classify", post(prinad::explained_classify))
        .route("/prinad/multiple_classify", post(prinad::multiple_classify))
        // ECL
        .route("/ecl/calcular", post(ecl::calcular))
        .route("/ecl/calcular_direto", post(ecl::calcular_direto))
        .route("/ecl/calcular_portfolio", post(ecl::calcular_portfolio))
        .route("/ecl/grupos_homogeneos", get(ecl::grupos_homogeneos))
        // Propensão
        .route("/propensao/score", post(propensao::score))
        .route("/propensao/recomendar", post(propensao::recomendar))
        .route("/propensao/simular", post(propensao::simular))
        .route("/propensao/produtos", get(propensao::produtos))
        // Analytics
        .route(
            "/analytics/model-performance",
            get(analytics::model_performance),
        )
        .route("/analytics/drift-report", get(analytics::drift_report))
        .route("/analytics/accuracy-trend", get(analytics::accuracy_trend))
        .route("/analytics/backtest", get(analytics::backtest))
        .route("/analytics/full-report", get(analytics::full_report))
        // Reports
        .route("/reports/portfolio", post(reports::portfolio_report))
        .route("/reports/model-health", get(reports::model_health_report));

    Router::new()
        .nest("/api", api)
        .layer(Extension(state.auth_state()))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Append to the audit log on behalf of `session`.
pub(crate) async fn record(
    state: &AppState,
    session: &Session,
    action: &str,
    resource: &str,
    details: &str,
) -> Result<(), AuthError> {
    state
        .audit
        .append(session.actor(), action, resource, details)
        .await?;
    Ok(())
}

/// Audit a change that is already committed. The change cannot be rolled
/// back, so a failed append is logged instead of turning the response into
/// an error that would misreport what happened.
pub(crate) async fn record_committed(
    state: &AppState,
    session: &Session,
    action: &str,
    resource: &str,
    details: &str,
) {
    if let Err(e) = record(state, session, action, resource, details).await {
        tracing::error!(
            error = %e,
            actor = %session.actor(),
            action,
            resource,
            details,
            "audit append failed after a committed change"
        );
    }
}
