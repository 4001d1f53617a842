use std::collections::BTreeMap;
use std::sync::Arc;

use axum::Json;
use axum::extract::State;

use sentinela_auth::audit::actions;
use sentinela_auth::permissions::{MANAGE_SETTINGS, VIEW_SETTINGS};
use sentinela_auth::{AuthError, Session, require_permission, require_writable};
use sentinela_core::Settings;

use super::record_committed;
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn get_settings(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Settings>> {
    require_permission(&session, VIEW_SETTINGS)?;
    Ok(Json(state.settings()?.redacted()))
}

/// Body is a map of dotted keys to new values. `server.*` keys are bound at
/// startup and can only be changed from the CLI.
pub async fn update_settings(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(values): Json<BTreeMap<String, String>>,
) -> ApiResult<Json<Settings>> {
    require_writable(&session, MANAGE_SETTINGS)?;
    if values.is_empty() {
        return Err(AuthError::InvalidInput("no settings given".into()).into());
    }

    let settings = state
        .update_settings(|settings| {
            for (key, value) in &values {
                if key.starts_with("server.") {
                    return Err(AuthError::InvalidInput(format!(
                        "{key} cannot be changed while the server is running"
                    ))
                    .into());
                }
                settings.set(key, value)?;
            }
            Ok(())
        })
        .await?;

    let keys: Vec<&str> = values.keys().map(String::as_str).collect();
    record_committed(
        &state,
        &session,
        actions::UPDATE_SETTINGS,
        "settings",
        &keys.join(","),
    )
    .await;
    Ok(Json(settings.redacted()))
}

pub async fn reset_settings(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<Settings>> {
    require_writable(&session, MANAGE_SETTINGS)?;
    let settings = state
        .update_settings(|settings| {
            settings.reset();
            Ok(())
        })
        .await?;
    record_committed(&state, &session, actions::UPDATE_SETTINGS, "settings", "reset").await;
    Ok(Json(settings.redacted()))
}
