use std::sync::Arc;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use sentinela_auth::audit::actions;
use sentinela_auth::jwt::SESSION_TTL_SECS;
use sentinela_auth::{AuthError, LoginRequest, Session, User, authenticate, create_jwt};

use super::record;
use crate::state::AppState;

#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_in: i64,
    pub user: User,
    pub permissions: Vec<String>,
}

#[derive(Serialize)]
pub struct MeResponse {
    pub user: User,
    pub permissions: Vec<String>,
    pub read_only: bool,
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AuthError> {
    let user = match authenticate(state.users.as_ref(), &req.matricula, &req.password).await {
        Ok(user) => user,
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!(matricula = %req.matricula.trim(), "login failed");
            state
                .audit
                .append(req.matricula.trim(), actions::LOGIN_FAILED, "session", "")
                .await?;
            return Err(AuthError::InvalidCredentials);
        }
        Err(e) => return Err(e),
    };

    let token = create_jwt(&user, &state.jwt_secret)?;
    let session = Session::authenticated(user.clone(), &state.roles);
    record(&state, &session, actions::LOGIN, "session", "").await?;
    tracing::info!(matricula = %user.matricula, role = %user.role, "login");

    Ok(Json(LoginResponse {
        token,
        expires_in: SESSION_TTL_SECS,
        permissions: session.permissions(),
        user,
    }))
}

/// Tokens are stateless; logout only records the event.
pub async fn logout(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> Result<Json<serde_json::Value>, AuthError> {
    if !session.is_authenticated() {
        return Err(AuthError::NotAuthenticated);
    }
    record(&state, &session, actions::LOGOUT, "session", "").await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

pub async fn me(session: Session) -> Result<Json<MeResponse>, AuthError> {
    let user = session.user().cloned().ok_or(AuthError::NotAuthenticated)?;
    Ok(Json(MeResponse {
        user,
        permissions: session.permissions(),
        read_only: session.is_read_only(),
    }))
}
