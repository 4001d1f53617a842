use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use sentinela_auth::audit::actions;
use sentinela_auth::permissions::MANAGE_USERS;
use sentinela_auth::{
    AuthError, CreateUserRequest, Session, UpdateUserRequest, User, hash_password,
    require_permission, require_writable,
};

use super::record_committed;
use crate::state::AppState;

pub async fn list_users(
    session: Session,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<User>>, AuthError> {
    require_permission(&session, MANAGE_USERS)?;
    Ok(Json(state.users.list_users().await?))
}

pub async fn create_user(
    session: Session,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), AuthError> {
    require_writable(&session, MANAGE_USERS)?;
    req.validate()?;

    let password_hash = hash_password(&req.password)?;
    let user = state.users.create_user(&req, &password_hash).await?;
    record_committed(
        &state,
        &session,
        actions::CREATE_USER,
        &user.matricula,
        &format!("role={}", user.role),
    )
    .await;
    tracing::info!(matricula = %user.matricula, role = %user.role, "user created");

    Ok((StatusCode::CREATED, Json(user)))
}

pub async fn update_user(
    session: Session,
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<User>, AuthError> {
    require_writable(&session, MANAGE_USERS)?;
    if req.role.is_none() && req.is_active.is_none() {
        return Err(AuthError::InvalidInput("nothing to update".into()));
    }

    let user = state.users.update_user(&id, &req).await?;
    let mut details = Vec::new();
    if let Some(role) = req.role {
        details.push(format!("role={role}"));
    }
    if let Some(active) = req.is_active {
        details.push(format!("active={active}"));
    }
    record_committed(
        &state,
        &session,
        actions::UPDATE_USER,
        &user.matricula,
        &details.join(" "),
    )
    .await;

    Ok(Json(user))
}
