use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AuthError;
use crate::gate::{PermissionGate, ReadOnlyGate};
use crate::jwt::verify_jwt;
use crate::roles::RoleTable;
use crate::session::Session;
use crate::store::UserStore;

/// Installed as a request extension by the web layer.
#[derive(Clone)]
pub struct AuthState {
    pub jwt_secret: String,
    pub roles: Arc<RoleTable>,
    pub users: Arc<dyn UserStore>,
}

/// A missing `Authorization` header yields an anonymous session; a present
/// but invalid one is rejected outright.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_state = parts
            .extensions
            .get::<AuthState>()
            .ok_or(AuthError::Internal("auth not configured".into()))?
            .clone();

        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok());

        let bearer = match auth_header {
            None => return Ok(Session::anonymous()),
            Some(h) => h.strip_prefix("Bearer ").ok_or(AuthError::InvalidToken)?,
        };

        let claims = verify_jwt(bearer, &auth_state.jwt_secret)?;

        // Re-read the account so deactivation and role changes apply at once.
        let user = match auth_state.users.get_user_by_id(&claims.sub).await {
            Ok(u) => u,
            Err(AuthError::UserNotFound) => return Err(AuthError::InvalidToken),
            Err(e) => return Err(e),
        };
        if !user.is_active {
            return Err(AuthError::InvalidToken);
        }
        Ok(Session::authenticated(user, &auth_state.roles))
    }
}

pub fn require_permission(session: &Session, permission: &str) -> Result<(), AuthError> {
    PermissionGate::new(permission).check(session)
}

/// Permission check for mutating operations; read-only roles are refused
/// even when the permission is granted.
pub fn require_writable(session: &Session, permission: &str) -> Result<(), AuthError> {
    require_permission(session, permission)?;
    ReadOnlyGate.check(session)
}
