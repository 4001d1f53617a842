use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;
use crate::roles::Role;
use crate::types::User;

/// Sessions last one working day.
pub const SESSION_TTL_SECS: i64 = 8 * 3600;

/// Only identity and role travel in the token; permissions are resolved from
/// the role table on every request.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: String,
    pub matricula: String,
    pub role: Role,
    pub exp: usize,
    pub iat: usize,
}

pub fn create_jwt(user: &User, secret: &str) -> Result<String, AuthError> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims {
        sub: user.id.clone(),
        matricula: user.matricula.clone(),
        role: user.role,
        exp: (now + SESSION_TTL_SECS) as usize,
        iat: now as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode error: {e}")))
}

pub fn verify_jwt(token: &str, secret: &str) -> Result<SessionClaims, AuthError> {
    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AuthError::InvalidToken)?;
    Ok(data.claims)
}
