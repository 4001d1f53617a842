use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Failures of the access-control layer. Each maps to one HTTP status.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No session where one is required.
    #[error("authentication required")]
    NotAuthenticated,

    /// Unknown matricula, wrong password or disabled account; deliberately
    /// indistinguishable.
    #[error("invalid matricula or password")]
    InvalidCredentials,

    /// Bearer token missing its scheme, badly signed, expired or naming a
    /// user who no longer has access.
    #[error("invalid or expired session token")]
    InvalidToken,

    #[error("account disabled: {0}")]
    AccountDisabled(String),

    /// A permission gate refused the session.
    #[error("{0}")]
    PermissionDenied(String),

    /// The role may look but not act.
    #[error("read-only: {0}")]
    ReadOnly(String),

    #[error("the last active administrator cannot be demoted or deactivated")]
    LastAdministrator,

    #[error("user not found")]
    UserNotFound,

    #[error("matricula already registered: {0}")]
    DuplicateMatricula(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn status(&self) -> StatusCode {
        match self {
            AuthError::NotAuthenticated
            | AuthError::InvalidCredentials
            | AuthError::InvalidToken => StatusCode::UNAUTHORIZED,
            AuthError::AccountDisabled(_)
            | AuthError::PermissionDenied(_)
            | AuthError::ReadOnly(_)
            | AuthError::LastAdministrator => StatusCode::FORBIDDEN,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::DuplicateMatricula(_) => StatusCode::CONFLICT,
            AuthError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            // storage details stay in the server log
            AuthError::Database(msg) => {
                tracing::error!(error = %msg, "database failure");
                "database error".to_string()
            }
            AuthError::InvalidInput(msg) => msg.clone(),
            other => other.to_string(),
        };

        let body = serde_json::json!({ "error": message });
        (status, axum::Json(body)).into_response()
    }
}

impl From<rusqlite::Error> for AuthError {
    fn from(e: rusqlite::Error) -> Self {
        AuthError::Database(e.to_string())
    }
}
