use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use sentinela_auth::AuthError;
use sentinela_client::ClientError;
use sentinela_core::CoreError;

/// Error type for every handler: `{ "error": msg }` with a mapped status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Backend(#[from] ClientError),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Auth(e) => return e.into_response(),
            ApiError::Backend(e) => {
                let status = match e {
                    ClientError::Validation(_) => StatusCode::BAD_REQUEST,
                    _ => StatusCode::BAD_GATEWAY,
                };
                (status, e.to_string())
            }
            ApiError::Core(e) => {
                let status = match e {
                    CoreError::Validation(_)
                    | CoreError::UnknownSetting(_)
                    | CoreError::InvalidSetting { .. } => StatusCode::BAD_REQUEST,
                    _ => StatusCode::INTERNAL_SERVER_ERROR,
                };
                (status, e.to_string())
            }
        };
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = %message, "request failed");
        }
        let body = serde_json::json!({ "error": message });
        (status, Json(body)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
