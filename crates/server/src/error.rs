use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::debug;

#[derive(Debug)]
pub enum Error {
    // Auth Errors
    LoginFail,
    AuthFailNoToken,
    AuthFailTokenWrongFormat,
    AuthFailInvalidToken,
    AuthFailCtxNotInRequestExt,
    RefreshFail,

    // Resource Errors
    TodoNotFound { id: i64 },
    CategoryNotFound { id: i64 },

    // Generic
    BadRequest(String),
    Internal(String),
}

pub type Result<T> = core::result::Result<T, Error>;

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        debug!("error response: {self:?}");

        let (status, detail) = match self {
            Error::LoginFail => (
                StatusCode::UNAUTHORIZED,
                "No active account found with the given credentials".to_string(),
            ),
            Error::AuthFailNoToken => (
                StatusCode::UNAUTHORIZED,
                "Authentication credentials were not provided.".to_string(),
            ),
            Error::AuthFailTokenWrongFormat => (
                StatusCode::UNAUTHORIZED,
                "Authorization header must contain two space-delimited values".to_string(),
            ),
            Error::AuthFailInvalidToken => (
                StatusCode::UNAUTHORIZED,
                "Given token not valid for any token type".to_string(),
            ),
            Error::AuthFailCtxNotInRequestExt => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Auth context missing".to_string(),
            ),
            Error::RefreshFail => (
                StatusCode::UNAUTHORIZED,
                "Token is invalid or expired".to_string(),
            ),
            Error::TodoNotFound { .. } | Error::CategoryNotFound { .. } => {
                (StatusCode::NOT_FOUND, "Not found.".to_string())
            }
            Error::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Error::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({ "detail": detail }));

        (status, body).into_response()
    }
}

// Allow conversion from other errors (e.g., anyhow, sqlx) easiest via string
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal(err.to_string())
    }
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        Error::Internal(err.to_string())
    }
}
