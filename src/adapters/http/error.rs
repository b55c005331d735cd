use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::user::AuthError;
use crate::ports::{MailError, StoreError};

/// Error type shared by every handler. Conversion into a response decides
/// the status code and the JSON body the client sees.
#[derive(Debug)]
pub enum ApiError {
    Unauthorized,
    BadRequest(String),
    NotFound(String),
    /// The caller has no credits left for a paid send.
    PaymentRequired,
    /// The mail provider rejected the request; its verdict is forwarded
    /// verbatim so the UI can show the provider's own message.
    ProviderRejected {
        status: u16,
        message: String,
        code: String,
    },
    Internal,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

#[derive(Serialize)]
struct ProviderErrorBody {
    message: String,
    status_code: u16,
    code: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized => respond(StatusCode::UNAUTHORIZED, "unauthorized"),
            ApiError::BadRequest(message) => respond(StatusCode::BAD_REQUEST, &message),
            ApiError::NotFound(message) => respond(StatusCode::NOT_FOUND, &message),
            ApiError::PaymentRequired => {
                respond(StatusCode::PAYMENT_REQUIRED, "no postcard credits remaining")
            }
            ApiError::ProviderRejected {
                status,
                message,
                code,
            } => {
                let status_code = StatusCode::from_u16(status)
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (
                    status_code,
                    Json(ProviderErrorBody {
                        message,
                        status_code: status,
                        code,
                    }),
                )
                    .into_response()
            }
            ApiError::Internal => {
                respond(StatusCode::INTERNAL_SERVER_ERROR, "internal server error")
            }
        }
    }
}

fn respond(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}

impl From<AuthError> for ApiError {
    fn from(_: AuthError) -> Self {
        ApiError::Unauthorized
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => {
                ApiError::NotFound(format!("no profile for member {id}"))
            }
            StoreError::Database(err) => {
                tracing::error!(error = %err, "database query failed");
                ApiError::Internal
            }
        }
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::Rejected {
                status,
                message,
                code,
            } => ApiError::ProviderRejected {
                status,
                message,
                code,
            },
            MailError::Unavailable { status } => {
                tracing::error!(status, "mail provider unavailable");
                ApiError::Internal
            }
            MailError::Transport(err) => {
                tracing::error!(error = %err, "mail provider request failed");
                ApiError::Internal
            }
            MailError::MalformedResponse(detail) => {
                tracing::error!(%detail, "mail provider returned an unreadable body");
                ApiError::Internal
            }
        }
    }
}
