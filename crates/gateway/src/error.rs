//! The JSON error envelope.
//!
//! Every failure is caught at the request boundary and converted to
//! `{ error, details? }` with the status mapping below; nothing propagates
//! as an unhandled fault. `details` carries the internal message in debug
//! builds only.

use axum::extract::rejection::JsonRejection;
use axum::extract::{FromRequest, Request};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use homie_core::error::{DriveError, Error, KnowledgeError, ProviderError};
use serde::Serialize;

const GENERIC_ERROR: &str =
    "Sorry, I encountered an error processing your request. Please try again.";
const CONFIG_ERROR: &str = "Service configuration error. Please contact support.";
const CAPACITY_ERROR: &str = "Service temporarily unavailable. Please try again later.";

/// An error ready to be serialized as the response envelope.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl ApiError {
    /// A request validation failure, surfaced verbatim.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details: None,
        }
    }

    /// Missing service configuration. The message is generic on purpose:
    /// the credential name never reaches the caller.
    pub fn configuration() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: CONFIG_ERROR.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn new(status: StatusCode, message: impl Into<String>, internal: Option<String>) -> Self {
        Self {
            status,
            message: message.into(),
            details: if cfg!(debug_assertions) { internal } else { None },
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => Self::validation(msg),

            Error::Knowledge(KnowledgeError::UnknownCategory(_))
            | Error::Knowledge(KnowledgeError::EmptyContent) => {
                Self::new(StatusCode::BAD_REQUEST, err.to_string(), None)
            }
            Error::Knowledge(e @ KnowledgeError::Storage(_)) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_ERROR,
                Some(e.to_string()),
            ),

            // Quota exhaustion and timeouts are the retryable conditions:
            // surfaced as 503 so the caller's own retry policy works.
            Error::Provider(ProviderError::CapacityExhausted { .. })
            | Error::Provider(ProviderError::Timeout(_)) => {
                Self::new(StatusCode::SERVICE_UNAVAILABLE, CAPACITY_ERROR, None)
            }
            Error::Provider(ProviderError::AuthenticationFailed(_))
            | Error::Provider(ProviderError::NotConfigured(_)) => {
                Self::new(StatusCode::INTERNAL_SERVER_ERROR, CONFIG_ERROR, None)
            }
            Error::Provider(e) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_ERROR,
                Some(e.to_string()),
            ),

            Error::Drive(DriveError::NotConfigured) => Self::configuration(),
            Error::Drive(e) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_ERROR,
                Some(e.to_string()),
            ),

            Error::Config { .. } => Self::configuration(),

            other => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                GENERIC_ERROR,
                Some(other.to_string()),
            ),
        }
    }
}

/// JSON body extractor that rejects into the error envelope.
///
/// Axum's built-in `Json` rejection replies in plain text; this wrapper
/// keeps malformed bodies and missing content types inside `{ error }`
/// like every other failure.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => Err(ApiError::validation(rejection.body_text())),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: self.message,
            details: self.details,
        };
        (self.status, Json(body)).into_response()
    }
}
