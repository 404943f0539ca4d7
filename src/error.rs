use crate::common::{Clock, ErrorMessage, SystemClock};
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use strum_macros::{Display, EnumIter};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiException>;

/// The exceptions request handlers raise for the error responder to render.
///
/// `Display` yields the bare message, so whatever text the handler supplied
/// reaches the client and the log unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiException {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    AlreadyExists(String),

    #[error("{0}")]
    InvalidParameter(String),
}

impl ApiException {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists(message.into())
    }

    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    pub fn kind(&self) -> ExceptionKind {
        match self {
            ApiException::NotFound(_) => ExceptionKind::NotFound,
            ApiException::AlreadyExists(_) => ExceptionKind::AlreadyExists,
            ApiException::InvalidParameter(_) => ExceptionKind::InvalidParameter,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiException::NotFound(message)
            | ApiException::AlreadyExists(message)
            | ApiException::InvalidParameter(message) => message,
        }
    }
}

/// Exception categories the responder knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum ExceptionKind {
    NotFound,
    AlreadyExists,
    InvalidParameter,
}

impl ExceptionKind {
    /// HTTP status for this kind. Depends on the kind alone, never on the message.
    pub fn status(self) -> StatusCode {
        match self {
            ExceptionKind::NotFound => StatusCode::NOT_FOUND,
            ExceptionKind::AlreadyExists => StatusCode::FORBIDDEN,
            ExceptionKind::InvalidParameter => StatusCode::NOT_ACCEPTABLE,
        }
    }
}

/// Response extension carrying an exception out of a handler.
///
/// [`crate::exception::ExceptionLayer`] looks for it and renders the full
/// error body once the request context is known.
#[derive(Debug, Clone)]
pub struct RaisedException(pub ApiException);

impl IntoResponse for ApiException {
    fn into_response(self) -> Response {
        // Body without request details, used when no exception layer is installed.
        let body = ErrorMessage::new(self.kind(), SystemClock::new().now(), self.message(), "");
        let mut response = body.into_response();
        response.extensions_mut().insert(RaisedException(self));
        response
    }
}

impl From<PathRejection> for ApiException {
    fn from(rejection: PathRejection) -> Self {
        ApiException::InvalidParameter(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiException {
    fn from(rejection: QueryRejection) -> Self {
        ApiException::InvalidParameter(rejection.body_text())
    }
}

impl From<JsonRejection> for ApiException {
    fn from(rejection: JsonRejection) -> Self {
        ApiException::InvalidParameter(rejection.body_text())
    }
}
