use crate::error::ExceptionKind;
use axum::{
    Json,
    http::StatusCode as HttpStatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Error body returned to the client
///
/// Built once by the error responder and never mutated afterwards.
///
/// # Example
/// ```
/// use medcalc_exception::common::ErrorMessage;
/// use medcalc_exception::error::ExceptionKind;
///
/// let body = ErrorMessage::new(
///     ExceptionKind::NotFound,
///     chrono::Utc::now(),
///     "Calculator 42 not found",
///     "uri=/calculators/42",
/// );
/// assert_eq!(body.status_code(), 404);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    status_code: u16,
    timestamp: DateTime<Utc>,
    message: String,
    details: String,

    #[serde(skip)]
    http_status: HttpStatusCode,
}

impl ErrorMessage {
    pub fn new(
        kind: ExceptionKind,
        timestamp: DateTime<Utc>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        let http_status = kind.status();
        Self {
            status_code: http_status.as_u16(),
            timestamp,
            message: message.into(),
            details: details.into(),
            http_status,
        }
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn http_status(&self) -> HttpStatusCode {
        self.http_status
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn details(&self) -> &str {
        &self.details
    }
}

impl IntoResponse for ErrorMessage {
    fn into_response(self) -> Response {
        (self.http_status, Json(self)).into_response()
    }
}
