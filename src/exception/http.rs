use crate::common::{Clock, ErrorMessage, SystemClock};
use crate::error::{ApiException, ExceptionKind};
use crate::exception::{ExceptionFilter, RequestDescription};
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

/// Destination for the error record written on every handled exception
pub trait ErrorSink: Send + Sync + 'static {
    fn error(&self, message: &str);
}

/// Writes error records through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ErrorSink for TracingSink {
    fn error(&self, message: &str) {
        tracing::error!("{}", message);
    }
}

/// Renders API exceptions as JSON error bodies
///
/// Each exception kind has its own entry point; [`ErrorResponder::respond`]
/// picks the right one. The status code comes from the kind alone, the
/// message is passed through untouched, and the request is always described
/// without client identity.
///
/// # Example
/// ```
/// use medcalc_exception::error::ApiException;
/// use medcalc_exception::exception::{ArgumentsHost, ErrorResponder};
///
/// let responder = ErrorResponder::new();
/// let host = ArgumentsHost::new("/calculators/42");
/// let body = responder.respond(&ApiException::not_found("Calculator 42 not found"), &host);
///
/// assert_eq!(body.status_code(), 404);
/// assert_eq!(body.details(), "uri=/calculators/42");
/// ```
#[derive(Clone)]
pub struct ErrorResponder {
    sink: Arc<dyn ErrorSink>,
    clock: Arc<dyn Clock>,
}

impl Default for ErrorResponder {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorResponder {
    /// Responder logging through `tracing` and stamping with the system clock
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> ErrorResponderBuilder {
        ErrorResponderBuilder::default()
    }

    pub fn respond(
        &self,
        exception: &ApiException,
        request: &dyn RequestDescription,
    ) -> ErrorMessage {
        match exception {
            ApiException::NotFound(message) => self.not_found(message, request),
            ApiException::AlreadyExists(message) => self.already_exists(message, request),
            ApiException::InvalidParameter(message) => self.invalid_parameter(message, request),
        }
    }

    /// 404 Not Found
    pub fn not_found(&self, message: &str, request: &dyn RequestDescription) -> ErrorMessage {
        self.render(ExceptionKind::NotFound, message, request)
    }

    /// 403 Forbidden
    pub fn already_exists(&self, message: &str, request: &dyn RequestDescription) -> ErrorMessage {
        self.render(ExceptionKind::AlreadyExists, message, request)
    }

    /// 406 Not Acceptable
    pub fn invalid_parameter(
        &self,
        message: &str,
        request: &dyn RequestDescription,
    ) -> ErrorMessage {
        self.render(ExceptionKind::InvalidParameter, message, request)
    }

    fn render(
        &self,
        kind: ExceptionKind,
        message: &str,
        request: &dyn RequestDescription,
    ) -> ErrorMessage {
        let body = ErrorMessage::new(kind, self.clock.now(), message, request.describe(false));
        self.sink.error(body.message());
        body
    }
}

impl ExceptionFilter for ErrorResponder {
    fn catch(&self, exception: ApiException, request: &dyn RequestDescription) -> Response {
        self.respond(&exception, request).into_response()
    }
}

/// Builder for [`ErrorResponder`]
#[derive(Default)]
pub struct ErrorResponderBuilder {
    sink: Option<Arc<dyn ErrorSink>>,
    clock: Option<Arc<dyn Clock>>,
}

impl ErrorResponderBuilder {
    pub fn sink<S: ErrorSink>(mut self, sink: S) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn clock<C: Clock>(mut self, clock: C) -> Self {
        self.clock = Some(Arc::new(clock));
        self
    }

    pub fn build(self) -> ErrorResponder {
        ErrorResponder {
            sink: self.sink.unwrap_or_else(|| Arc::new(TracingSink)),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock::new())),
        }
    }
}
