use crate::error::ApiException;
use axum::{
    body::Body,
    extract::ConnectInfo,
    http::Request,
    response::Response,
};
use std::net::SocketAddr;

pub mod http;
pub mod layer;

pub use http::{ErrorResponder, ErrorResponderBuilder, ErrorSink, TracingSink};
pub use layer::{ExceptionLayer, ExceptionMiddleware};

/// Read-only view of the in-flight request used to describe it in error bodies
pub trait RequestDescription {
    /// Describe the request, optionally including who sent it
    fn describe(&self, include_client_identity: bool) -> String;
}

/// Context for exception handling
///
/// Captured from the request before it reaches the handler, since the
/// request itself is consumed by the time an exception comes back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentsHost {
    path: String,
    client: Option<SocketAddr>,
}

impl ArgumentsHost {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            client: None,
        }
    }

    pub fn with_client(mut self, client: SocketAddr) -> Self {
        self.client = Some(client);
        self
    }

    pub fn from_request(request: &Request<Body>) -> Self {
        Self {
            path: request.uri().path().to_string(),
            client: request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| *addr),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

impl RequestDescription for ArgumentsHost {
    fn describe(&self, include_client_identity: bool) -> String {
        let mut description = format!("uri={}", self.path);
        if include_client_identity {
            if let Some(client) = self.client {
                description.push_str(&format!(";client={}", client.ip()));
            }
        }
        description
    }
}

/// Renders an [`ApiException`] raised by a handler
///
/// `request` is the context captured before the handler ran; implementations
/// decide how much of it ends up in the body.
pub trait ExceptionFilter: Send + Sync + 'static {
    /// Catch an exception and return a response
    fn catch(&self, exception: ApiException, request: &dyn RequestDescription) -> Response;
}
