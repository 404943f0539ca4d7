use crate::error::RaisedException;
use crate::exception::{ArgumentsHost, ErrorResponder, ExceptionFilter};
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service};

/// Tower Layer that renders exceptions raised by handlers
///
/// Handlers return `Err(ApiException)`; the layer swaps the placeholder
/// response for the filter's error body, described with the request the
/// handler was called for. Any other response passes through untouched.
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use medcalc_exception::prelude::*;
///
/// async fn calculator() -> Result<&'static str> {
///     Err(ApiException::not_found("Calculator 42 not found"))
/// }
///
/// let app: Router = Router::new()
///     .route("/calculators/42", get(calculator))
///     .layer(ExceptionLayer::new(ErrorResponder::new()));
/// ```
#[derive(Clone)]
pub struct ExceptionLayer {
    filter: Arc<dyn ExceptionFilter>,
}

impl ExceptionLayer {
    pub fn new<F: ExceptionFilter>(filter: F) -> Self {
        Self {
            filter: Arc::new(filter),
        }
    }
}

impl Default for ExceptionLayer {
    fn default() -> Self {
        Self::new(ErrorResponder::new())
    }
}

impl<S> Layer<S> for ExceptionLayer {
    type Service = ExceptionMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ExceptionMiddleware {
            inner,
            filter: self.filter.clone(),
        }
    }
}

#[derive(Clone)]
pub struct ExceptionMiddleware<S> {
    inner: S,
    filter: Arc<dyn ExceptionFilter>,
}

impl<S> Service<Request<Body>> for ExceptionMiddleware<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let host = ArgumentsHost::from_request(&request);
        let filter = self.filter.clone();

        // The clone has not been polled ready; keep it and drive the ready one.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(async move {
            let mut response = inner.call(request).await?;
            match response.extensions_mut().remove::<RaisedException>() {
                Some(RaisedException(exception)) => {
                    tracing::debug!(kind = %exception.kind(), uri = host.path(), "Exception intercepted");
                    Ok(filter.catch(exception, &host))
                }
                None => Ok(response),
            }
        })
    }
}
