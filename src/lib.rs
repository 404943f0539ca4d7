//! # medcalc-exception
//!
//! Error responses for the Medical Calculators API.
//!
//! Handlers report failures as one of three [`ApiException`] kinds. The
//! [`ErrorResponder`] turns each into a JSON [`ErrorMessage`] with a status
//! code fixed by the kind, and writes one error record per exception.
//!
//! | Exception        | Status             |
//! |------------------|--------------------|
//! | NotFound         | 404 Not Found      |
//! | AlreadyExists    | 403 Forbidden      |
//! | InvalidParameter | 406 Not Acceptable |
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use axum::{Router, extract::Path, routing::get};
//! use medcalc_exception::prelude::*;
//!
//! async fn get_calculator(Path(id): Path<u32>) -> Result<String> {
//!     Err(ApiException::not_found(format!("Calculator {} not found", id)))
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let app = Router::new()
//!         .route("/calculators/{id}", get(get_calculator))
//!         .layer(ExceptionLayer::new(ErrorResponder::new()));
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! The response body for `GET /calculators/42`:
//!
//! ```json
//! {
//!   "statusCode": 404,
//!   "timestamp": "2024-03-01T12:30:00.123Z",
//!   "message": "Calculator 42 not found",
//!   "details": "uri=/calculators/42"
//! }
//! ```

pub mod common;
pub mod error;
pub mod exception;

pub use common::{Clock, ErrorMessage, SystemClock};
pub use error::{ApiException, ExceptionKind, Result};
pub use exception::{
    ArgumentsHost, ErrorResponder, ErrorSink, ExceptionFilter, ExceptionLayer, RequestDescription,
    TracingSink,
};

// Re-export commonly used types from dependencies
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use medcalc_exception::prelude::*;
/// ```
pub mod prelude {
    pub use crate::common::{Clock, ErrorMessage, SystemClock};
    pub use crate::error::{ApiException, ExceptionKind, Result};
    pub use crate::exception::{
        ArgumentsHost, ErrorResponder, ErrorResponderBuilder, ErrorSink, ExceptionFilter,
        ExceptionLayer, RequestDescription, TracingSink,
    };
}
