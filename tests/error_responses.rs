use axum::body::Body;
use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{Json, Path, Query};
use axum::http::{Request, StatusCode};
use axum::routing::{get, post};
use axum::Router;
use http_body_util::BodyExt;
use medcalc_exception::prelude::*;
use serde::Deserialize;
use serde_json::Value;
use std::io;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;
use tracing_subscriber::fmt::MakeWriter;

#[derive(Deserialize)]
struct Weight {
    weight: f64,
}

#[derive(Deserialize)]
struct CreateCalculator {
    name: String,
}

async fn get_calculator(path: std::result::Result<Path<u32>, PathRejection>) -> Result<&'static str> {
    let Path(id) = path?;
    if id == 1 {
        Ok("BMI")
    } else {
        Err(ApiException::not_found(format!("Calculator {} not found", id)))
    }
}

async fn register_user() -> Result<StatusCode> {
    Err(ApiException::already_exists("User already registered"))
}

async fn check_weight(query: std::result::Result<Query<Weight>, QueryRejection>) -> Result<String> {
    let Query(params) = query?;
    if params.weight <= 0.0 {
        return Err(ApiException::invalid_parameter("weight must be positive"));
    }
    Ok(format!("{}", params.weight))
}

async fn create_calculator(
    payload: std::result::Result<Json<CreateCalculator>, JsonRejection>,
) -> Result<String> {
    let Json(req) = payload?;
    Err(ApiException::already_exists(format!("Calculator {} already exists", req.name)))
}

async fn empty_not_found() -> Result<()> {
    Err(ApiException::not_found(""))
}

fn app(responder: ErrorResponder) -> Router {
    Router::new()
        .route("/calculators", post(create_calculator))
        .route("/calculators/{id}", get(get_calculator))
        .route("/users", post(register_user))
        .route("/weight", get(check_weight))
        .route("/empty", get(empty_not_found))
        .layer(ExceptionLayer::new(responder))
}

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<String>>>);

impl Captured {
    fn messages(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

impl ErrorSink for Captured {
    fn error(&self, message: &str) {
        self.0.lock().unwrap().push(message.to_string());
    }
}

async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).unwrap()
    };
    (status, value)
}

fn captured_app() -> (Router, Captured) {
    let captured = Captured::default();
    let responder = ErrorResponder::builder().sink(captured.clone()).build();
    (app(responder), captured)
}

#[tokio::test]
async fn test_not_found_renders_404() {
    let (app, captured) = captured_app();
    let (status, body) = send(app, "GET", "/calculators/42").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["statusCode"], 404);
    assert_eq!(body["message"], "Calculator 42 not found");
    assert_eq!(body["details"], "uri=/calculators/42");
    assert!(body["timestamp"].is_string());
    assert_eq!(captured.messages(), vec!["Calculator 42 not found"]);
}

#[tokio::test]
async fn test_already_exists_renders_403() {
    let (app, captured) = captured_app();
    let (status, body) = send(app, "POST", "/users").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["statusCode"], 403);
    assert_eq!(body["message"], "User already registered");
    assert_eq!(captured.messages(), vec!["User already registered"]);
}

#[tokio::test]
async fn test_invalid_parameter_renders_406() {
    let (app, captured) = captured_app();
    let (status, body) = send(app, "GET", "/weight?weight=-5").await;

    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body["statusCode"], 406);
    assert_eq!(body["message"], "weight must be positive");
    assert_eq!(body["details"], "uri=/weight");
    assert_eq!(captured.messages(), vec!["weight must be positive"]);
}

#[tokio::test]
async fn test_query_rejection_renders_406() {
    let (app, captured) = captured_app();
    let (status, body) = send(app, "GET", "/weight?weight=heavy").await;

    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body["statusCode"], 406);
    assert_eq!(captured.messages().len(), 1);
    assert_eq!(body["message"], captured.messages()[0].as_str());
}

#[tokio::test]
async fn test_path_rejection_renders_406() {
    let (app, captured) = captured_app();
    let (status, body) = send(app, "GET", "/calculators/abc").await;

    assert_eq!(status, StatusCode::NOT_ACCEPTABLE);
    assert_eq!(body["statusCode"], 406);
    assert_eq!(body["details"], "uri=/calculators/abc");
    assert_eq!(captured.messages().len(), 1);
    assert_eq!(body["message"], captured.messages()[0].as_str());
}

#[tokio::test]
async fn test_json_rejection_renders_406() {
    let (app, captured) = captured_app();
    let request = Request::builder()
        .method("POST")
        .uri("/calculators")
        .header("content-type", "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["statusCode"], 406);
    assert_eq!(body["details"], "uri=/calculators");
    assert_eq!(captured.messages().len(), 1);
    assert_eq!(body["message"], captured.messages()[0].as_str());
}

#[tokio::test]
async fn test_empty_message_preserved() {
    let (app, captured) = captured_app();
    let (status, body) = send(app, "GET", "/empty").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "");
    assert_eq!(captured.messages(), vec![String::new()]);
}

#[tokio::test]
async fn test_success_passes_through() {
    let (app, captured) = captured_app();
    let request = Request::builder()
        .uri("/calculators/1")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], b"BMI");
    assert!(captured.messages().is_empty());
}

#[tokio::test]
async fn test_unmatched_route_left_to_router() {
    let (app, captured) = captured_app();
    let (status, body) = send(app, "GET", "/nowhere").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);
    assert!(captured.messages().is_empty());
}

#[tokio::test]
async fn test_without_layer_body_still_rendered() {
    let app = Router::new().route("/users", post(register_user));
    let (status, body) = send(app, "POST", "/users").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["statusCode"], 403);
    assert_eq!(body["message"], "User already registered");
    assert_eq!(body["details"], "");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_timestamps_non_decreasing_across_requests() {
    let (app, _) = captured_app();
    let mut last = String::new();
    for _ in 0..20 {
        let (_, body) = send(app.clone(), "GET", "/calculators/9").await;
        let stamp = body["timestamp"].as_str().unwrap().to_string();
        let parsed = chrono::DateTime::parse_from_rfc3339(&stamp).unwrap();
        if !last.is_empty() {
            assert!(parsed >= chrono::DateTime::parse_from_rfc3339(&last).unwrap());
        }
        last = stamp;
    }
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

#[test]
fn test_tracing_sink_writes_one_error_line() {
    let buffer = LogBuffer::default();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(buffer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::TRACE)
        .finish();

    let responder = ErrorResponder::new();
    let body = tracing::subscriber::with_default(subscriber, || {
        responder.respond(
            &ApiException::invalid_parameter("weight must be positive"),
            &ArgumentsHost::new("/bmi"),
        )
    });

    let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
    let lines: Vec<_> = output.lines().collect();
    assert_eq!(lines.len(), 1);
    assert!(lines[0].contains("ERROR"));
    assert!(lines[0].ends_with(body.message()));
}
