use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    routing::get,
};
use medcalc_exception::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Serialize)]
struct Calculator {
    id: u32,
    name: String,
}

#[derive(Deserialize)]
struct CreateCalculator {
    name: String,
}

#[derive(Deserialize)]
struct BmiParams {
    weight: f64,
    height: f64,
}

#[derive(Serialize)]
struct BmiResult {
    bmi: f64,
}

#[derive(Clone, Default)]
struct AppState {
    calculators: Arc<RwLock<BTreeMap<u32, Calculator>>>,
}

async fn get_calculator(
    State(state): State<AppState>,
    path: std::result::Result<Path<u32>, PathRejection>,
) -> Result<Json<Calculator>> {
    let Path(id) = path?;
    state
        .calculators
        .read()
        .await
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiException::not_found(format!("Calculator {} not found", id)))
}

async fn list_calculators(State(state): State<AppState>) -> Json<Vec<Calculator>> {
    Json(state.calculators.read().await.values().cloned().collect())
}

async fn create_calculator(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateCalculator>, JsonRejection>,
) -> Result<(StatusCode, Json<Calculator>)> {
    let Json(req) = payload?;
    if req.name.trim().is_empty() {
        return Err(ApiException::invalid_parameter("name must not be blank"));
    }

    let mut calculators = state.calculators.write().await;
    if calculators.values().any(|c| c.name == req.name) {
        return Err(ApiException::already_exists(format!(
            "Calculator {} already exists",
            req.name
        )));
    }

    let id = calculators.keys().next_back().map_or(1, |last| last + 1);
    let calculator = Calculator { id, name: req.name };
    calculators.insert(id, calculator.clone());
    tracing::info!("Created calculator {} ({})", calculator.name, id);

    Ok((StatusCode::CREATED, Json(calculator)))
}

async fn bmi(query: std::result::Result<Query<BmiParams>, QueryRejection>) -> Result<Json<BmiResult>> {
    let Query(params) = query?;
    if params.weight <= 0.0 {
        return Err(ApiException::invalid_parameter("weight must be positive"));
    }
    if params.height <= 0.0 {
        return Err(ApiException::invalid_parameter("height must be positive"));
    }

    let meters = params.height / 100.0;
    Ok(Json(BmiResult {
        bmi: params.weight / (meters * meters),
    }))
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let state = AppState::default();
    state.calculators.write().await.insert(
        1,
        Calculator {
            id: 1,
            name: "BMI".to_string(),
        },
    );

    let router = Router::new()
        .route("/calculators", get(list_calculators).post(create_calculator))
        .route("/calculators/{id}", get(get_calculator))
        .route("/bmi", get(bmi))
        .layer(ExceptionLayer::new(ErrorResponder::new()))
        .with_state(state);

    let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Calculator server running on http://{}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        tracing::info!("Shutting down");
    })
    .await
}
