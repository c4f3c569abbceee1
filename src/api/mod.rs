use axum::{
    Router,
    extract::Json,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use crate::core::solver::{RateSearchConfig, RateSearchResult, solve_withdrawal_rate};
use crate::core::{
    Allocation, DataPoint, Rebalancing, Results, SimulationError, SimulationInputs,
    SimulationReport, simulate_with_report, simulations_ran,
};

const DEFAULT_YEARS: u32 = 30;
const DEFAULT_WITHDRAWAL_RATE: f64 = 4.0;
const DEFAULT_START_YEAR: u32 = 1871;
const DEFAULT_END_YEAR: u32 = 2022;

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    portfolio: Vec<Allocation>,
    inflation: Vec<DataPoint>,
    assets: Vec<Vec<DataPoint>>,
    years: Option<u32>,
    #[serde(alias = "withdrawalRate")]
    wr: Option<f64>,
    start_year: Option<u32>,
    end_year: Option<u32>,
    #[serde(alias = "monthlyWithdrawal")]
    monthly: Option<bool>,
    #[serde(alias = "rebalancing")]
    rebalance: Option<String>,
    threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SolvePayload {
    #[serde(flatten)]
    simulation: SimulatePayload,
    target_success_rate: Option<f64>,
    search_min: Option<f64>,
    search_max: Option<f64>,
    tolerance: Option<f64>,
    max_iterations: Option<u32>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    rebalancing: Rebalancing,
    results: Results,
    trials: u64,
    rebalance_events: u64,
    simulations_ran: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SolveResponse {
    #[serde(flatten)]
    search: RateSearchResult,
    simulations_ran: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulationsResponse {
    simulations_ran: u64,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn build_inputs(payload: SimulatePayload) -> Result<SimulationInputs, String> {
    let rebalancing = match payload.rebalance.as_deref() {
        Some(token) => token.parse::<Rebalancing>().map_err(|e| e.to_string())?,
        None => Rebalancing::None,
    };

    if payload.portfolio.is_empty() {
        return Err("portfolio must list at least one asset".to_string());
    }

    Ok(SimulationInputs {
        portfolio: payload.portfolio,
        inflation: payload.inflation,
        asset_returns: payload.assets,
        years: payload.years.unwrap_or(DEFAULT_YEARS),
        withdrawal_rate: payload.wr.unwrap_or(DEFAULT_WITHDRAWAL_RATE),
        start_year: payload.start_year.unwrap_or(DEFAULT_START_YEAR),
        end_year: payload.end_year.unwrap_or(DEFAULT_END_YEAR),
        monthly_withdrawal: payload.monthly.unwrap_or(true),
        rebalancing,
        threshold: payload.threshold.unwrap_or(0.0),
    })
}

fn build_search_config(payload: &SolvePayload) -> RateSearchConfig {
    let defaults = RateSearchConfig::default();
    RateSearchConfig {
        target_success_rate: payload
            .target_success_rate
            .unwrap_or(defaults.target_success_rate),
        search_min: payload.search_min.unwrap_or(defaults.search_min),
        search_max: payload.search_max.unwrap_or(defaults.search_max),
        tolerance: payload.tolerance.unwrap_or(defaults.tolerance),
        max_iterations: payload.max_iterations.unwrap_or(defaults.max_iterations),
    }
}

pub fn router() -> Router {
    Router::new()
        .route("/api/simulate", post(simulate_handler))
        .route("/api/solve", post(solve_handler))
        .route("/api/simulations", get(simulations_handler))
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "SWR HTTP API listening");
    info!("Local access: http://127.0.0.1:{port}/api/simulations");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulations_handler() -> Response {
    json_response(
        StatusCode::OK,
        SimulationsResponse {
            simulations_ran: simulations_ran(),
        },
    )
}

async fn simulate_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn solve_handler(Json(payload): Json<SolvePayload>) -> Response {
    solve_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let inputs = match build_inputs(payload) {
        Ok(inputs) => inputs,
        Err(msg) => return reject(&msg),
    };

    let rebalancing = inputs.rebalancing;
    match run_blocking(move || simulate_with_report(&inputs)).await {
        Ok(report) => {
            info!(
                trials = report.trials,
                success_rate = report.results.success_rate,
                "simulate request served"
            );
            json_response(StatusCode::OK, build_simulate_response(rebalancing, report))
        }
        Err(response) => response,
    }
}

async fn solve_handler_impl(payload: SolvePayload) -> Response {
    let config = build_search_config(&payload);
    let inputs = match build_inputs(payload.simulation) {
        Ok(inputs) => inputs,
        Err(msg) => return reject(&msg),
    };

    match run_blocking(move || solve_withdrawal_rate(&inputs, config)).await {
        Ok(search) => {
            info!(
                solved_rate = ?search.solved_rate,
                feasible = search.feasible,
                "solve request served"
            );
            json_response(
                StatusCode::OK,
                SolveResponse {
                    search,
                    simulations_ran: simulations_ran(),
                },
            )
        }
        Err(response) => response,
    }
}

async fn run_blocking<T, F>(job: F) -> Result<T, Response>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, SimulationError> + Send + 'static,
{
    match tokio::task::spawn_blocking(job).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(reject(&err.to_string())),
        Err(join_err) => {
            error!(error = %join_err, "simulation task failed");
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "simulation task failed",
            ))
        }
    }
}

fn build_simulate_response(
    rebalancing: Rebalancing,
    report: SimulationReport,
) -> SimulateResponse {
    SimulateResponse {
        rebalancing,
        results: report.results,
        trials: report.trials,
        rebalance_events: report.rebalance_events,
        simulations_ran: simulations_ran(),
    }
}

fn reject(msg: &str) -> Response {
    warn!(error = msg, "rejected request");
    error_response(StatusCode::BAD_REQUEST, msg)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn inputs_from_json(json: &str) -> Result<SimulationInputs, String> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    build_inputs(payload)
}
