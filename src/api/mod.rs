use axum::{
    Router,
    extract::{
        Json, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::core::{
    DEFAULT_SEED, DEFAULT_TRIALS, RetirementInputs, RetirementReport, SimulationConfig,
    build_report,
};

mod error;

pub use error::InputError;

const MAX_CURRENT_AGE: u32 = 99;
const MAX_RETIREMENT_AGE: u32 = 99;
const MAX_LIFE_EXPECTANCY: u32 = 120;
const MAX_TRIALS: u32 = 100_000;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "readiness",
    about = "Retirement readiness estimator (required corpus, savings projection, Monte Carlo, allocation)"
)]
struct Cli {
    #[arg(long, default_value_t = 30)]
    current_age: u32,
    #[arg(long, default_value_t = 60)]
    retirement_age: u32,
    #[arg(long, default_value_t = 85)]
    life_expectancy: u32,
    #[arg(long, default_value_t = 50_000.0)]
    current_savings: f64,
    #[arg(long, default_value_t = 1_000.0)]
    monthly_contribution: f64,
    #[arg(
        long,
        default_value_t = 40_000.0,
        help = "Desired annual retirement income in today's money"
    )]
    desired_annual_income_today: f64,
    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected pre-retirement annual return in percent"
    )]
    avg_annual_return: f64,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Annual return standard deviation in percent"
    )]
    std_dev_annual_return: f64,
    #[arg(
        long,
        default_value_t = 5.0,
        help = "Annual return during retirement in percent"
    )]
    post_retirement_return_rate: f64,
    #[arg(long, default_value_t = 3.0, help = "Annual inflation in percent")]
    inflation_rate: f64,
    #[arg(long, default_value_t = DEFAULT_TRIALS)]
    trials: u32,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    #[arg(long, help = "Run Monte Carlo trials on a single thread")]
    sequential: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    current_age: Option<u32>,
    retirement_age: Option<u32>,
    life_expectancy: Option<u32>,
    current_savings: Option<f64>,
    monthly_contribution: Option<f64>,
    desired_annual_income_today: Option<f64>,
    avg_annual_return: Option<f64>,
    std_dev_annual_return: Option<f64>,
    post_retirement_return_rate: Option<f64>,
    inflation_rate: Option<f64>,
    trials: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug)]
struct PlanRequest {
    inputs: RetirementInputs,
    config: SimulationConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse {
    trials: u32,
    seed: u64,
    report: RetirementReport,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Parses process arguments, builds the report and renders it as JSON.
pub fn run_cli() -> anyhow::Result<String> {
    let request = build_request(&Cli::parse())?;
    let response = plan(&request);
    Ok(serde_json::to_string_pretty(&response)?)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "readiness HTTP API listening");
    info!("local access: http://127.0.0.1:{port}/api/plan");

    axum::serve(listener, router()).await
}

fn router() -> Router {
    Router::new()
        .route("/api/plan", get(plan_get_handler).post(plan_post_handler))
        .fallback(not_found_handler)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn plan_get_handler(payload: Result<Query<PlanPayload>, QueryRejection>) -> Response {
    match payload {
        Ok(Query(payload)) => plan_handler_impl(payload).await,
        Err(rejection) => rejected(InputError::Payload(rejection.body_text())),
    }
}

async fn plan_post_handler(payload: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    match payload {
        Ok(Json(payload)) => plan_handler_impl(payload).await,
        Err(rejection) => rejected(InputError::Payload(rejection.body_text())),
    }
}

async fn plan_handler_impl(payload: PlanPayload) -> Response {
    let request = match request_from_payload(payload) {
        Ok(request) => request,
        Err(err) => return rejected(err),
    };

    info!(
        current_age = request.inputs.current_age,
        retirement_age = request.inputs.retirement_age,
        trials = request.config.trials,
        "building readiness report"
    );
    // Trials are CPU bound; keep them off the async workers.
    match tokio::task::spawn_blocking(move || plan(&request)).await {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(err) => {
            tracing::error!(error = %err, "readiness report task failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Report computation failed")
        }
    }
}

fn rejected(err: InputError) -> Response {
    warn!(error = %err, "rejected plan request");
    error_response(StatusCode::BAD_REQUEST, &err.to_string())
}

fn plan(request: &PlanRequest) -> PlanResponse {
    PlanResponse {
        trials: request.config.trials,
        seed: request.config.seed,
        report: build_report(&request.inputs, &request.config),
    }
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

fn default_cli() -> Cli {
    Cli::parse_from(["readiness"])
}

#[cfg(test)]
fn request_from_json(json: &str) -> Result<PlanRequest, InputError> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| InputError::Payload(e.to_string()))?;
    request_from_payload(payload)
}

fn request_from_payload(payload: PlanPayload) -> Result<PlanRequest, InputError> {
    let mut cli = default_cli();

    if let Some(v) = payload.current_age {
        cli.current_age = v;
    }
    if let Some(v) = payload.retirement_age {
        cli.retirement_age = v;
    }
    if let Some(v) = payload.life_expectancy {
        cli.life_expectancy = v;
    }
    if let Some(v) = payload.current_savings {
        cli.current_savings = v;
    }
    if let Some(v) = payload.monthly_contribution {
        cli.monthly_contribution = v;
    }
    if let Some(v) = payload.desired_annual_income_today {
        cli.desired_annual_income_today = v;
    }
    if let Some(v) = payload.avg_annual_return {
        cli.avg_annual_return = v;
    }
    if let Some(v) = payload.std_dev_annual_return {
        cli.std_dev_annual_return = v;
    }
    if let Some(v) = payload.post_retirement_return_rate {
        cli.post_retirement_return_rate = v;
    }
    if let Some(v) = payload.inflation_rate {
        cli.inflation_rate = v;
    }
    if let Some(v) = payload.trials {
        cli.trials = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }

    build_request(&cli)
}

fn build_request(cli: &Cli) -> Result<PlanRequest, InputError> {
    if !(1..=MAX_CURRENT_AGE).contains(&cli.current_age) {
        return Err(InputError::OutOfRange {
            flag: "--current-age",
            min: 1.0,
            max: f64::from(MAX_CURRENT_AGE),
        });
    }

    if cli.retirement_age <= cli.current_age || cli.retirement_age > MAX_RETIREMENT_AGE {
        return Err(InputError::AgeOrder {
            flag: "--retirement-age",
            after: "--current-age",
            max: MAX_RETIREMENT_AGE,
        });
    }

    if cli.life_expectancy <= cli.retirement_age || cli.life_expectancy > MAX_LIFE_EXPECTANCY {
        return Err(InputError::AgeOrder {
            flag: "--life-expectancy",
            after: "--retirement-age",
            max: MAX_LIFE_EXPECTANCY,
        });
    }

    for (flag, amount) in [
        ("--current-savings", cli.current_savings),
        ("--monthly-contribution", cli.monthly_contribution),
        (
            "--desired-annual-income-today",
            cli.desired_annual_income_today,
        ),
    ] {
        if !amount.is_finite() || amount < 0.0 {
            return Err(InputError::NegativeAmount { flag });
        }
    }

    for (flag, pct) in [
        ("--avg-annual-return", cli.avg_annual_return),
        ("--std-dev-annual-return", cli.std_dev_annual_return),
        (
            "--post-retirement-return-rate",
            cli.post_retirement_return_rate,
        ),
        ("--inflation-rate", cli.inflation_rate),
    ] {
        if !(0.0..=100.0).contains(&pct) {
            return Err(InputError::OutOfRange {
                flag,
                min: 0.0,
                max: 100.0,
            });
        }
    }

    if !(1..=MAX_TRIALS).contains(&cli.trials) {
        return Err(InputError::OutOfRange {
            flag: "--trials",
            min: 1.0,
            max: f64::from(MAX_TRIALS),
        });
    }

    Ok(PlanRequest {
        inputs: RetirementInputs {
            current_age: cli.current_age,
            retirement_age: cli.retirement_age,
            life_expectancy: cli.life_expectancy,
            current_savings: cli.current_savings,
            monthly_contribution: cli.monthly_contribution,
            desired_annual_income_today: cli.desired_annual_income_today,
            avg_annual_return: cli.avg_annual_return / 100.0,
            std_dev_annual_return: cli.std_dev_annual_return / 100.0,
            post_retirement_return_rate: cli.post_retirement_return_rate / 100.0,
            inflation_rate: cli.inflation_rate / 100.0,
        },
        config: SimulationConfig {
            trials: cli.trials,
            seed: cli.seed,
            parallel: !cli.sequential,
        },
    })
}
