//! HTTP front end exposing the sampler at `GET /measure`

use crate::{
    client::build_target_url,
    error::{AppError, Result},
    executor::SamplingExecutor,
    logging::ProbeLogger,
    models::{Config, MeasurementResult},
};
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::{Duration, Instant};
use tokio::net::TcpListener;

pub const INVALID_SAMPLE_COUNT: &str = "Invalid sample count";
pub const MISSING_TARGET: &str = "Both [host] and [protocol] parameters must be present";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    executor: SamplingExecutor,
    sample_timeout: Duration,
    logger: ProbeLogger,
}

impl AppState {
    pub fn new(executor: SamplingExecutor, sample_timeout: Duration, logger: ProbeLogger) -> Self {
        Self {
            executor,
            sample_timeout,
            logger,
        }
    }

    /// Build state with an HTTP-backed sampler configured from `config`
    pub fn from_config(config: &Config, logger: ProbeLogger) -> Result<Self> {
        let executor = SamplingExecutor::from_config(config, logger.clone())?;
        Ok(Self::new(executor, config.sample_timeout(), logger))
    }
}

/// `/measure` parameters; the first occurrence of a repeated key wins
#[derive(Debug, Default)]
struct MeasureQuery {
    samples: Option<String>,
    protocol: Option<String>,
    host: Option<String>,
}

impl MeasureQuery {
    fn parse(raw: Option<&str>) -> Self {
        let mut query = Self::default();

        for (key, value) in url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes()) {
            let slot = match key.as_ref() {
                "samples" => &mut query.samples,
                "protocol" => &mut query.protocol,
                "host" => &mut query.host,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        query
    }
}

/// Body of every 400 response
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ErrorBody {
    #[serde(rename = "Message")]
    pub message: String,
    #[serde(rename = "Host", skip_serializing_if = "Option::is_none", default)]
    pub host: Option<String>,
    #[serde(rename = "Protocol", skip_serializing_if = "Option::is_none", default)]
    pub protocol: Option<String>,
}

impl ErrorBody {
    fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            host: None,
            protocol: None,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    commit: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/measure", get(measure))
        .route("/health", get(health))
        .with_state(state)
}

/// Bind the configured address and serve until Ctrl-C
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::io(format!("Failed to bind {}: {}", addr, e)))?;

    serve_on(listener, state).await
}

/// Serve on an already bound listener
pub async fn serve_on(listener: TcpListener, state: AppState) -> Result<()> {
    let addr: SocketAddr = listener.local_addr()?;
    let logger = state.logger.clone();
    crate::log_info!(logger.inner(), "Listening on http://{}", addr);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::io(format!("Server error: {}", e)))?;

    crate::log_info!(logger.inner(), "Server on {} stopped", addr);
    Ok(())
}

async fn shutdown_signal() {
    // If the handler cannot be installed, run until the process is killed
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}

async fn measure(State(state): State<AppState>, RawQuery(raw): RawQuery) -> Response {
    let started = Instant::now();
    let query = MeasureQuery::parse(raw.as_deref());
    let response = handle_measure(&state, query).await;
    state
        .logger
        .log_request("/measure", response.status().as_u16(), started.elapsed())
        .await;
    response
}

async fn handle_measure(state: &AppState, query: MeasureQuery) -> Response {
    let samples = match parse_sample_count(query.samples.as_deref()) {
        Some(samples) => samples,
        None => return bad_request(ErrorBody::message(INVALID_SAMPLE_COUNT)),
    };

    let protocol = query.protocol.unwrap_or_default();
    let host = query.host.unwrap_or_default();
    if protocol.is_empty() || host.is_empty() {
        return bad_request(ErrorBody {
            message: MISSING_TARGET.to_string(),
            host: Some(host),
            protocol: Some(protocol),
        });
    }

    let target = build_target_url(&protocol, &host);
    match state.executor.run(&target, samples, state.sample_timeout).await {
        Ok(results) => Json(MeasurementResult {
            host,
            protocol,
            results,
        })
        .into_response(),
        Err(error) => bad_request(ErrorBody::message(error.to_string())),
    }
}

/// Accepts an optionally signed decimal integer in `0..=u32::MAX`
fn parse_sample_count(raw: Option<&str>) -> Option<u32> {
    let value: i64 = raw?.parse().ok()?;
    u32::try_from(value).ok()
}

fn bad_request(body: ErrorBody) -> Response {
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: crate::VERSION,
        commit: env!("GIT_COMMIT"),
    })
}
