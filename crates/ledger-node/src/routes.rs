use crate::error::ApiError;
use axum::{
    body::Bytes,
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use ledger_core::{ChainFault, LedgerError, LedgerService, Outcome};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tower_http::{limit::RequestBodyLimitLayer, timeout::TimeoutLayer, trace::TraceLayer};
use tracing::debug;

#[derive(Clone)]
pub struct AppState {
    pub ledger: LedgerService,
}

#[derive(Serialize)]
struct Health {
    status: &'static str,
}

#[derive(Deserialize)]
struct EntryIn {
    amount: i64,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(|| async { Json(Health { status: "ok" }) }))
        .route("/", get(get_chain).post(submit_entry))
        .route("/chain", get(get_chain).post(submit_entry))
        .route("/chain/head", get(head))
        .route("/chain/verify", get(verify))
        .with_state(state)
}

/// Request tracing, a per-request timeout and a body size cap.
pub fn with_transport_layers(app: Router, timeout: Duration, max_body_bytes: usize) -> Router {
    app.layer(RequestBodyLimitLayer::new(max_body_bytes))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(TraceLayer::new_for_http())
}

fn pretty_json<T: Serialize>(status: StatusCode, value: &T) -> Response {
    match serde_json::to_string_pretty(value) {
        Ok(body) => (status, [(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Err(err) => ApiError::Internal(err.to_string()).into_response(),
    }
}

async fn get_chain(State(state): State<AppState>) -> Response {
    pretty_json(StatusCode::OK, &state.ledger.get_chain())
}

async fn submit_entry(State(state): State<AppState>, body: Bytes) -> Result<Response, ApiError> {
    let entry: EntryIn =
        serde_json::from_slice(&body).map_err(|err| ApiError::MalformedSubmission {
            reason: err.to_string(),
            body: String::from_utf8_lossy(&body).into_owned(),
        })?;
    debug!(amount = entry.amount, "submission received");

    let submission = state.ledger.submit_entry(entry.amount)?;
    let response = match submission.outcome {
        Outcome::Accepted => pretty_json(StatusCode::CREATED, &submission.block),
        Outcome::Rejected(reason) => pretty_json(
            StatusCode::CONFLICT,
            &json!({
                "accepted": false,
                "reason": reason.to_string(),
                "block": submission.block,
            }),
        ),
    };
    Ok(response)
}

async fn head(State(state): State<AppState>) -> Result<Json<ledger_core::Head>, ApiError> {
    state
        .ledger
        .head()
        .map(Json)
        .ok_or(ApiError::Ledger(LedgerError::LedgerNotReady))
}

async fn verify(State(state): State<AppState>) -> Json<serde_json::Value> {
    match state.ledger.verify() {
        Ok(length) => Json(json!({ "valid": true, "length": length })),
        Err(fault) => {
            let position = match fault {
                ChainFault::Broken { position, .. } => Some(position),
                ChainFault::BadGenesis => Some(0),
                ChainFault::Empty => None,
            };
            Json(json!({
                "valid": false,
                "position": position,
                "reason": fault.to_string(),
            }))
        }
    }
}
