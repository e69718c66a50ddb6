//! HTTP API handlers.

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use rps_custody::{Address, AssetId};
use rps_escrow_core::{Bet, Clock, Commitment, RoundError, RoundSnapshot, Salt};
use serde::{Deserialize, Serialize};

use crate::state::{AppState, RecordedEvent};

/// Header carrying the caller's address
pub const CALLER_HEADER: &str = "X-Caller";

// ============ Error type ============

#[derive(Debug)]
pub enum AppError {
    Round(RoundError),
    BadRequest(String),
}

impl From<RoundError> for AppError {
    fn from(err: RoundError) -> Self {
        AppError::Round(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::Round(err) => {
                let status = match err {
                    RoundError::BettingClosed
                    | RoundError::AwaitingBets
                    | RoundError::Duplicate => StatusCode::CONFLICT,
                    RoundError::NotAPlayer => StatusCode::FORBIDDEN,
                    RoundError::CheatingDetected => StatusCode::UNPROCESSABLE_ENTITY,
                    RoundError::TooEarly => StatusCode::PRECONDITION_FAILED,
                    RoundError::Custody(_) => StatusCode::PAYMENT_REQUIRED,
                };
                (status, err.kind(), err.to_string())
            }
            AppError::BadRequest(message) => {
                (StatusCode::BAD_REQUEST, "bad_request", message.clone())
            }
        };

        (
            status,
            Json(serde_json::json!({ "error": message, "code": code })),
        )
            .into_response()
    }
}

// ============ Request/Response types ============

#[derive(Deserialize)]
pub struct PlaceBetRequest {
    pub commitment: Commitment,
}

#[derive(Deserialize)]
pub struct RevealBetRequest {
    pub bet: Bet,
    pub salt: Salt,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub asset: AssetId,
    pub betting_amount: u64,
    pub round_timeout_secs: u64,
    pub escrow_account: Address,
}

#[derive(Deserialize)]
pub struct EventFilter {
    pub player: Option<Address>,
    pub bet: Option<Bet>,
}

#[derive(Serialize)]
pub struct EventsResponse {
    pub events: Vec<RecordedEvent>,
}

#[derive(Serialize)]
pub struct BalanceResponse {
    pub address: Address,
    pub asset: AssetId,
    pub balance: u64,
}

#[derive(Deserialize)]
pub struct FaucetRequest {
    pub address: Address,
    pub amount: u64,
}

#[derive(Deserialize)]
pub struct TickRequest {
    pub seconds: u64,
}

#[derive(Serialize)]
pub struct TickResponse {
    pub now: u64,
}

// ============ Helper to get caller from header ============

fn caller_from_headers(headers: &HeaderMap) -> Result<Address, AppError> {
    let raw = headers
        .get(CALLER_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::BadRequest(format!("Missing {} header", CALLER_HEADER)))?;

    raw.parse()
        .map_err(|err| AppError::BadRequest(format!("Invalid {} header: {}", CALLER_HEADER, err)))
}

fn status(text: &str) -> Json<StatusResponse> {
    Json(StatusResponse {
        status: text.to_string(),
    })
}

// ============ Round handlers ============

pub async fn place_bet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<PlaceBetRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let caller = caller_from_headers(&headers)?;
    state.coordinator().place_bet(caller, req.commitment).await?;
    Ok(status("bet_placed"))
}

pub async fn reveal_bet(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<RevealBetRequest>,
) -> Result<Json<StatusResponse>, AppError> {
    let caller = caller_from_headers(&headers)?;
    state
        .coordinator()
        .reveal_bet(caller, req.bet, req.salt)
        .await?;
    Ok(status("bet_revealed"))
}

pub async fn withdraw(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatusResponse>, AppError> {
    let caller = caller_from_headers(&headers)?;
    state.coordinator().withdraw(caller).await?;
    Ok(status("withdrawn"))
}

pub async fn get_round(State(state): State<AppState>) -> Json<RoundSnapshot> {
    Json(state.coordinator().snapshot().await)
}

pub async fn get_config(State(state): State<AppState>) -> Json<ConfigResponse> {
    let coordinator = state.coordinator();
    Json(ConfigResponse {
        asset: coordinator.asset().clone(),
        betting_amount: coordinator.betting_amount(),
        round_timeout_secs: coordinator.round_timeout(),
        escrow_account: coordinator.escrow_account(),
    })
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Json<EventsResponse> {
    let events = state
        .events()
        .into_iter()
        .filter(|e| filter.player.map_or(true, |p| e.event.involves(&p)))
        .filter(|e| filter.bet.map_or(true, |b| e.event.mentions_bet(b)))
        .collect();

    Json(EventsResponse { events })
}

// ============ Ledger handlers ============

pub async fn get_balance(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Result<Json<BalanceResponse>, AppError> {
    let address: Address = address
        .parse()
        .map_err(|err| AppError::BadRequest(format!("Invalid address: {}", err)))?;
    let asset = state.coordinator().asset().clone();
    let balance = state.custodian().balance(&asset, &address);

    Ok(Json(BalanceResponse {
        address,
        asset,
        balance,
    }))
}

pub async fn faucet(
    State(state): State<AppState>,
    Json(req): Json<FaucetRequest>,
) -> Result<Json<BalanceResponse>, AppError> {
    let asset = state.coordinator().asset().clone();
    let balance = state
        .custodian()
        .mint(&asset, req.address, req.amount)
        .map_err(|err| AppError::BadRequest(format!("Faucet refused: {}", err)))?;
    tracing::info!("Faucet minted {} {} to {}", req.amount, asset, req.address);

    Ok(Json(BalanceResponse {
        address: req.address,
        asset,
        balance,
    }))
}

// ============ System handlers ============

pub async fn tick(
    State(state): State<AppState>,
    Json(req): Json<TickRequest>,
) -> Json<TickResponse> {
    state.clock().advance(req.seconds);
    tracing::info!("Clock advanced by {}s", req.seconds);
    Json(TickResponse {
        now: state.clock().now(),
    })
}

pub async fn health() -> &'static str {
    "ok"
}
