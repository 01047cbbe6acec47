//! API route handlers.
//!
//! All endpoints return JSON. State is the shared `CardBuilder`.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::warn;

use crate::engine::CardBuilder;
use crate::strategy::{scan, OddsBand, ScanOutcome};
use crate::types::{CardReport, CardRequest, GoalcardError, OddsQuote};

pub type AppState = Arc<CardBuilder>;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Card request plus the candidate bets to check against the card.
#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    #[serde(flatten)]
    pub request: CardRequest,
    #[serde(default)]
    pub candidates: Vec<OddsQuote>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScanResponse {
    pub card: CardReport,
    pub decisions: ScanOutcome,
}

#[derive(Debug, Clone, Serialize)]
pub struct BandInfo {
    pub id: OddsBand,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_blended_probability: f64,
    pub min_edge: f64,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Message returned for any fault that is not the caller's doing.
pub const INTERNAL_ERROR: &str = "internal error";

/// Every failure surfaces as a 400 with an `{error}` body.
#[derive(Debug)]
pub struct ApiError(String);

impl ApiError {
    pub fn internal() -> Self {
        Self(INTERNAL_ERROR.to_string())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (StatusCode::BAD_REQUEST, Json(ErrorBody { error: self.0 })).into_response()
    }
}

impl From<GoalcardError> for ApiError {
    fn from(err: GoalcardError) -> Self {
        match &err {
            GoalcardError::InvalidRequest(_) => {
                warn!(error = %err, "Rejected card request");
                Self(err.to_string())
            }
            _ => {
                warn!(error = %err, "Card build failed");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        warn!(error = %rejection.body_text(), "Malformed request body");
        Self(rejection.body_text())
    }
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// POST /api/pcard
pub async fn post_pcard(
    State(state): State<AppState>,
    payload: Result<Json<CardRequest>, JsonRejection>,
) -> Result<Json<CardReport>, ApiError> {
    let Json(request) = payload?;
    let report = state.build(&request).await?;
    Ok(Json(report))
}

/// POST /api/scan
pub async fn post_scan(
    State(state): State<AppState>,
    payload: Result<Json<ScanRequest>, JsonRejection>,
) -> Result<Json<ScanResponse>, ApiError> {
    let Json(body) = payload?;
    let card = state.build(&body.request).await?;
    let decisions = scan(&card.p_card, &body.candidates);
    Ok(Json(ScanResponse { card, decisions }))
}

/// GET /api/bands
pub async fn get_bands() -> Json<Vec<BandInfo>> {
    let bands = OddsBand::ALL
        .into_iter()
        .map(|band| {
            let range = band.price_range();
            let t = band.thresholds();
            BandInfo {
                id: band,
                min_price: range.map(|r| r.0),
                max_price: range.map(|r| r.1),
                min_blended_probability: t.min_blended_probability,
                min_edge: t.min_edge,
            }
        })
        .collect();
    Json(bands)
}

/// GET /health
pub async fn health() -> StatusCode {
    StatusCode::OK
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
