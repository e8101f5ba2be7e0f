//! API Request Handlers

use axum::{
    extract::{rejection::JsonRejection, Json, State},
    http::StatusCode,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use super::types::*;
use crate::core::pipeline::Investigator;
use crate::models::types::CourtCase;
use crate::utils::constants::APP_VERSION;
use crate::utils::telemetry::TelemetryCollector;

/// Shared application state
pub struct AppState {
    pub investigator: Arc<Investigator>,
    pub telemetry: Arc<TelemetryCollector>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(investigator: Arc<Investigator>) -> Self {
        let telemetry = investigator.telemetry();
        Self {
            investigator,
            telemetry,
            start_time: Instant::now(),
        }
    }

    pub fn uptime_seconds(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

type ErrorResponse = (StatusCode, Json<ApiResponse<()>>);

fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

// ============================================
// Health Check
// ============================================

pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<ApiResponse<HealthData>> {
    let start = Instant::now();

    let data = HealthData {
        status: "healthy".to_string(),
        version: APP_VERSION.to_string(),
        chain: state.investigator.chain_name().to_string(),
        uptime_seconds: state.uptime_seconds(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}

// ============================================
// Investigation
// ============================================

pub async fn investigate_wallet(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<InvestigateRequest>, JsonRejection>,
) -> Result<Json<ApiResponse<CourtCase>>, ErrorResponse> {
    let start = Instant::now();

    // Malformed bodies get the JSON envelope too, not axum's plain text
    let Json(req) = payload.map_err(|rejection| {
        warn!("❌ Bad investigate body: {}", rejection.body_text());
        (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::error(
                ApiError::bad_request(rejection.body_text()),
                elapsed_ms(start),
            )),
        )
    })?;

    match state.investigator.investigate(&req.wallet_address).await {
        Ok(case) => {
            info!(
                "⚖️ API case {}: {} ({:.1})",
                case.case_id,
                case.verdict.verdict.as_str(),
                case.verdict.risk_score
            );
            Ok(Json(ApiResponse::success(case, elapsed_ms(start))))
        }
        Err(e) => {
            warn!("❌ Investigation rejected: {}", e);
            let status = StatusCode::from_u16(e.code.http_status())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            Err((
                status,
                Json(ApiResponse::error(ApiError::from(&e), elapsed_ms(start))),
            ))
        }
    }
}

// ============================================
// Stats
// ============================================

pub async fn get_stats(State(state): State<Arc<AppState>>) -> Json<ApiResponse<StatsData>> {
    let start = Instant::now();
    let stats = state.telemetry.get_stats();

    let data = StatsData {
        fraud_rate: stats.fraud_rate(),
        investigations: stats,
        uptime_seconds: state.uptime_seconds(),
        api_version: APP_VERSION.to_string(),
    };

    Json(ApiResponse::success(data, elapsed_ms(start)))
}
