use axum::Json;
use serde::Deserialize;

use crate::engine::{payoff, PayoffAnalysis, PutLeg};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffRequest {
    pub short_leg: PutLeg,
    pub long_leg: PutLeg,
}

/// Stateless: the caller supplies both legs, usually straight from a matched
/// pair in the positions response.
pub async fn analyze_payoff(
    Json(request): Json<PayoffRequest>,
) -> Result<Json<PayoffAnalysis>, AppError> {
    Ok(Json(payoff::analyze(request.short_leg, request.long_leg)))
}
