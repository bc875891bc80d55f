use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::{AppState, ProfileQuery};
use crate::datasource::ocr::parse_candidates;
use crate::domain::OcrTradeCandidate;
use crate::engine::ImportReport;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractRequest {
    pub image_base64: String,
    #[serde(default = "default_mime")]
    pub mime: String,
}

fn default_mime() -> String {
    "image/png".to_string()
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractResponse {
    pub candidates: Vec<OcrTradeCandidate>,
}

/// Run OCR over a screenshot and return candidates for review. Nothing is
/// written; the client confirms a batch through `commit`.
pub async fn extract(
    State(state): State<AppState>,
    Json(request): Json<ExtractRequest>,
) -> Result<Json<ExtractResponse>, AppError> {
    let reply = state
        .ai
        .extract_trades(&request.image_base64, &request.mime)
        .await?;
    let today = chrono::Utc::now().date_naive();
    let candidates = parse_candidates(&reply, today);
    Ok(Json(ExtractResponse { candidates }))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommitRequest {
    pub candidates: Vec<OcrTradeCandidate>,
}

/// Import reviewed candidates into the ledger. Per-item failures are
/// reported, not fatal.
pub async fn commit(
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
    Json(request): Json<CommitRequest>,
) -> Result<Json<ImportReport>, AppError> {
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;
    let report = portfolio.import_candidates(request.candidates);
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(report))
}
