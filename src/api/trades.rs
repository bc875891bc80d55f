use axum::extract::{Path, Query, State};
use axum::Json;

use super::{AppState, ProfileQuery};
use crate::domain::{Lot, LotDraft, LotPatch, LotId, TxId};
use crate::engine::CloseRequest;
use crate::error::AppError;

pub async fn create_trade(
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
    Json(draft): Json<LotDraft>,
) -> Result<Json<Lot>, AppError> {
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;
    let lot = portfolio.open_lot(draft)?.clone();
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(lot))
}

pub async fn modify_trade(
    Path(id): Path<String>,
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
    Json(patch): Json<LotPatch>,
) -> Result<Json<Lot>, AppError> {
    let id = parse_lot_id(&id)?;
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;
    let lot = portfolio.modify_lot(id, patch)?.clone();
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(lot))
}

pub async fn delete_trade(
    Path(id): Path<String>,
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let id = parse_lot_id(&id)?;
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;
    portfolio.delete_lot(id)?;
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(serde_json::json!({"deleted": id.to_string()})))
}

pub async fn close_trade(
    Path(id): Path<String>,
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
    Json(request): Json<CloseRequest>,
) -> Result<Json<Lot>, AppError> {
    let id = parse_lot_id(&id)?;
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;
    portfolio.close_lot(id, request)?;
    let lot = portfolio
        .lot(id)
        .cloned()
        .ok_or_else(|| AppError::Internal("lot vanished after close".to_string()))?;
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(lot))
}

pub async fn undo_close(
    Path((id, tx_id)): Path<(String, String)>,
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
) -> Result<Json<Lot>, AppError> {
    let id = parse_lot_id(&id)?;
    let tx_id: TxId = tx_id
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid transaction id".to_string()))?;
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;
    portfolio.undo_close(id, tx_id)?;
    let lot = portfolio
        .lot(id)
        .cloned()
        .ok_or_else(|| AppError::Internal("lot vanished after undo".to_string()))?;
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(lot))
}

fn parse_lot_id(raw: &str) -> Result<LotId, AppError> {
    raw.parse()
        .map_err(|_| AppError::BadRequest("Invalid lot id".to_string()))
}
