use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{AppState, ProfileQuery};
use crate::domain::PortfolioDocument;
use crate::engine::Portfolio;
use crate::error::AppError;

pub async fn export_document(
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
) -> Result<Json<PortfolioDocument>, AppError> {
    let profile = state.profile_id(&profile);
    let portfolio = state.load_portfolio(&profile).await?;
    Ok(Json(portfolio.to_document()))
}

/// Replace the whole profile with an exported document. Validation happens
/// before anything is written, so a malformed blob leaves the stored state
/// untouched.
pub async fn import_document(
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
    Json(blob): Json<serde_json::Value>,
) -> Result<Json<serde_json::Value>, AppError> {
    let document = Portfolio::parse_document(&blob)?;
    let profile = state.profile_id(&profile);
    let portfolio = Portfolio::from_document(document);
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(serde_json::json!({
        "imported": true,
        "trades": portfolio.trades().len(),
        "holdings": portfolio.holdings().len(),
    })))
}

#[derive(Debug, Deserialize)]
pub struct BrokerBody {
    pub name: String,
}

pub async fn add_broker(
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
    Json(body): Json<BrokerBody>,
) -> Result<Json<serde_json::Value>, AppError> {
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;
    portfolio.add_broker(&body.name)?;
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(serde_json::json!({"brokers": portfolio.brokers()})))
}

pub async fn remove_broker(
    Path(name): Path<String>,
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;
    portfolio.remove_broker(&name);
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(serde_json::json!({"brokers": portfolio.brokers()})))
}
