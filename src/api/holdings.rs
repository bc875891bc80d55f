use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use super::{AppState, ProfileQuery};
use crate::domain::{Decimal, HoldingKey};
use crate::error::AppError;

/// Body for holding updates. `reduce_by` sells shares at average cost;
/// otherwise `quantity`/`total_cost` replace the stored values, optionally
/// re-keying to a new ticker or broker.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingUpdate {
    #[serde(default)]
    pub reduce_by: Option<i64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub total_cost: Option<Decimal>,
    #[serde(default)]
    pub new_ticker: Option<String>,
    #[serde(default)]
    pub new_broker: Option<String>,
}

pub async fn update_holding(
    Path(key): Path<String>,
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
    Json(update): Json<HoldingUpdate>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = HoldingKey::from_raw(&key);
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;

    if let Some(reduce_by) = update.reduce_by {
        portfolio.reduce_stock_holding(&key, reduce_by)?;
    } else {
        let current = portfolio
            .holdings()
            .get(&key)
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("holding {}", key)))?;
        let quantity = update.quantity.unwrap_or(current.quantity);
        let total_cost = update.total_cost.unwrap_or(current.total_cost);
        portfolio.update_stock_holding(
            &key,
            quantity,
            total_cost,
            update.new_ticker.as_deref(),
            update.new_broker.as_deref(),
        )?;
    }

    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(serde_json::json!({
        "stockPortfolio": portfolio.holdings(),
    })))
}

pub async fn delete_holding(
    Path(key): Path<String>,
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, AppError> {
    let key = HoldingKey::from_raw(&key);
    let profile = state.profile_id(&profile);
    let mut portfolio = state.load_portfolio(&profile).await?;
    portfolio.delete_holding(&key)?;
    state.save_portfolio(&profile, &portfolio).await?;
    Ok(Json(serde_json::json!({"deleted": key.to_string()})))
}
