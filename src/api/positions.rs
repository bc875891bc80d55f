use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::AppState;
use crate::domain::{HoldingKey, Lot, StockHolding};
use crate::engine::{
    matcher, views, CombinationSet, MergedOptionRow, OpenPositionFilter, PositionSort,
    SortDirection,
};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsQuery {
    pub profile: Option<String>,
    pub ticker: Option<String>,
    pub broker: Option<String>,
    #[serde(default)]
    pub sort: Option<PositionSort>,
    #[serde(default)]
    pub direction: Option<SortDirection>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionsResponse {
    pub lots: Vec<Lot>,
    pub merged: Vec<MergedOptionRow>,
    pub combinations: CombinationSet,
    pub stock_portfolio: BTreeMap<HoldingKey, StockHolding>,
    pub brokers: Vec<String>,
}

pub async fn get_positions(
    Query(params): Query<PositionsQuery>,
    State(state): State<AppState>,
) -> Result<Json<PositionsResponse>, AppError> {
    let profile = state.profile_id(&super::ProfileQuery {
        profile: params.profile.clone(),
    });
    let portfolio = state.load_portfolio(&profile).await?;

    let filter = OpenPositionFilter {
        ticker: params.ticker.clone(),
        broker: params.broker.clone(),
    };
    let sort = params.sort.unwrap_or_default();
    let direction = params.direction.unwrap_or_default();

    let lots = views::open_option_lots(&portfolio, &filter, sort, direction)
        .into_iter()
        .cloned()
        .collect();
    let merged = views::merged_rows(&portfolio, &filter);
    let combinations = matcher::match_combinations(&portfolio);

    Ok(Json(PositionsResponse {
        lots,
        merged,
        combinations,
        stock_portfolio: portfolio.holdings().clone(),
        brokers: portfolio.brokers().to_vec(),
    }))
}
