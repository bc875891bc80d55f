use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use std::collections::BTreeSet;
use tracing::warn;

use super::{AppState, ProfileQuery};
use crate::datasource::market::parse_market_text;
use crate::domain::MarketUpdate;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncRequest {
    /// Symbols to refresh; defaults to every symbol in the profile.
    #[serde(default)]
    pub identifiers: Vec<String>,
}

/// Refresh the quote cache from the AI collaborator. Quotes are display-only;
/// the ledger never depends on them.
pub async fn sync(
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
    Json(request): Json<SyncRequest>,
) -> Result<Json<MarketUpdate>, AppError> {
    let identifiers = if request.identifiers.is_empty() {
        let profile = state.profile_id(&profile);
        let portfolio = state.load_portfolio(&profile).await?;
        let mut symbols: BTreeSet<String> = portfolio
            .trades()
            .iter()
            .filter(|l| l.is_open())
            .map(|l| l.symbol.as_str().to_string())
            .collect();
        for key in portfolio.holdings().keys() {
            let (ticker, _) = key.decode();
            symbols.insert(ticker.as_str().to_string());
        }
        symbols.into_iter().collect()
    } else {
        request.identifiers
    };

    if identifiers.is_empty() {
        return Ok(Json(state.market_cache.read().await.clone()));
    }

    let reply = state.ai.quote_prices(&identifiers).await?;
    let update = parse_market_text(&reply);
    if update.prices.is_empty() {
        warn!("quote sync produced no usable prices");
    }

    let mut cache = state.market_cache.write().await;
    cache.merge_from(update);
    Ok(Json(cache.clone()))
}
