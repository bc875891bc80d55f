pub mod health;
pub mod holdings;
pub mod market;
pub mod ocr;
pub mod payoff;
pub mod portfolio;
pub mod positions;
pub mod profiles;
pub mod risk;
pub mod summary;
pub mod trades;

use crate::config::Config;
use crate::datasource::AiEngine;
use crate::db::Repository;
use crate::domain::MarketUpdate;
use crate::engine::Portfolio;
use crate::error::AppError;
use axum::{
    routing::{get, post, put},
    Router,
};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub repo: Arc<Repository>,
    pub config: Config,
    pub ai: Arc<dyn AiEngine>,
    pub market_cache: Arc<RwLock<MarketUpdate>>,
}

impl AppState {
    pub fn new(repo: Arc<Repository>, config: Config, ai: Arc<dyn AiEngine>) -> Self {
        Self {
            repo,
            config,
            ai,
            market_cache: Arc::new(RwLock::new(MarketUpdate::default())),
        }
    }

    /// Resolve the profile a request acts on.
    pub fn profile_id(&self, query: &ProfileQuery) -> String {
        query
            .profile
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| self.config.default_profile.clone())
    }

    /// Load a profile's ledger, empty if the profile has never been saved.
    pub async fn load_portfolio(&self, profile: &str) -> Result<Portfolio, AppError> {
        let document = self.repo.load_portfolio(profile).await?;
        Ok(document.map(Portfolio::from_document).unwrap_or_default())
    }

    /// Persist a profile's ledger.
    pub async fn save_portfolio(
        &self,
        profile: &str,
        portfolio: &Portfolio,
    ) -> Result<(), AppError> {
        self.repo
            .save_portfolio(profile, &portfolio.to_document())
            .await?;
        Ok(())
    }
}

/// Query parameter shared by every ledger route.
#[derive(Debug, Default, Deserialize)]
pub struct ProfileQuery {
    pub profile: Option<String>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/positions", get(positions::get_positions))
        .route("/v1/trades", post(trades::create_trade))
        .route(
            "/v1/trades/:id",
            axum::routing::patch(trades::modify_trade).delete(trades::delete_trade),
        )
        .route("/v1/trades/:id/close", post(trades::close_trade))
        .route(
            "/v1/trades/:id/close/:tx_id",
            axum::routing::delete(trades::undo_close),
        )
        .route(
            "/v1/holdings/:key",
            put(holdings::update_holding).delete(holdings::delete_holding),
        )
        .route("/v1/summary", get(summary::get_summary))
        .route("/v1/payoff", post(payoff::analyze_payoff))
        .route("/v1/export", get(portfolio::export_document))
        .route("/v1/import", post(portfolio::import_document))
        .route("/v1/brokers", post(portfolio::add_broker))
        .route(
            "/v1/brokers/:name",
            axum::routing::delete(portfolio::remove_broker),
        )
        .route("/v1/profiles", get(profiles::list_profiles))
        .route(
            "/v1/profiles/:id",
            put(profiles::upsert_profile).delete(profiles::delete_profile),
        )
        .route("/v1/ocr/extract", post(ocr::extract))
        .route("/v1/ocr/commit", post(ocr::commit))
        .route("/v1/market/sync", post(market::sync))
        .route("/v1/risk", get(risk::get_risk))
        .layer(cors)
        .with_state(state)
}
