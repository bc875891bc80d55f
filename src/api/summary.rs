use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use super::AppState;
use crate::engine::{summary, SummaryFilter, SummaryReport, Timescale};
use crate::error::AppError;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryQuery {
    pub profile: Option<String>,
    #[serde(default)]
    pub timescale: Option<Timescale>,
    pub ticker: Option<String>,
    pub broker: Option<String>,
}

pub async fn get_summary(
    Query(params): Query<SummaryQuery>,
    State(state): State<AppState>,
) -> Result<Json<SummaryReport>, AppError> {
    let profile = state.profile_id(&super::ProfileQuery {
        profile: params.profile.clone(),
    });
    let portfolio = state.load_portfolio(&profile).await?;

    let filter = SummaryFilter {
        ticker: params.ticker.clone(),
        broker: params.broker.clone(),
    };
    let timescale = params.timescale.unwrap_or(Timescale::Month);

    Ok(Json(summary::summarize(&portfolio, &filter, timescale)))
}
