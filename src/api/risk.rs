use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;
use tracing::warn;

use super::{AppState, ProfileQuery};
use crate::engine::{exposure, ExposureSummary};
use crate::error::AppError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskResponse {
    pub exposure: ExposureSummary,
    /// Narrative from the AI collaborator; absent when the call fails. The
    /// numbers above are computed locally and always present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<String>,
}

pub async fn get_risk(
    Query(profile): Query<ProfileQuery>,
    State(state): State<AppState>,
) -> Result<Json<RiskResponse>, AppError> {
    let profile = state.profile_id(&profile);
    let portfolio = state.load_portfolio(&profile).await?;
    let exposure = exposure::exposure(&portfolio);

    let description = describe(&exposure);
    let analysis = match state.ai.analyze(&description).await {
        Ok(text) => Some(text),
        Err(e) => {
            warn!("analysis call failed: {}", e);
            None
        }
    };

    Ok(Json(RiskResponse { exposure, analysis }))
}

fn describe(exposure: &ExposureSummary) -> String {
    let mut lines = Vec::with_capacity(exposure.by_ticker.len() + 1);
    for (ticker, entry) in &exposure.by_ticker {
        lines.push(format!(
            "{}: option nominal {}, stock cost {} ({} shares, {} open lots)",
            ticker,
            entry.option_nominal,
            entry.stock_cost,
            entry.stock_shares,
            entry.open_lots
        ));
    }
    lines.push(format!("Total nominal exposure: {}", exposure.total_nominal));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Decimal, Ticker};
    use crate::engine::TickerExposure;

    #[test]
    fn test_describe_lists_each_ticker_and_total() {
        let mut summary = ExposureSummary::default();
        summary.by_ticker.insert(
            Ticker::new("MARA"),
            TickerExposure {
                option_nominal: Decimal::parse("1900").unwrap(),
                stock_cost: Decimal::zero(),
                open_lots: 1,
                stock_shares: 0,
            },
        );
        summary.total_nominal = Decimal::parse("1900").unwrap();

        let text = describe(&summary);
        assert!(text.contains("MARA"));
        assert!(text.contains("Total nominal exposure: 1900"));
    }
}
