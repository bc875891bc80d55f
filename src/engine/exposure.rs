//! Per-ticker nominal exposure, the input handed to the analysis
//! collaborator and the risk endpoint.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::{Decimal, Ticker};
use crate::engine::Portfolio;

/// Exposure attributed to one ticker across lots and stock holdings.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TickerExposure {
    pub option_nominal: Decimal,
    pub stock_cost: Decimal,
    pub open_lots: usize,
    pub stock_shares: i64,
}

impl TickerExposure {
    pub fn total(&self) -> Decimal {
        self.option_nominal + self.stock_cost
    }
}

/// Aggregate exposure over the whole portfolio.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExposureSummary {
    pub by_ticker: BTreeMap<Ticker, TickerExposure>,
    pub total_nominal: Decimal,
}

/// Nominal exposure per open lot is (strike, or open price when there is no
/// strike) x 100 x remaining quantity; holdings contribute their cost basis.
pub fn exposure(portfolio: &Portfolio) -> ExposureSummary {
    let mut by_ticker: BTreeMap<Ticker, TickerExposure> = BTreeMap::new();

    for lot in portfolio.trades() {
        if !lot.is_open() || !lot.kind.is_option() {
            continue;
        }
        let reference = lot.strike_price.unwrap_or(lot.open_price);
        let nominal =
            reference * Decimal::hundred() * Decimal::from(lot.remaining_quantity);
        let entry = by_ticker.entry(lot.symbol.clone()).or_default();
        entry.option_nominal = entry.option_nominal + nominal;
        entry.open_lots += 1;
    }

    for (key, holding) in portfolio.holdings() {
        let (ticker, _) = key.decode();
        let entry = by_ticker.entry(ticker).or_default();
        entry.stock_cost = entry.stock_cost + holding.total_cost;
        entry.stock_shares += holding.quantity;
    }

    let total_nominal = by_ticker.values().map(|e| e.total()).sum();
    ExposureSummary {
        by_ticker,
        total_nominal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LotDraft, PositionKind};
    use chrono::NaiveDate;

    fn dec(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_option_nominal_uses_strike_times_contract_size() {
        let mut p = Portfolio::new();
        p.open_lot(LotDraft {
            kind: PositionKind::ShortPut,
            symbol: "MARA".to_string(),
            broker: None,
            open_date: date(2026, 1, 2),
            open_price: dec("0.59"),
            total_quantity: 2,
            expiry_date: Some(date(2026, 1, 16)),
            strike_price: Some(dec("9.5")),
        })
        .unwrap();

        let summary = exposure(&p);
        let mara = &summary.by_ticker[&crate::domain::Ticker::new("MARA")];
        // 9.5 * 100 * 2
        assert_eq!(mara.option_nominal, dec("1900"));
        assert_eq!(summary.total_nominal, dec("1900"));
    }

    #[test]
    fn test_holdings_contribute_cost_basis_under_the_same_ticker() {
        let mut p = Portfolio::new();
        p.open_lot(LotDraft {
            kind: PositionKind::LongStock,
            symbol: "AAPL".to_string(),
            broker: None,
            open_date: date(2026, 1, 2),
            open_price: dec("150"),
            total_quantity: 100,
            expiry_date: None,
            strike_price: None,
        })
        .unwrap();
        p.open_lot(LotDraft {
            kind: PositionKind::LongPut,
            symbol: "AAPL".to_string(),
            broker: None,
            open_date: date(2026, 1, 2),
            open_price: dec("3.2"),
            total_quantity: 1,
            expiry_date: Some(date(2026, 1, 16)),
            strike_price: Some(dec("170")),
        })
        .unwrap();

        let summary = exposure(&p);
        let aapl = &summary.by_ticker[&crate::domain::Ticker::new("AAPL")];
        assert_eq!(aapl.stock_cost, dec("15000"));
        assert_eq!(aapl.stock_shares, 100);
        assert_eq!(aapl.option_nominal, dec("17000"));
        assert_eq!(summary.total_nominal, dec("32000"));
    }

    #[test]
    fn test_empty_portfolio_is_zero() {
        let summary = exposure(&Portfolio::new());
        assert!(summary.by_ticker.is_empty());
        assert_eq!(summary.total_nominal, Decimal::zero());
    }
}
