//! Periodic P&L aggregation over realized close transactions.
//!
//! Each close transaction is flattened into a row carrying its parent lot's
//! context, filtered, bucketed by week, month, or year, and rolled up.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::domain::{Broker, Decimal, PositionKind, Ticker, TxId};
use crate::engine::Portfolio;

/// Aggregation bucket width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timescale {
    Week,
    Month,
    Year,
}

impl Timescale {
    /// Bucket key for a close date. Weeks start on Monday, so a Sunday close
    /// lands in the week of the preceding Monday.
    pub fn bucket_key(&self, date: NaiveDate) -> String {
        match self {
            Timescale::Year => format!("{:04}", date.year()),
            Timescale::Month => format!("{:04}-{:02}", date.year(), date.month()),
            Timescale::Week => {
                let back = date.weekday().num_days_from_monday() as u64;
                let monday = date - Days::new(back);
                monday.format("%Y-%m-%d").to_string()
            }
        }
    }
}

/// One realized close, flattened with its parent lot's identity.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TradeSummary {
    pub tx_id: TxId,
    pub symbol: Ticker,
    pub kind: PositionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker: Option<Broker>,
    pub open_date: NaiveDate,
    pub open_price: Decimal,
    pub close_date: NaiveDate,
    pub close_price: Decimal,
    pub quantity: i64,
    pub profit: Decimal,
}

/// Row filter applied before bucketing. Ticker matches as a case-insensitive
/// substring; broker must match exactly.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SummaryFilter {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub broker: Option<String>,
}

impl SummaryFilter {
    fn accepts(&self, row: &TradeSummary) -> bool {
        if let Some(needle) = &self.ticker {
            if !row.symbol.contains(needle) {
                return false;
            }
        }
        if let Some(wanted) = &self.broker {
            match &row.broker {
                Some(b) => {
                    if b.as_str() != wanted {
                        return false;
                    }
                }
                None => return false,
            }
        }
        true
    }
}

/// Rollup for one bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub key: String,
    pub total_profit: Decimal,
    pub trade_count: usize,
    pub winners: usize,
    pub win_rate: Decimal,
}

/// Rollup across every row that passed the filter. Zero-profit closes count
/// as neither winners nor losers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryMetrics {
    pub total_profit: Decimal,
    pub trade_count: usize,
    pub winners: usize,
    pub losers: usize,
    pub win_rate: Decimal,
    pub avg_profit: Decimal,
    pub max_abs_profit: Decimal,
}

impl SummaryMetrics {
    fn from_rows(rows: &[TradeSummary]) -> Self {
        let total_profit: Decimal = rows.iter().map(|r| r.profit).sum();
        let winners = rows.iter().filter(|r| r.profit.is_positive()).count();
        let losers = rows.iter().filter(|r| r.profit.is_negative()).count();
        let count = rows.len();
        let (win_rate, avg_profit) = if count == 0 {
            (Decimal::zero(), Decimal::zero())
        } else {
            let n = Decimal::from(count as i64);
            (
                Decimal::from(winners as i64) * Decimal::hundred() / n,
                total_profit / n,
            )
        };
        let max_abs_profit = rows
            .iter()
            .map(|r| r.profit.abs())
            .fold(Decimal::zero(), |acc, p| acc.max(p));
        SummaryMetrics {
            total_profit,
            trade_count: count,
            winners,
            losers,
            win_rate,
            avg_profit,
            max_abs_profit,
        }
    }
}

/// Full aggregation result for one filter and timescale.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryReport {
    pub timescale: Timescale,
    pub periods: Vec<PeriodSummary>,
    pub metrics: SummaryMetrics,
    pub rows: Vec<TradeSummary>,
}

/// Flatten every close transaction into a row, newest close first.
pub fn realized_rows(portfolio: &Portfolio, filter: &SummaryFilter) -> Vec<TradeSummary> {
    let mut rows: Vec<TradeSummary> = portfolio
        .trades()
        .iter()
        .flat_map(|lot| {
            lot.close_transactions.iter().map(|tx| TradeSummary {
                tx_id: tx.tx_id,
                symbol: lot.symbol.clone(),
                kind: lot.kind,
                broker: lot.broker.clone(),
                open_date: lot.open_date,
                open_price: lot.open_price,
                close_date: tx.date,
                close_price: tx.price,
                quantity: tx.quantity,
                profit: tx.profit,
            })
        })
        .filter(|row| filter.accepts(row))
        .collect();
    rows.sort_by(|a, b| b.close_date.cmp(&a.close_date).then(a.tx_id.cmp(&b.tx_id)));
    rows
}

/// Bucket filtered rows by timescale and roll up. Periods come back sorted by
/// key descending, so the most recent bucket is first.
pub fn summarize(
    portfolio: &Portfolio,
    filter: &SummaryFilter,
    timescale: Timescale,
) -> SummaryReport {
    let rows = realized_rows(portfolio, filter);

    let mut buckets: BTreeMap<String, (Decimal, usize, usize)> = BTreeMap::new();
    for row in &rows {
        let key = timescale.bucket_key(row.close_date);
        let entry = buckets.entry(key).or_insert((Decimal::zero(), 0, 0));
        entry.0 = entry.0 + row.profit;
        entry.1 += 1;
        if row.profit.is_positive() {
            entry.2 += 1;
        }
    }
    let periods = buckets
        .into_iter()
        .rev()
        .map(|(key, (total_profit, trade_count, winners))| PeriodSummary {
            key,
            total_profit,
            trade_count,
            winners,
            // Buckets only exist for rows, so trade_count >= 1 here.
            win_rate: Decimal::from(winners as i64) * Decimal::hundred()
                / Decimal::from(trade_count as i64),
        })
        .collect();

    SummaryReport {
        timescale,
        metrics: SummaryMetrics::from_rows(&rows),
        periods,
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LotDraft;
    use crate::engine::CloseRequest;

    fn dec(s: &str) -> Decimal {
        Decimal::parse(s).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn closed_lot(
        p: &mut Portfolio,
        symbol: &str,
        broker: Option<&str>,
        open_price: &str,
        close_price: &str,
        qty: i64,
        close_date: NaiveDate,
    ) {
        let id = p
            .open_lot(LotDraft {
                kind: PositionKind::ShortPut,
                symbol: symbol.to_string(),
                broker: broker.map(|b| b.to_string()),
                open_date: date(2026, 1, 2),
                open_price: dec(open_price),
                total_quantity: qty,
                expiry_date: Some(date(2026, 6, 19)),
                strike_price: Some(dec("100")),
            })
            .unwrap()
            .id;
        p.close_lot(
            id,
            CloseRequest {
                price: dec(close_price),
                quantity: qty,
                date: close_date,
            },
        )
        .unwrap();
    }

    #[test]
    fn test_week_key_is_monday_and_sunday_rolls_back() {
        // 2026-03-02 is a Monday, 2026-03-08 the following Sunday.
        let monday = date(2026, 3, 2);
        let sunday = date(2026, 3, 8);
        let next_monday = date(2026, 3, 9);
        assert_eq!(Timescale::Week.bucket_key(monday), "2026-03-02");
        assert_eq!(Timescale::Week.bucket_key(sunday), "2026-03-02");
        assert_eq!(Timescale::Week.bucket_key(next_monday), "2026-03-09");
    }

    #[test]
    fn test_month_and_year_keys() {
        let d = date(2026, 3, 8);
        assert_eq!(Timescale::Month.bucket_key(d), "2026-03");
        assert_eq!(Timescale::Year.bucket_key(d), "2026");
    }

    #[test]
    fn test_rows_flatten_with_parent_context() {
        let mut p = Portfolio::new();
        closed_lot(&mut p, "MARA", Some("IBKR"), "0.59", "0.10", 2, date(2026, 1, 10));

        let rows = realized_rows(&p, &SummaryFilter::default());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].symbol.as_str(), "MARA");
        assert_eq!(rows[0].open_price, dec("0.59"));
        assert_eq!(rows[0].close_price, dec("0.10"));
        // Short put closed below open: (0.59 - 0.10) * 100 * 2.
        assert_eq!(rows[0].profit, dec("98"));
    }

    #[test]
    fn test_ticker_filter_is_substring_and_broker_exact() {
        let mut p = Portfolio::new();
        closed_lot(&mut p, "MARA", Some("IBKR"), "1", "0.5", 1, date(2026, 1, 10));
        closed_lot(&mut p, "AAPL", Some("Schwab"), "2", "1", 1, date(2026, 1, 11));
        closed_lot(&mut p, "MSTR", None, "3", "2", 1, date(2026, 1, 12));

        let by_ticker = realized_rows(
            &p,
            &SummaryFilter {
                ticker: Some("ma".to_string()),
                broker: None,
            },
        );
        assert_eq!(by_ticker.len(), 1);
        assert_eq!(by_ticker[0].symbol.as_str(), "MARA");

        let by_broker = realized_rows(
            &p,
            &SummaryFilter {
                ticker: None,
                broker: Some("IBKR".to_string()),
            },
        );
        assert_eq!(by_broker.len(), 1);

        // A broker filter never matches the default account.
        let default_excluded = realized_rows(
            &p,
            &SummaryFilter {
                ticker: Some("MSTR".to_string()),
                broker: Some("IBKR".to_string()),
            },
        );
        assert!(default_excluded.is_empty());
    }

    #[test]
    fn test_periods_sorted_key_descending() {
        let mut p = Portfolio::new();
        closed_lot(&mut p, "A", None, "2", "1", 1, date(2026, 1, 10));
        closed_lot(&mut p, "B", None, "2", "1", 1, date(2026, 3, 10));
        closed_lot(&mut p, "C", None, "2", "1", 1, date(2026, 2, 10));

        let report = summarize(&p, &SummaryFilter::default(), Timescale::Month);
        let keys: Vec<&str> = report.periods.iter().map(|pd| pd.key.as_str()).collect();
        assert_eq!(keys, vec!["2026-03", "2026-02", "2026-01"]);
    }

    #[test]
    fn test_period_win_rate() {
        let mut p = Portfolio::new();
        // Same month: one winner, one loser.
        closed_lot(&mut p, "A", None, "2", "1", 1, date(2026, 1, 5));
        closed_lot(&mut p, "B", None, "1", "2", 1, date(2026, 1, 6));
        // Next month: a single winner.
        closed_lot(&mut p, "C", None, "3", "1", 1, date(2026, 2, 3));

        let report = summarize(&p, &SummaryFilter::default(), Timescale::Month);
        assert_eq!(report.periods[0].key, "2026-02");
        assert_eq!(report.periods[0].win_rate, dec("100"));
        assert_eq!(report.periods[1].key, "2026-01");
        assert_eq!(report.periods[1].win_rate, dec("50"));
    }

    #[test]
    fn test_metrics_winners_losers_and_rates() {
        let mut p = Portfolio::new();
        // Short puts: profit = (open - close) * 100 * qty.
        closed_lot(&mut p, "A", None, "2", "1", 1, date(2026, 1, 5)); // +100
        closed_lot(&mut p, "B", None, "1", "2", 1, date(2026, 1, 6)); // -100
        closed_lot(&mut p, "C", None, "1", "1", 1, date(2026, 1, 7)); // 0
        closed_lot(&mut p, "D", None, "4", "1", 1, date(2026, 1, 8)); // +300

        let report = summarize(&p, &SummaryFilter::default(), Timescale::Year);
        let m = &report.metrics;
        assert_eq!(m.trade_count, 4);
        assert_eq!(m.winners, 2);
        assert_eq!(m.losers, 1);
        assert_eq!(m.total_profit, dec("300"));
        assert_eq!(m.win_rate, dec("50"));
        assert_eq!(m.avg_profit, dec("75"));
        assert_eq!(m.max_abs_profit, dec("300"));
    }

    #[test]
    fn test_metrics_zero_on_empty() {
        let p = Portfolio::new();
        let report = summarize(&p, &SummaryFilter::default(), Timescale::Week);
        assert_eq!(report.metrics.trade_count, 0);
        assert_eq!(report.metrics.win_rate, Decimal::zero());
        assert_eq!(report.metrics.avg_profit, Decimal::zero());
        assert_eq!(report.metrics.max_abs_profit, Decimal::zero());
        assert!(report.periods.is_empty());
    }
}
