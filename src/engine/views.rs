//! Read-only open-position views: filtering, sorting, and the merged
//! per-contract display rows.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Broker, Decimal, Lot, PositionKind, Ticker};
use crate::engine::Portfolio;
use chrono::NaiveDate;

/// Filter over open option lots. Ticker matches as a case-insensitive
/// substring; broker must match exactly, and filtering on a broker excludes
/// default-account lots.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OpenPositionFilter {
    #[serde(default)]
    pub ticker: Option<String>,
    #[serde(default)]
    pub broker: Option<String>,
}

impl OpenPositionFilter {
    fn accepts(&self, lot: &Lot) -> bool {
        if let Some(needle) = &self.ticker {
            if !lot.symbol.contains(needle) {
                return false;
            }
        }
        if let Some(wanted) = &self.broker {
            match &lot.broker {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PositionSort {
    Ticker,
    Expiry,
    Quantity,
    Price,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl Default for PositionSort {
    fn default() -> Self {
        PositionSort::Ticker
    }
}

impl Default for SortDirection {
    fn default() -> Self {
        SortDirection::Asc
    }
}

/// Open option lots passing the filter, sorted. Lots without an expiry sort
/// last under the expiry key.
pub fn open_option_lots<'a>(
    portfolio: &'a Portfolio,
    filter: &OpenPositionFilter,
    sort: PositionSort,
    direction: SortDirection,
) -> Vec<&'a Lot> {
    let mut lots: Vec<&Lot> = portfolio
        .trades()
        .iter()
        .filter(|l| l.is_open() && l.kind.is_option() && filter.accepts(l))
        .collect();
    lots.sort_by(|a, b| {
        let ordering = match sort {
            PositionSort::Ticker => a.symbol.cmp(&b.symbol),
            PositionSort::Expiry => match (a.expiry_date, b.expiry_date) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            },
            PositionSort::Quantity => a.remaining_quantity.cmp(&b.remaining_quantity),
            PositionSort::Price => a.open_price.cmp(&b.open_price),
        };
        let ordering = ordering.then_with(|| a.id.cmp(&b.id));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    lots
}

/// One merged display row: every open lot of the same contract collapsed into
/// a single line with a quantity-weighted average open price.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergedOptionRow {
    pub kind: PositionKind,
    pub symbol: Ticker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker: Option<Broker>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_price: Option<Decimal>,
    pub remaining_quantity: i64,
    pub avg_open_price: Decimal,
    pub lot_count: usize,
}

/// Collapse open option lots by (kind, symbol, expiry, strike, broker).
pub fn merged_rows(portfolio: &Portfolio, filter: &OpenPositionFilter) -> Vec<MergedOptionRow> {
    type Key = (
        PositionKind,
        Ticker,
        Option<NaiveDate>,
        Option<Decimal>,
        Option<Broker>,
    );
    let mut groups: BTreeMap<Key, (i64, Decimal, usize)> = BTreeMap::new();
    for lot in portfolio.trades() {
        if !lot.is_open() || !lot.kind.is_option() || !filter.accepts(lot) {
            continue;
        }
        let key = (
            lot.kind,
            lot.symbol.clone(),
            lot.expiry_date,
            lot.strike_price,
            lot.broker.clone(),
        );
        let entry = groups.entry(key).or_insert((0, Decimal::zero(), 0));
        entry.0 += lot.remaining_quantity;
        entry.1 = entry.1 + lot.open_price * Decimal::from(lot.remaining_quantity);
        entry.2 += 1;
    }
    groups
        .into_iter()
        .map(|((kind, symbol, expiry_date, strike_price, broker), (qty, cost, lots))| {
            let avg = if qty > 0 {
                cost / Decimal::from(qty)
            } else {
                Decimal::zero()
            };
            MergedOptionRow {
                kind,
                symbol,
                broker,
                expiry_date,
                strike_price,
                remaining_quantity: qty,
                avg_open_price: avg,
                lot_count: lots,
            }
        })
        .collect()
}
