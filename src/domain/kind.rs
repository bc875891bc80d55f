//! Position kinds as a closed enumeration.
//!
//! The kind carries its own metadata (option vs stock, direction, contract
//! multiplier) so business logic never infers behavior from label strings.

use serde::{Deserialize, Serialize};

use crate::domain::Decimal;

/// The six supported position kinds. The serialized labels are the exact
/// strings used in persisted and exported documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum PositionKind {
    #[serde(rename = "Buy Stock")]
    LongStock,
    #[serde(rename = "Sell Stock")]
    ShortStock,
    #[serde(rename = "Short Put")]
    ShortPut,
    #[serde(rename = "Short Call")]
    ShortCall,
    #[serde(rename = "Long Put")]
    LongPut,
    #[serde(rename = "Long Call")]
    LongCall,
}

impl PositionKind {
    /// True for the four option kinds.
    pub fn is_option(&self) -> bool {
        matches!(
            self,
            PositionKind::ShortPut
                | PositionKind::ShortCall
                | PositionKind::LongPut
                | PositionKind::LongCall
        )
    }

    /// True for long positions (profit when price rises, for calls/stock).
    pub fn is_long(&self) -> bool {
        matches!(
            self,
            PositionKind::LongStock | PositionKind::LongPut | PositionKind::LongCall
        )
    }

    pub fn is_put(&self) -> bool {
        matches!(self, PositionKind::ShortPut | PositionKind::LongPut)
    }

    /// Units of underlying controlled per contract: 100 for options, 1 for stock.
    pub fn contract_multiplier(&self) -> i64 {
        if self.is_option() {
            100
        } else {
            1
        }
    }

    /// Realized profit for closing `quantity` units opened at `open_price`
    /// and closed at `close_price`.
    pub fn close_profit(&self, open_price: Decimal, close_price: Decimal, quantity: i64) -> Decimal {
        let per_unit = if self.is_long() {
            close_price - open_price
        } else {
            open_price - close_price
        };
        per_unit * Decimal::from(self.contract_multiplier()) * Decimal::from(quantity)
    }
}

impl std::fmt::Display for PositionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PositionKind::LongStock => "Buy Stock",
            PositionKind::ShortStock => "Sell Stock",
            PositionKind::ShortPut => "Short Put",
            PositionKind::ShortCall => "Short Call",
            PositionKind::LongPut => "Long Put",
            PositionKind::LongCall => "Long Call",
        };
        write!(f, "{}", label)
    }
}
