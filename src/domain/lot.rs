//! Trade lots and their close-transaction history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{Broker, Decimal, LotId, PositionKind, Ticker, TxId};

/// Open/closed status, kept denormalized next to `remaining_quantity`.
///
/// Invariant: `Closed` iff `remaining_quantity == 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LotStatus {
    Open,
    Closed,
}

/// One partial or full close applied to a lot.
///
/// Profit is computed once when the close happens and stored; it is never
/// recomputed, so later corrections to the lot leave history untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseTransaction {
    pub tx_id: TxId,
    pub date: NaiveDate,
    pub price: Decimal,
    pub quantity: i64,
    pub profit: Decimal,
}

/// One itemized trade record with an independent open/close lifecycle.
///
/// Options and short stock stay itemized as lots; long stock additionally
/// accumulates into the weighted-average holding map.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lot {
    pub id: LotId,
    pub kind: PositionKind,
    pub symbol: Ticker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker: Option<Broker>,
    pub open_date: NaiveDate,
    pub open_price: Decimal,
    pub total_quantity: i64,
    pub remaining_quantity: i64,
    pub status: LotStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strike_price: Option<Decimal>,
    #[serde(default)]
    pub close_transactions: Vec<CloseTransaction>,
}

impl Lot {
    pub fn is_open(&self) -> bool {
        self.status == LotStatus::Open && self.remaining_quantity > 0
    }

    /// Quantity closed so far. By construction this equals the sum of the
    /// close transactions' quantities.
    pub fn closed_quantity(&self) -> i64 {
        self.total_quantity - self.remaining_quantity
    }
}

/// Input shape for opening a lot, shared by manual entry and OCR import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotDraft {
    pub kind: PositionKind,
    pub symbol: String,
    #[serde(default)]
    pub broker: Option<String>,
    pub open_date: NaiveDate,
    pub open_price: Decimal,
    pub total_quantity: i64,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub strike_price: Option<Decimal>,
}

/// Field-level patch applied by the modify (correction) operation.
///
/// Setting `total_quantity` resets remaining quantity to the same value; the
/// operation is meant for fixing data-entry mistakes before any closes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LotPatch {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub broker: Option<String>,
    #[serde(default)]
    pub open_price: Option<Decimal>,
    #[serde(default)]
    pub total_quantity: Option<i64>,
    #[serde(default)]
    pub strike_price: Option<Decimal>,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub open_date: Option<NaiveDate>,
}
