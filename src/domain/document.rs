//! Boundary shapes: the persisted portfolio document, OCR import candidates,
//! and parsed market data.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{Decimal, HoldingKey, Lot, PositionKind, StockHolding};

/// The unit of persistence and export: everything one profile owns.
///
/// Stored as an opaque JSON blob keyed by profile id; profiles never share
/// lot identities or holding keys.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioDocument {
    pub trades: Vec<Lot>,
    pub stock_portfolio: BTreeMap<HoldingKey, StockHolding>,
    #[serde(default)]
    pub brokers: Vec<String>,
}

/// How confident the OCR extraction is about a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrConfidence {
    High,
    Medium,
    Low,
}

/// A trade candidate produced by the OCR collaborator. Untrusted: import
/// validates it exactly like manual entry and discards ticker-less entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrTradeCandidate {
    pub stock_name: String,
    pub kind: PositionKind,
    pub open_price: Decimal,
    pub total_quantity: i64,
    #[serde(default)]
    pub expiry_date: Option<NaiveDate>,
    #[serde(default)]
    pub strike_price: Option<Decimal>,
    #[serde(default)]
    pub broker: String,
    pub open_date: NaiveDate,
    pub confidence: OcrConfidence,
    /// Dedupe key over the raw extracted fields.
    pub fingerprint: String,
    #[serde(default)]
    pub raw_text: String,
}

impl OcrTradeCandidate {
    /// Stable fingerprint so re-running OCR over the same screenshot does not
    /// double-import: sha256 over the extracted fields, hex-truncated.
    pub fn compute_fingerprint(
        ticker: &str,
        kind: PositionKind,
        price: Decimal,
        quantity: i64,
        raw_text: &str,
    ) -> String {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(ticker.as_bytes());
        hasher.update(kind.to_string().as_bytes());
        hasher.update(price.to_canonical_string().as_bytes());
        hasher.update(quantity.to_le_bytes());
        hasher.update(raw_text.as_bytes());
        let hash = hasher.finalize();
        hex::encode(&hash[..16])
    }
}

/// One quote parsed out of the market collaborator's free-text reply.
/// Only `price` feeds the display cache; the rest is informational.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketData {
    pub price: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Parsed quotes keyed by the identifier string they were requested under.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketUpdate {
    pub prices: BTreeMap<String, MarketData>,
}

impl MarketUpdate {
    /// Merge newer quotes over the existing cache, keeping entries the new
    /// update did not mention.
    pub fn merge_from(&mut self, newer: MarketUpdate) {
        for (identifier, data) in newer.prices {
            self.prices.insert(identifier, data);
        }
    }
}
