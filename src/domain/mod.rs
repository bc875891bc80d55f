//! Domain types for the portfolio ledger.
//!
//! This module provides:
//! - Exact numeric handling via the Decimal wrapper
//! - Primitives: Ticker, Broker, LotId, TxId
//! - PositionKind with metadata resolved at construction
//! - Lot / CloseTransaction records and the weighted-average StockHolding
//! - Boundary shapes: PortfolioDocument, OcrTradeCandidate, MarketUpdate

pub mod decimal;
pub mod document;
pub mod holding;
pub mod kind;
pub mod lot;
pub mod primitives;

pub use decimal::Decimal;
pub use document::{MarketData, MarketUpdate, OcrConfidence, OcrTradeCandidate, PortfolioDocument};
pub use holding::{HoldingKey, StockHolding};
pub use kind::PositionKind;
pub use lot::{CloseTransaction, Lot, LotDraft, LotPatch, LotStatus};
pub use primitives::{Broker, LotId, Ticker, TxId};
