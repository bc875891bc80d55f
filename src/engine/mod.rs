//! Pure computation core: the portfolio ledger and everything derived from it.
//!
//! Nothing in this module performs I/O. Every mutating operation either
//! applies fully or leaves the ledger untouched.

use thiserror::Error;

pub mod exposure;
pub mod matcher;
pub mod payoff;
pub mod portfolio;
pub mod summary;
pub mod views;

pub use exposure::{ExposureSummary, TickerExposure};
pub use matcher::{CombinationSet, Leg, MatchedPair, UnhedgedLeg};
pub use payoff::{PayoffAnalysis, PayoffPoint, PutLeg, SpreadStrategy};
pub use portfolio::{CloseRequest, ImportReport, Portfolio};
pub use summary::{
    PeriodSummary, SummaryFilter, SummaryMetrics, SummaryReport, Timescale, TradeSummary,
};
pub use views::{MergedOptionRow, OpenPositionFilter, PositionSort, SortDirection};

/// Errors surfaced by ledger operations. Rejected operations never leave
/// partial state behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("insufficient quantity: requested {requested}, remaining {remaining}")]
    InsufficientQuantity { requested: i64, remaining: i64 },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("malformed portfolio document: {0}")]
    Format(String),
}
