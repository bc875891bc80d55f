pub mod api;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;

pub use config::Config;
pub use datasource::{AiEngine, AiEngineError, ChatAiEngine, MockAiEngine};
pub use db::{init_db, ProfileRecord, Repository};
pub use domain::{
    Broker, Decimal, HoldingKey, Lot, LotDraft, LotId, PortfolioDocument, PositionKind,
    StockHolding, Ticker, TxId,
};
pub use engine::{LedgerError, Portfolio};
pub use error::AppError;
