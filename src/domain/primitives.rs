//! Domain primitives: Ticker, Broker, LotId, TxId.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Normalized uppercase ticker symbol (e.g., "AAPL", "MARA").
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Create a Ticker, normalizing to uppercase and trimming whitespace.
    pub fn new(symbol: &str) -> Self {
        Ticker(symbol.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Substring match used by the ticker filter inputs.
    pub fn contains(&self, needle: &str) -> bool {
        self.0.contains(&needle.trim().to_uppercase())
    }
}

impl std::fmt::Display for Ticker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Broker/account label. Lots with no broker belong to the default account.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Broker(String);

impl Broker {
    /// Create a Broker label. Returns None for empty/blank input so the
    /// default account is always represented as absence.
    pub fn new(label: &str) -> Option<Self> {
        let trimmed = label.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Broker(trimmed.to_string()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Broker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of a trade lot for its whole lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct LotId(Uuid);

impl LotId {
    pub fn generate() -> Self {
        LotId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl std::fmt::Display for LotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for LotId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(LotId)
    }
}

/// Identity of a close transaction, unique within its parent lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxId(Uuid);

impl TxId {
    pub fn generate() -> Self {
        TxId(Uuid::new_v4())
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TxId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(TxId)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_ticker_normalization() {
        let t = Ticker::new("  aapl ");
        assert_eq!(t.as_str(), "AAPL");
    }

    #[test]
    fn test_ticker_substring_filter() {
        let t = Ticker::new("MARA");
        assert!(t.contains("mar"));
        assert!(t.contains(""));
        assert!(!t.contains("AAPL"));
    }

    #[test]
    fn test_broker_blank_is_default_account() {
        assert_eq!(Broker::new("   "), None);
        assert_eq!(Broker::new("IBKR").unwrap().as_str(), "IBKR");
    }

    #[test]
    fn test_lot_id_roundtrip() {
        let id = LotId::generate();
        let parsed = LotId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_lot_ids_unique() {
        assert_ne!(LotId::generate(), LotId::generate());
    }
}
