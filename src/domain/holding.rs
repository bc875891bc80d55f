//! Weighted-average stock holdings and their composite storage key.

use serde::{Deserialize, Serialize};

use crate::domain::{Broker, Decimal, Ticker};

/// Rolling weighted-average position for one (ticker, broker) pair.
///
/// Unlike lots, long stock is not itemized: buys fold into `quantity` and
/// `total_cost`, and reductions at average cost leave the average unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockHolding {
    pub quantity: i64,
    pub total_cost: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub broker: Option<Broker>,
}

impl StockHolding {
    pub fn empty(broker: Option<Broker>) -> Self {
        StockHolding {
            quantity: 0,
            total_cost: Decimal::zero(),
            broker,
        }
    }

    /// Average cost per share. None when the holding is empty.
    pub fn average_cost(&self) -> Option<Decimal> {
        if self.quantity <= 0 {
            None
        } else {
            Some(self.total_cost / Decimal::from(self.quantity))
        }
    }
}

/// Storage key for a holding: `TICKER` or `TICKER(BROKER)`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HoldingKey(String);

impl HoldingKey {
    pub fn new(ticker: &Ticker, broker: Option<&Broker>) -> Self {
        match broker {
            Some(b) => HoldingKey(format!("{}({})", ticker, b)),
            None => HoldingKey(ticker.as_str().to_string()),
        }
    }

    pub fn from_raw(raw: &str) -> Self {
        HoldingKey(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Split back into (ticker, broker). The broker is the parenthesized
    /// suffix when present; re-encoding the parts reproduces the key.
    pub fn decode(&self) -> (Ticker, Option<Broker>) {
        if let Some(open) = self.0.find('(') {
            if self.0.ends_with(')') {
                let ticker = Ticker::new(&self.0[..open]);
                let broker = Broker::new(&self.0[open + 1..self.0.len() - 1]);
                return (ticker, broker);
            }
        }
        (Ticker::new(&self.0), None)
    }
}

impl std::fmt::Display for HoldingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
