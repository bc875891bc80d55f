//! The portfolio ledger: lots, stock holdings, and the close/modify engine.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::{
    Broker, CloseTransaction, Decimal, HoldingKey, Lot, LotDraft, LotId, LotPatch, LotStatus,
    OcrTradeCandidate, PortfolioDocument, PositionKind, StockHolding, Ticker, TxId,
};
use crate::engine::LedgerError;

/// Parameters for closing part or all of a lot.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CloseRequest {
    pub price: Decimal,
    pub quantity: i64,
    pub date: NaiveDate,
}

/// Outcome of a sequential OCR batch import. A failing candidate never
/// aborts the rest of the batch or rolls back earlier ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportReport {
    pub imported: Vec<LotId>,
    pub skipped_missing_ticker: usize,
    pub failures: Vec<String>,
}

/// One profile's canonical ledger state. Owned exclusively by the session
/// handling the profile; switching profiles swaps the whole instance.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Portfolio {
    trades: Vec<Lot>,
    stock_portfolio: BTreeMap<HoldingKey, StockHolding>,
    brokers: Vec<String>,
}

impl Portfolio {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_document(doc: PortfolioDocument) -> Self {
        Portfolio {
            trades: doc.trades,
            stock_portfolio: doc.stock_portfolio,
            brokers: doc.brokers,
        }
    }

    pub fn to_document(&self) -> PortfolioDocument {
        PortfolioDocument {
            trades: self.trades.clone(),
            stock_portfolio: self.stock_portfolio.clone(),
            brokers: self.brokers.clone(),
        }
    }

    /// Validate an incoming export blob before replacing any state.
    ///
    /// # Errors
    /// `Format` when `trades` or `stockPortfolio` is missing or the shapes do
    /// not deserialize. Nothing is applied on failure.
    pub fn parse_document(value: &serde_json::Value) -> Result<PortfolioDocument, LedgerError> {
        let obj = value
            .as_object()
            .ok_or_else(|| LedgerError::Format("document must be a JSON object".to_string()))?;
        for required in ["trades", "stockPortfolio"] {
            if !obj.contains_key(required) {
                return Err(LedgerError::Format(format!(
                    "missing required key: {}",
                    required
                )));
            }
        }
        serde_json::from_value(value.clone()).map_err(|e| LedgerError::Format(e.to_string()))
    }

    pub fn trades(&self) -> &[Lot] {
        &self.trades
    }

    pub fn holdings(&self) -> &BTreeMap<HoldingKey, StockHolding> {
        &self.stock_portfolio
    }

    pub fn brokers(&self) -> &[String] {
        &self.brokers
    }

    pub fn lot(&self, id: LotId) -> Option<&Lot> {
        self.trades.iter().find(|l| l.id == id)
    }

    fn lot_mut(&mut self, id: LotId) -> Result<&mut Lot, LedgerError> {
        self.trades
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| LedgerError::NotFound(format!("lot {}", id)))
    }

    // ---- Lot ledger ----

    /// Open a new lot. Long stock additionally folds into the weighted-average
    /// holding for its (ticker, broker) key.
    ///
    /// # Errors
    /// `Validation` for non-positive quantity, negative price, empty symbol,
    /// or an option kind missing strike/expiry.
    pub fn open_lot(&mut self, draft: LotDraft) -> Result<&Lot, LedgerError> {
        let symbol = Ticker::new(&draft.symbol);
        validate_trade_fields(
            &symbol,
            draft.kind,
            draft.open_price,
            draft.total_quantity,
            draft.strike_price,
            draft.expiry_date,
        )?;

        let broker = draft.broker.as_deref().and_then(Broker::new);
        let lot = Lot {
            id: LotId::generate(),
            kind: draft.kind,
            symbol: symbol.clone(),
            broker: broker.clone(),
            open_date: draft.open_date,
            open_price: draft.open_price,
            total_quantity: draft.total_quantity,
            remaining_quantity: draft.total_quantity,
            status: LotStatus::Open,
            expiry_date: if draft.kind.is_option() {
                draft.expiry_date
            } else {
                None
            },
            strike_price: if draft.kind.is_option() {
                draft.strike_price
            } else {
                None
            },
            close_transactions: Vec::new(),
        };

        if lot.kind == PositionKind::LongStock {
            let key = HoldingKey::new(&symbol, broker.as_ref());
            let holding = self
                .stock_portfolio
                .entry(key)
                .or_insert_with(|| StockHolding::empty(broker.clone()));
            holding.quantity += lot.total_quantity;
            holding.total_cost =
                holding.total_cost + Decimal::from(lot.total_quantity) * lot.open_price;
        }

        self.trades.insert(0, lot);
        Ok(&self.trades[0])
    }

    /// Correct a lot's recorded fields. A quantity change resets BOTH total
    /// and remaining quantity: this is a data-entry fix, not a transaction,
    /// and is only sound before any closes have been applied.
    ///
    /// # Errors
    /// `NotFound` for an unknown lot; `Validation` for bad field values.
    pub fn modify_lot(&mut self, id: LotId, patch: LotPatch) -> Result<&Lot, LedgerError> {
        if let Some(qty) = patch.total_quantity {
            if qty <= 0 {
                return Err(LedgerError::Validation(
                    "total quantity must be positive".to_string(),
                ));
            }
        }
        if let Some(price) = patch.open_price {
            if price.is_negative() {
                return Err(LedgerError::Validation(
                    "open price must not be negative".to_string(),
                ));
            }
        }
        if let Some(symbol) = patch.symbol.as_deref() {
            if Ticker::new(symbol).is_empty() {
                return Err(LedgerError::Validation("symbol must not be empty".to_string()));
            }
        }

        let lot = self.lot_mut(id)?;
        if let Some(symbol) = patch.symbol {
            lot.symbol = Ticker::new(&symbol);
        }
        if let Some(broker) = patch.broker {
            lot.broker = Broker::new(&broker);
        }
        if let Some(price) = patch.open_price {
            lot.open_price = price;
        }
        if let Some(qty) = patch.total_quantity {
            lot.total_quantity = qty;
            lot.remaining_quantity = qty;
            lot.status = LotStatus::Open;
        }
        if let Some(strike) = patch.strike_price {
            if lot.kind.is_option() {
                lot.strike_price = Some(strike);
            }
        }
        if let Some(expiry) = patch.expiry_date {
            if lot.kind.is_option() {
                lot.expiry_date = Some(expiry);
            }
        }
        if let Some(date) = patch.open_date {
            lot.open_date = date;
        }
        Ok(&*lot)
    }

    /// Remove a lot outright. Irreversible, independent of status, and with
    /// no effect on any other lot or holding.
    pub fn delete_lot(&mut self, id: LotId) -> Result<(), LedgerError> {
        let before = self.trades.len();
        self.trades.retain(|l| l.id != id);
        if self.trades.len() == before {
            return Err(LedgerError::NotFound(format!("lot {}", id)));
        }
        Ok(())
    }

    // ---- Close/modify engine ----

    /// Close `quantity` units of an itemized lot at `price`, recording the
    /// realized profit once. Long stock is rejected here: it reduces through
    /// the holding map and records no realized profit.
    ///
    /// # Errors
    /// `NotFound` for an unknown lot, `Validation` for long stock or a
    /// non-positive quantity/negative price, `InsufficientQuantity` when the
    /// request exceeds what remains.
    pub fn close_lot(
        &mut self,
        id: LotId,
        request: CloseRequest,
    ) -> Result<&CloseTransaction, LedgerError> {
        if request.quantity <= 0 {
            return Err(LedgerError::Validation(
                "close quantity must be positive".to_string(),
            ));
        }
        if request.price.is_negative() {
            return Err(LedgerError::Validation(
                "close price must not be negative".to_string(),
            ));
        }

        let lot = self.lot_mut(id)?;
        if lot.kind == PositionKind::LongStock {
            return Err(LedgerError::Validation(
                "long stock reduces through its holding, not per-lot closes".to_string(),
            ));
        }
        if request.quantity > lot.remaining_quantity {
            return Err(LedgerError::InsufficientQuantity {
                requested: request.quantity,
                remaining: lot.remaining_quantity,
            });
        }

        let profit = lot
            .kind
            .close_profit(lot.open_price, request.price, request.quantity);
        lot.close_transactions.push(CloseTransaction {
            tx_id: TxId::generate(),
            date: request.date,
            price: request.price,
            quantity: request.quantity,
            profit,
        });
        lot.remaining_quantity -= request.quantity;
        if lot.remaining_quantity == 0 {
            lot.status = LotStatus::Closed;
        }
        Ok(lot.close_transactions.last().expect("just pushed"))
    }

    /// Undo one close: restore the quantity, reopen the lot, and drop exactly
    /// that transaction. Other transactions' recorded profits are untouched.
    pub fn undo_close(&mut self, id: LotId, tx_id: TxId) -> Result<(), LedgerError> {
        let lot = self.lot_mut(id)?;
        let idx = lot
            .close_transactions
            .iter()
            .position(|tx| tx.tx_id == tx_id)
            .ok_or_else(|| LedgerError::NotFound(format!("transaction {}", tx_id)))?;
        let tx = lot.close_transactions.remove(idx);
        lot.remaining_quantity += tx.quantity;
        lot.status = LotStatus::Open;
        Ok(())
    }

    // ---- Stock holdings ----

    /// Overwrite a holding, optionally re-keying it when the ticker or broker
    /// changed. A resulting quantity <= 0 closes the position out entirely.
    ///
    /// # Errors
    /// `NotFound` when `key` does not exist.
    pub fn update_stock_holding(
        &mut self,
        key: &HoldingKey,
        quantity: i64,
        total_cost: Decimal,
        new_ticker: Option<&str>,
        new_broker: Option<&str>,
    ) -> Result<(), LedgerError> {
        if !self.stock_portfolio.contains_key(key) {
            return Err(LedgerError::NotFound(format!("holding {}", key)));
        }

        let (old_ticker, old_broker) = key.decode();
        let ticker = match new_ticker {
            Some(t) => Ticker::new(t),
            None => old_ticker,
        };
        let broker = match new_broker {
            Some(b) => Broker::new(b),
            None => old_broker,
        };
        let new_key = HoldingKey::new(&ticker, broker.as_ref());

        if new_key != *key {
            self.stock_portfolio.remove(key);
        }
        if quantity <= 0 {
            self.stock_portfolio.remove(&new_key);
            return Ok(());
        }
        self.stock_portfolio.insert(
            new_key,
            StockHolding {
                quantity,
                total_cost,
                broker,
            },
        );
        Ok(())
    }

    /// Reduce a holding by `quantity` shares at the current average cost, so
    /// the average for whatever remains is unchanged. Reducing to zero (or
    /// past it) deletes the holding. No realized-profit record is produced
    /// for stock.
    pub fn reduce_stock_holding(
        &mut self,
        key: &HoldingKey,
        quantity: i64,
    ) -> Result<(), LedgerError> {
        if quantity <= 0 {
            return Err(LedgerError::Validation(
                "reduce quantity must be positive".to_string(),
            ));
        }
        let holding = self
            .stock_portfolio
            .get(key)
            .ok_or_else(|| LedgerError::NotFound(format!("holding {}", key)))?;
        if quantity > holding.quantity {
            return Err(LedgerError::InsufficientQuantity {
                requested: quantity,
                remaining: holding.quantity,
            });
        }

        let avg = holding.total_cost / Decimal::from(holding.quantity);
        let new_quantity = holding.quantity - quantity;
        if new_quantity == 0 {
            self.stock_portfolio.remove(key);
        } else {
            let holding = self.stock_portfolio.get_mut(key).expect("checked above");
            holding.quantity = new_quantity;
            holding.total_cost = holding.total_cost - avg * Decimal::from(quantity);
        }
        Ok(())
    }

    pub fn delete_holding(&mut self, key: &HoldingKey) -> Result<(), LedgerError> {
        self.stock_portfolio
            .remove(key)
            .map(|_| ())
            .ok_or_else(|| LedgerError::NotFound(format!("holding {}", key)))
    }

    // ---- Brokers ----

    pub fn add_broker(&mut self, name: &str) -> Result<(), LedgerError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(LedgerError::Validation(
                "broker name must not be empty".to_string(),
            ));
        }
        if !self.brokers.iter().any(|b| b == trimmed) {
            self.brokers.push(trimmed.to_string());
        }
        Ok(())
    }

    pub fn remove_broker(&mut self, name: &str) {
        self.brokers.retain(|b| b != name);
    }

    // ---- OCR import ----

    /// Import OCR candidates sequentially. Candidates without a ticker are
    /// discarded; each remaining one goes through the same validation as
    /// manual entry. Failures are collected per item and never abort the
    /// batch or undo earlier imports.
    pub fn import_candidates(&mut self, candidates: Vec<OcrTradeCandidate>) -> ImportReport {
        let mut report = ImportReport::default();
        for candidate in candidates {
            if Ticker::new(&candidate.stock_name).is_empty() {
                report.skipped_missing_ticker += 1;
                continue;
            }
            let draft = LotDraft {
                kind: candidate.kind,
                symbol: candidate.stock_name.clone(),
                broker: Broker::new(&candidate.broker).map(|b| b.as_str().to_string()),
                open_date: candidate.open_date,
                open_price: candidate.open_price,
                total_quantity: candidate.total_quantity,
                expiry_date: candidate.expiry_date,
                strike_price: candidate.strike_price,
            };
            match self.open_lot(draft) {
                Ok(lot) => report.imported.push(lot.id),
                Err(e) => report
                    .failures
                    .push(format!("{}: {}", candidate.stock_name, e)),
            }
        }
        report
    }
}

fn validate_trade_fields(
    symbol: &Ticker,
    kind: PositionKind,
    open_price: Decimal,
    total_quantity: i64,
    strike_price: Option<Decimal>,
    expiry_date: Option<NaiveDate>,
) -> Result<(), LedgerError> {
    if symbol.is_empty() {
        return Err(LedgerError::Validation("symbol must not be empty".to_string()));
    }
    if total_quantity <= 0 {
        return Err(LedgerError::Validation(
            "total quantity must be positive".to_string(),
        ));
    }
    if open_price.is_negative() {
        return Err(LedgerError::Validation(
            "open price must not be negative".to_string(),
        ));
    }
    if kind.is_option() {
        if strike_price.is_none() {
            return Err(LedgerError::Validation(
                "option positions require a strike price".to_string(),
            ));
        }
        if expiry_date.is_none() {
            return Err(LedgerError::Validation(
                "option positions require an expiry date".to_string(),
            ));
        }
    }
    Ok(())
}
