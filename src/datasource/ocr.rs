//! Defensive parsing of AI trade-extraction replies into import candidates.
//!
//! The model is asked for strict JSON but replies drift: markdown fences,
//! a bare array instead of a `trades` wrapper, numbers as strings, missing
//! direction fields. Parsing skips junk entries and never fails the batch.

use chrono::NaiveDate;
use regex::Regex;
use serde_json::Value;
use tracing::warn;

use crate::domain::{Decimal, OcrConfidence, OcrTradeCandidate, PositionKind};

/// Parse an extraction reply into candidates. `fallback_date` is used when an
/// entry carries no usable open date.
pub fn parse_candidates(text: &str, fallback_date: NaiveDate) -> Vec<OcrTradeCandidate> {
    let entries = match extract_entries(text) {
        Some(entries) => entries,
        None => {
            warn!("extraction reply contained no trade list");
            return Vec::new();
        }
    };

    let buy_re = Regex::new(r"(?i)\b(buy|long|open)\b").expect("static regex");
    let sell_re = Regex::new(r"(?i)\b(sell|short|close)\b").expect("static regex");
    let put_re = Regex::new(r"(?i)\bp(ut)?\b").expect("static regex");

    let mut candidates = Vec::new();
    for entry in &entries {
        let Some(obj) = entry.as_object() else {
            continue;
        };

        let raw_name = str_field(obj, &["rawName", "raw_text", "rawText"]).unwrap_or_default();
        let ticker = str_field(obj, &["ticker", "stockName", "symbol"])
            .map(|s| s.trim().to_uppercase())
            .or_else(|| leading_symbol(&raw_name))
            .unwrap_or_default();
        if ticker.is_empty() {
            continue;
        }

        let direction = str_field(obj, &["direction", "side"]).unwrap_or_default();
        let direction_given = !direction.is_empty();
        // Absent direction defaults to buy; an explicit sell token wins.
        let is_buy = direction.is_empty()
            || (buy_re.is_match(&direction) && !sell_re.is_match(&direction));

        let asset_type = str_field(obj, &["assetType", "asset_type"]).unwrap_or_default();
        let option_type = str_field(obj, &["optionType", "option_type"]).unwrap_or_default();
        let expiry = str_field(obj, &["expiry", "expiryDate"]).and_then(|s| parse_date(&s));
        let strike = number_field(obj, &["strike", "strikePrice"]);

        let upper_raw = raw_name.to_uppercase();
        let is_option = asset_type.to_lowercase().contains("option")
            || expiry.is_some()
            || strike.is_some()
            || upper_raw.contains("PUT")
            || upper_raw.contains("CALL");
        let is_put = put_re.is_match(&option_type) || upper_raw.contains("PUT");

        let kind = if is_option {
            match (is_buy, is_put) {
                (true, true) => PositionKind::LongPut,
                (true, false) => PositionKind::LongCall,
                (false, true) => PositionKind::ShortPut,
                (false, false) => PositionKind::ShortCall,
            }
        } else if is_buy {
            PositionKind::LongStock
        } else {
            PositionKind::ShortStock
        };

        let price = number_field(obj, &["price", "openPrice"]);
        let quantity = obj
            .get("quantity")
            .or_else(|| obj.get("totalQuantity"))
            .and_then(coerce_i64)
            .map(|q| q.abs())
            .unwrap_or(0);
        let open_date = str_field(obj, &["time", "openDate", "date"])
            .and_then(|s| parse_date(&s))
            .unwrap_or(fallback_date);

        let confidence = if direction_given && price.is_some() && quantity > 0 {
            OcrConfidence::High
        } else if price.is_some() && quantity > 0 {
            OcrConfidence::Medium
        } else {
            OcrConfidence::Low
        };

        let open_price = price.unwrap_or(Decimal::zero());
        let fingerprint = OcrTradeCandidate::compute_fingerprint(
            &ticker, kind, open_price, quantity, &raw_name,
        );
        candidates.push(OcrTradeCandidate {
            stock_name: ticker,
            kind,
            open_price,
            total_quantity: quantity,
            expiry_date: expiry,
            strike_price: strike,
            broker: str_field(obj, &["broker"]).unwrap_or_default(),
            open_date,
            confidence,
            fingerprint,
            raw_text: raw_name,
        });
    }
    candidates
}

/// Accept either `{"trades": [...]}` or a bare array, possibly wrapped in
/// markdown fences.
fn extract_entries(text: &str) -> Option<Vec<Value>> {
    let stripped = strip_fences(text);
    let parsed: Value = serde_json::from_str(stripped.trim()).ok()?;
    match parsed {
        Value::Array(items) => Some(items),
        Value::Object(obj) => obj
            .get("trades")
            .and_then(|v| v.as_array())
            .map(|items| items.to_vec()),
        _ => None,
    }
}

fn strip_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest)
}

fn str_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|k| {
        obj.get(*k)
            .and_then(|v| v.as_str())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn number_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<Decimal> {
    keys.iter().find_map(|k| obj.get(*k).and_then(coerce_decimal))
}

fn coerce_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => Decimal::parse(&n.to_string()).ok(),
        Value::String(s) => Decimal::parse(s.trim()).ok(),
        _ => None,
    }
}

fn coerce_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%Y/%m/%d"))
        .ok()
}

/// First token of a raw contract name like "MARA PUT 260116 9.5".
fn leading_symbol(raw: &str) -> Option<String> {
    let token = raw.split_whitespace().next()?;
    let symbol: String = token
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect();
    if symbol.is_empty() {
        None
    } else {
        Some(symbol.to_uppercase())
    }
}
