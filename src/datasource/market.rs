//! Defensive parsing of free-text quote replies.
//!
//! The model is asked for one line per symbol in the shape
//! `SYMBOL: price, Vol: volume, Amt: amount, Time: HH:MM`. Anything that
//! does not match is skipped; a bad reply degrades to an empty update.

use regex::Regex;
use tracing::warn;

use crate::domain::{Decimal, MarketData, MarketUpdate};

/// Parse a quote reply. Lines that do not carry a symbol and a price are
/// dropped; the optional fields are kept when present.
pub fn parse_market_text(text: &str) -> MarketUpdate {
    let line_re = Regex::new(
        r"(?m)^\s*([A-Za-z][A-Za-z0-9.\-]*)\s*[:：]\s*\$?([0-9]+(?:\.[0-9]+)?)(.*)$",
    )
    .expect("static regex");
    let vol_re = Regex::new(r"(?i)vol(?:ume)?\s*[:：]?\s*([0-9][0-9,]*)").expect("static regex");
    let amt_re =
        Regex::new(r"(?i)(?:amt|amount)\s*[:：]?\s*\$?([0-9][0-9,]*(?:\.[0-9]+)?)")
            .expect("static regex");
    let time_re = Regex::new(r"(?i)time\s*[:：]?\s*([0-9]{1,2}:[0-9]{2})").expect("static regex");

    let mut update = MarketUpdate::default();
    for caps in line_re.captures_iter(text) {
        let identifier = caps[1].to_uppercase();
        let Ok(price) = Decimal::parse(&caps[2]) else {
            continue;
        };
        let tail = &caps[3];

        let volume = vol_re
            .captures(tail)
            .and_then(|c| c[1].replace(',', "").parse::<i64>().ok());
        let amount = amt_re
            .captures(tail)
            .and_then(|c| c.get(1))
            .and_then(|m| Decimal::parse(&m.as_str().replace(',', "")).ok());
        let time = time_re.captures(tail).map(|c| c[1].to_string());

        update.prices.insert(
            identifier,
            MarketData {
                price,
                volume,
                amount,
                time,
            },
        );
    }
    if update.prices.is_empty() && !text.trim().is_empty() {
        warn!("quote reply contained no parseable lines");
    }
    update
}
