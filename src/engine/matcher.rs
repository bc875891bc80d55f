//! Pairs open put lots into vertical-spread combinations.
//!
//! Pure function of a ledger snapshot: two greedy passes over each
//! (symbol, expiry) group, exact strikes first, then cross-strike. Inputs
//! are sorted by (strike, lot id) so the output never depends on map
//! iteration order.

use serde::Serialize;

use crate::domain::{Broker, Decimal, Lot, LotId, PositionKind, Ticker};
use crate::engine::Portfolio;
use chrono::NaiveDate;

/// One side of a combination, annotated with the quantity matched out of the
/// lot's remaining quantity (a lot may be split across several pairs).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub lot_id: LotId,
    pub kind: PositionKind,
    pub symbol: Ticker,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broker: Option<Broker>,
    pub strike: Decimal,
    pub premium: Decimal,
    pub expiry: NaiveDate,
    pub quantity: i64,
}

/// A matched [long, short] put pair for the same symbol and expiry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedPair {
    pub long: Leg,
    pub short: Leg,
    pub quantity: i64,
}

/// An open put leg left over after both matching passes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnhedgedLeg {
    pub lot_id: LotId,
    pub kind: PositionKind,
    pub symbol: Ticker,
    pub strike: Decimal,
    pub expiry: NaiveDate,
    pub quantity: i64,
}

/// Everything the matcher derives from one snapshot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CombinationSet {
    pub pairs: Vec<MatchedPair>,
    pub unhedged: Vec<UnhedgedLeg>,
}

struct Candidate<'a> {
    lot: &'a Lot,
    strike: Decimal,
    expiry: NaiveDate,
    remaining: i64,
}

/// Derive combinations from the current open put lots. Never mutates the
/// portfolio; running it twice on an unchanged snapshot yields identical
/// output.
pub fn match_combinations(portfolio: &Portfolio) -> CombinationSet {
    let mut open_puts: Vec<&Lot> = portfolio
        .trades()
        .iter()
        .filter(|l| l.is_open() && l.kind.is_put() && l.expiry_date.is_some())
        .collect();

    // Group key ordering is fixed up front so output order is stable.
    open_puts.sort_by(|a, b| {
        (&a.symbol, a.expiry_date, a.id).cmp(&(&b.symbol, b.expiry_date, b.id))
    });

    let mut result = CombinationSet::default();
    let mut idx = 0;
    while idx < open_puts.len() {
        let group_symbol = &open_puts[idx].symbol;
        let group_expiry = open_puts[idx].expiry_date;
        let mut end = idx;
        while end < open_puts.len()
            && &open_puts[end].symbol == group_symbol
            && open_puts[end].expiry_date == group_expiry
        {
            end += 1;
        }
        match_group(&open_puts[idx..end], &mut result);
        idx = end;
    }
    result
}

fn match_group(group: &[&Lot], result: &mut CombinationSet) {
    let mut longs: Vec<Candidate> = Vec::new();
    let mut shorts: Vec<Candidate> = Vec::new();
    for lot in group {
        let Some(expiry) = lot.expiry_date else {
            continue;
        };
        let candidate = Candidate {
            lot,
            strike: lot.strike_price.unwrap_or(Decimal::zero()),
            expiry,
            remaining: lot.remaining_quantity,
        };
        match lot.kind {
            PositionKind::LongPut => longs.push(candidate),
            PositionKind::ShortPut => shorts.push(candidate),
            _ => {}
        }
    }

    // Ascending strike, lot id as the stable tie-break for equal strikes.
    longs.sort_by(|a, b| (a.strike, a.lot.id).cmp(&(b.strike, b.lot.id)));
    shorts.sort_by(|a, b| (a.strike, a.lot.id).cmp(&(b.strike, b.lot.id)));

    // Pass 1: exact-strike pairs. Pass 2: whatever is left, cross-strike.
    pair_pass(&mut longs, &mut shorts, true, result);
    pair_pass(&mut longs, &mut shorts, false, result);

    for candidate in longs.iter().chain(shorts.iter()) {
        if candidate.remaining > 0 {
            result.unhedged.push(UnhedgedLeg {
                lot_id: candidate.lot.id,
                kind: candidate.lot.kind,
                symbol: candidate.lot.symbol.clone(),
                strike: candidate.strike,
                expiry: candidate.expiry,
                quantity: candidate.remaining,
            });
        }
    }
}

fn pair_pass(
    longs: &mut [Candidate],
    shorts: &mut [Candidate],
    exact_strike: bool,
    result: &mut CombinationSet,
) {
    for long in longs.iter_mut() {
        for short in shorts.iter_mut() {
            if long.remaining == 0 {
                break;
            }
            if short.remaining == 0 {
                continue;
            }
            if exact_strike && long.strike != short.strike {
                continue;
            }
            let quantity = long.remaining.min(short.remaining);
            result.pairs.push(MatchedPair {
                long: leg(long, quantity),
                short: leg(short, quantity),
                quantity,
            });
            long.remaining -= quantity;
            short.remaining -= quantity;
        }
    }
}

fn leg(candidate: &Candidate, quantity: i64) -> Leg {
    Leg {
        lot_id: candidate.lot.id,
        kind: candidate.lot.kind,
        symbol: candidate.lot.symbol.clone(),
        broker: candidate.lot.broker.clone(),
        strike: candidate.strike,
        premium: candidate.lot.open_price,
        expiry: candidate.expiry,
        quantity,
    }
}
