//! Payoff-at-expiry simulation for a two-leg vertical put spread.
//!
//! Closed-form, piecewise linear. No early-assignment modeling.

use serde::{Deserialize, Serialize};

use crate::domain::Decimal;

/// One put leg: strike and premium per unit (paid for longs, received for
/// shorts).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PutLeg {
    pub strike: Decimal,
    pub premium: Decimal,
}

/// Strategy classification derived from the strike relationship and whether
/// the spread was opened for a net credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SpreadStrategy {
    BullPutSpread,
    BearPutSpread,
    SyntheticFlat,
}

/// One sample of the profit curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffPoint {
    pub underlying: Decimal,
    pub profit: Decimal,
}

/// Sampled curve plus the derived scalars.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffAnalysis {
    pub strategy: SpreadStrategy,
    pub net_premium: Decimal,
    pub max_profit: Decimal,
    pub max_loss: Decimal,
    pub breakeven: Decimal,
    pub curve: Vec<PayoffPoint>,
}

const SAMPLES: i64 = 51;

/// Profit at expiry for one contract pair at underlying price `s`.
fn pnl_at(short: PutLeg, long: PutLeg, s: Decimal) -> Decimal {
    let short_leg = short.premium - (short.strike - s).max(Decimal::zero());
    let long_leg = (long.strike - s).max(Decimal::zero()) - long.premium;
    (short_leg + long_leg) * Decimal::hundred()
}

/// Analyze a short/long put pair: 51 evenly spaced samples spanning the
/// strikes, plus max profit, max loss, and breakeven.
pub fn analyze(short: PutLeg, long: PutLeg) -> PayoffAnalysis {
    let min_strike = short.strike.min(long.strike);
    let max_strike = short.strike.max(long.strike);
    let two = Decimal::from(2);
    let range = (Decimal::from(20)).max((max_strike - min_strike) * two);
    let start = (min_strike - range / two).max(Decimal::zero());
    let end = max_strike + range / two;

    let step = (end - start) / Decimal::from(SAMPLES - 1);
    let mut curve = Vec::with_capacity(SAMPLES as usize);
    for i in 0..SAMPLES {
        let underlying = start + step * Decimal::from(i);
        curve.push(PayoffPoint {
            underlying,
            profit: pnl_at(short, long, underlying),
        });
    }

    let net = short.premium - long.premium;
    let spread = long.strike - short.strike;
    let (strategy, max_profit, max_loss, breakeven) = if short.strike > long.strike {
        let strategy = if net.is_positive() {
            SpreadStrategy::BullPutSpread
        } else {
            SpreadStrategy::BearPutSpread
        };
        let (max_profit, max_loss) = if net.is_positive() {
            (net * Decimal::hundred(), (spread + net) * Decimal::hundred())
        } else {
            ((spread + net) * Decimal::hundred(), net * Decimal::hundred())
        };
        (strategy, max_profit, max_loss, short.strike - net)
    } else if short.strike < long.strike {
        let strategy = if net.is_negative() {
            SpreadStrategy::BearPutSpread
        } else {
            SpreadStrategy::BullPutSpread
        };
        let (max_profit, max_loss) = if net.is_negative() {
            ((spread + net) * Decimal::hundred(), net * Decimal::hundred())
        } else {
            (Decimal::zero(), (net - spread) * Decimal::hundred())
        };
        (strategy, max_profit, max_loss, long.strike - net)
    } else {
        let flat = net * Decimal::hundred();
        (SpreadStrategy::SyntheticFlat, flat, flat, short.strike)
    };

    PayoffAnalysis {
        strategy,
        net_premium: net,
        max_profit,
        max_loss,
        breakeven,
        curve,
    }
}
