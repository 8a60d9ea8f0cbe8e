//! Deterministic fare quoting.
//!
//! Quotes are a pure transformation of class, travel date, and query date:
//! a fixed per-class base, an advance-purchase multiplier, and a seasonal
//! multiplier. Presentation layers may dress quotes up, but stored totals
//! come from here.

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::foundation::Money;
use crate::domain::model::CabinClass;

/// A deterministic fare quote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceQuote {
    pub cabin_class: CabinClass,
    pub base: Money,
    pub advance_multiplier: Decimal,
    pub seasonal_multiplier: Decimal,
    pub total: Money,
    /// Indicative display band around the total (80%-120%).
    pub band_low: Money,
    pub band_high: Money,
}

fn base_amount(class: CabinClass) -> Decimal {
    Decimal::from(match class {
        CabinClass::Economy => 250,
        CabinClass::PremiumEconomy => 450,
        CabinClass::Business => 900,
        CabinClass::First => 1600,
    })
}

/// Advance-purchase multiplier by days until departure.
pub fn advance_multiplier(days_ahead: i64) -> Decimal {
    if days_ahead < 14 {
        Decimal::new(15, 1)
    } else if days_ahead < 30 {
        Decimal::new(12, 1)
    } else if days_ahead < 60 {
        Decimal::ONE
    } else {
        Decimal::new(9, 1)
    }
}

/// Seasonal multiplier by departure month: peak Jun-Aug and Dec at 1.3,
/// off-peak Jan, Feb, Nov at 0.8.
pub fn seasonal_multiplier(month: u32) -> Decimal {
    match month {
        6..=8 | 12 => Decimal::new(13, 1),
        1 | 2 | 11 => Decimal::new(8, 1),
        _ => Decimal::ONE,
    }
}

/// Computes the quote for one class on one date.
pub fn price_quote(
    class: CabinClass,
    departure_date: NaiveDate,
    query_date: NaiveDate,
    currency: &str,
) -> PriceQuote {
    let days_ahead = (departure_date - query_date).num_days();
    let advance = advance_multiplier(days_ahead);
    let seasonal = seasonal_multiplier(departure_date.month());

    let base = Money::new(base_amount(class), currency);
    let total = base.scale(advance * seasonal);

    PriceQuote {
        cabin_class: class,
        band_low: total.scale(Decimal::new(8, 1)),
        band_high: total.scale(Decimal::new(12, 1)),
        base,
        advance_multiplier: advance,
        seasonal_multiplier: seasonal,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn advance_tiers() {
        assert_eq!(advance_multiplier(3), d("1.5"));
        assert_eq!(advance_multiplier(20), d("1.2"));
        assert_eq!(advance_multiplier(45), d("1.0"));
        assert_eq!(advance_multiplier(90), d("0.9"));
    }

    #[test]
    fn seasonal_tiers() {
        assert_eq!(seasonal_multiplier(7), d("1.3"));
        assert_eq!(seasonal_multiplier(12), d("1.3"));
        assert_eq!(seasonal_multiplier(2), d("0.8"));
        assert_eq!(seasonal_multiplier(4), d("1.0"));
    }

    #[test]
    fn quote_is_deterministic_and_composed() {
        // 10 days out, July departure: 250 * 1.5 * 1.3 = 487.50
        let q = price_quote(
            CabinClass::Economy,
            NaiveDate::from_ymd_opt(2025, 7, 20).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            "USD",
        );
        assert_eq!(q.total.amount, d("487.50"));
        let again = price_quote(
            CabinClass::Economy,
            NaiveDate::from_ymd_opt(2025, 7, 20).unwrap(),
            NaiveDate::from_ymd_opt(2025, 7, 10).unwrap(),
            "USD",
        );
        assert_eq!(q, again);
    }

    #[test]
    fn band_brackets_the_total() {
        let q = price_quote(
            CabinClass::Business,
            NaiveDate::from_ymd_opt(2025, 4, 15).unwrap(),
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
            "USD",
        );
        assert!(q.band_low.amount < q.total.amount);
        assert!(q.band_high.amount > q.total.amount);
    }
}
