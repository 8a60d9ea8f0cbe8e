//! Cancellation and change fee tiers.
//!
//! Tiers by time to departure:
//!
//! | time to departure | cancellation fee | change fee      |
//! |-------------------|------------------|-----------------|
//! | departed (< 0)    | refused          | refused         |
//! | < 2 h             | refused          | refused         |
//! | < 24 h            | 50% of total     | 2x base         |
//! | < 7 d             | 200 flat         | base            |
//! | < 30 d            | 100 flat         | base            |
//! | >= 30 d           | 0                | base            |
//!
//! Base change fee: 75 for routes up to 2000 km, 200 otherwise.

use chrono::Duration;
use rust_decimal::Decimal;

use crate::domain::foundation::{DomainError, ErrorCode, Money};

const SHORT_HAUL_KM: i32 = 2000;

/// Cancellation fee for a booking, or a `PolicyViolation` when the flight
/// has departed or departs within two hours.
pub fn cancellation_fee(total: &Money, time_to_departure: Duration) -> Result<Money, DomainError> {
    refuse_if_locked_out(time_to_departure, "cancelled")?;

    let hours = time_to_departure.num_hours();
    let fee = if hours < 24 {
        total.scale(Decimal::new(5, 1))
    } else if time_to_departure.num_days() < 7 {
        Money::new(Decimal::from(200), total.currency.clone())
    } else if time_to_departure.num_days() < 30 {
        Money::new(Decimal::from(100), total.currency.clone())
    } else {
        Money::zero(total.currency.clone())
    };
    Ok(fee)
}

/// Change fee for a booking on a route of the given distance, or a
/// `PolicyViolation` under the same lockout as cancellation.
pub fn change_fee(
    time_to_departure: Duration,
    distance_km: i32,
    currency: &str,
) -> Result<Money, DomainError> {
    refuse_if_locked_out(time_to_departure, "changed")?;

    let base = base_change_fee(distance_km, currency);
    if time_to_departure.num_hours() < 24 {
        Ok(base.scale(Decimal::from(2)))
    } else {
        Ok(base)
    }
}

/// Flat change fee before the last-24-hours surcharge.
pub fn base_change_fee(distance_km: i32, currency: &str) -> Money {
    let amount = if distance_km <= SHORT_HAUL_KM { 75 } else { 200 };
    Money::new(Decimal::from(amount), currency)
}

fn refuse_if_locked_out(time_to_departure: Duration, action: &str) -> Result<(), DomainError> {
    if time_to_departure < Duration::zero() {
        return Err(DomainError::new(
            ErrorCode::PolicyViolation,
            format!("Flight has already departed and cannot be {}", action),
        ));
    }
    if time_to_departure < Duration::hours(2) {
        return Err(DomainError::new(
            ErrorCode::PolicyViolation,
            format!("Bookings cannot be {} within 2 hours of departure", action),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn usd(s: &str) -> Money {
        Money::new(s.parse().unwrap(), "USD")
    }

    #[test]
    fn departed_flight_cannot_be_cancelled() {
        let err = cancellation_fee(&usd("1000"), Duration::hours(-3)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PolicyViolation);
    }

    #[test]
    fn cancellation_inside_two_hours_is_refused() {
        let err = cancellation_fee(&usd("1000"), Duration::hours(1)).unwrap_err();
        assert_eq!(err.code, ErrorCode::PolicyViolation);
    }

    #[test]
    fn cancellation_inside_a_day_costs_half() {
        let fee = cancellation_fee(&usd("1000.00"), Duration::hours(12)).unwrap();
        assert_eq!(fee, usd("500.00"));
    }

    #[test]
    fn cancellation_inside_a_week_is_200_flat() {
        let fee = cancellation_fee(&usd("1000.00"), Duration::days(3)).unwrap();
        assert_eq!(fee, usd("200.00"));
    }

    #[test]
    fn cancellation_inside_a_month_is_100_flat() {
        let fee = cancellation_fee(&usd("1000.00"), Duration::days(14)).unwrap();
        assert_eq!(fee, usd("100.00"));
    }

    #[test]
    fn early_cancellation_is_free() {
        let fee = cancellation_fee(&usd("1000.00"), Duration::days(45)).unwrap();
        assert!(fee.is_zero());
    }

    #[test]
    fn change_fee_doubles_inside_a_day() {
        let fee = change_fee(Duration::hours(10), 1500, "USD").unwrap();
        assert_eq!(fee, usd("150.00"));
        let fee = change_fee(Duration::hours(10), 3000, "USD").unwrap();
        assert_eq!(fee, usd("400.00"));
    }

    #[test]
    fn change_fee_uses_base_beyond_a_day() {
        let fee = change_fee(Duration::days(5), 1500, "USD").unwrap();
        assert_eq!(fee, usd("75.00"));
        let fee = change_fee(Duration::days(40), 3000, "USD").unwrap();
        assert_eq!(fee, usd("200.00"));
    }

    proptest! {
        // Later cancellation never gets cheaper than earlier cancellation
        // for the same booking, within the allowed region. Totals below 400
        // are excluded: the 50% tier can undercut the flat 200 tier there.
        #[test]
        fn cancellation_fee_is_monotone_in_urgency(
            total in 400u32..100_000,
            earlier_hours in 2i64..2000,
            later_hours in 2i64..2000,
        ) {
            prop_assume!(earlier_hours >= later_hours);
            let total = usd(&total.to_string());
            let early = cancellation_fee(&total, Duration::hours(earlier_hours)).unwrap();
            let late = cancellation_fee(&total, Duration::hours(later_hours)).unwrap();
            prop_assert!(late.amount >= early.amount);
        }
    }
}
