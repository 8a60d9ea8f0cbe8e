//! Seat-change pricing and eligibility.

use rust_decimal::Decimal;

use crate::domain::foundation::{DomainError, ErrorCode, Money};
use crate::domain::model::{CabinClass, FlightSeat, SeatMapRow, SeatStatus};

/// Fee for moving into the given seat: extra legroom 25, exit row 15,
/// non-economy cabin 50, otherwise free.
pub fn seat_change_fee(seat: &SeatMapRow, currency: &str) -> Money {
    let amount = if seat.extra_legroom {
        25
    } else if seat.exit_row {
        15
    } else if seat.cabin_class != CabinClass::Economy {
        50
    } else {
        0
    };
    Money::new(Decimal::from(amount), currency)
}

/// Refuses a seat that is blocked, occupied by someone else, or in a
/// different cabin than the segment.
pub fn validate_seat_target(
    seat: &SeatMapRow,
    occupancy: Option<&FlightSeat>,
    segment_class: CabinClass,
    segment_id: i64,
) -> Result<(), DomainError> {
    if seat.blocked {
        return Err(DomainError::new(
            ErrorCode::SeatUnavailable,
            format!("Seat {} is blocked", seat.seat_number),
        ));
    }
    if seat.cabin_class != segment_class {
        return Err(DomainError::new(
            ErrorCode::SeatUnavailable,
            format!(
                "Seat {} is in {} which does not match the ticketed class {}",
                seat.seat_number,
                seat.cabin_class.as_str(),
                segment_class.as_str()
            ),
        ));
    }
    if let Some(row) = occupancy {
        let taken_by_other = row.status != SeatStatus::Available && row.segment_id != Some(segment_id);
        if row.status == SeatStatus::Blocked || taken_by_other {
            return Err(DomainError::new(
                ErrorCode::SeatUnavailable,
                format!("Seat {} is not available on this flight", seat.seat_number),
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SeatType;

    fn seat(number: &str, class: CabinClass, exit_row: bool, extra_legroom: bool) -> SeatMapRow {
        SeatMapRow {
            id: 1,
            aircraft_type_id: 1,
            seat_number: number.to_string(),
            seat_type: SeatType::Aisle,
            cabin_class: class,
            exit_row,
            extra_legroom,
            blocked: false,
        }
    }

    fn occupied(segment_id: i64) -> FlightSeat {
        FlightSeat {
            id: 1,
            flight_id: 1,
            seat_number: "12C".to_string(),
            passenger_id: Some(9),
            segment_id: Some(segment_id),
            fee: None,
            status: SeatStatus::Occupied,
        }
    }

    #[test]
    fn extra_legroom_wins_over_exit_row() {
        let s = seat("14C", CabinClass::Economy, true, true);
        assert_eq!(seat_change_fee(&s, "USD").amount, Decimal::from(25));
    }

    #[test]
    fn exit_row_costs_15() {
        let s = seat("14C", CabinClass::Economy, true, false);
        assert_eq!(seat_change_fee(&s, "USD").amount, Decimal::from(15));
    }

    #[test]
    fn premium_cabin_costs_50() {
        let s = seat("2A", CabinClass::Business, false, false);
        assert_eq!(seat_change_fee(&s, "USD").amount, Decimal::from(50));
    }

    #[test]
    fn plain_economy_seat_is_free() {
        let s = seat("23B", CabinClass::Economy, false, false);
        assert!(seat_change_fee(&s, "USD").is_zero());
    }

    #[test]
    fn class_mismatch_is_unavailable() {
        let s = seat("2A", CabinClass::Business, false, false);
        let err = validate_seat_target(&s, None, CabinClass::Economy, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::SeatUnavailable);
    }

    #[test]
    fn seat_occupied_by_another_segment_is_unavailable() {
        let s = seat("12C", CabinClass::Economy, false, false);
        let err = validate_seat_target(&s, Some(&occupied(99)), CabinClass::Economy, 5).unwrap_err();
        assert_eq!(err.code, ErrorCode::SeatUnavailable);
    }

    #[test]
    fn reselecting_own_seat_is_allowed() {
        let s = seat("12C", CabinClass::Economy, false, false);
        assert!(validate_seat_target(&s, Some(&occupied(5)), CabinClass::Economy, 5).is_ok());
    }
}
