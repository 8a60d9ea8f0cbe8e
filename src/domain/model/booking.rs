//! Bookings and their flight segments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::flight::FlightDetail;
use super::passenger::Passenger;
use crate::domain::foundation::Money;

/// Class of service on a segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CabinClass {
    Economy,
    PremiumEconomy,
    Business,
    First,
}

impl CabinClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            CabinClass::Economy => "economy",
            CabinClass::PremiumEconomy => "premium_economy",
            CabinClass::Business => "business",
            CabinClass::First => "first",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "economy" => Some(CabinClass::Economy),
            "premium_economy" => Some(CabinClass::PremiumEconomy),
            "business" => Some(CabinClass::Business),
            "first" => Some(CabinClass::First),
            _ => None,
        }
    }
}

/// Booking lifecycle state. `Cancelled` and `Refunded` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    RefundRequested,
    Refunded,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::RefundRequested => "refund_requested",
            BookingStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "refund_requested" => Some(BookingStatus::RefundRequested),
            "refunded" => Some(BookingStatus::Refunded),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Refunded)
    }
}

/// Shape of the itinerary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripType {
    OneWay,
    RoundTrip,
    MultiCity,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "one_way",
            TripType::RoundTrip => "round_trip",
            TripType::MultiCity => "multi_city",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "one_way" | "one-way" => Some(TripType::OneWay),
            "round_trip" | "round-trip" => Some(TripType::RoundTrip),
            "multi_city" | "multi-city" => Some(TripType::MultiCity),
            _ => None,
        }
    }
}

/// Per-segment check-in state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckInStatus {
    NotCheckedIn,
    CheckedIn,
    Boarded,
}

impl CheckInStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CheckInStatus::NotCheckedIn => "not_checked_in",
            CheckInStatus::CheckedIn => "checked_in",
            CheckInStatus::Boarded => "boarded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "not_checked_in" => Some(CheckInStatus::NotCheckedIn),
            "checked_in" => Some(CheckInStatus::CheckedIn),
            "boarded" => Some(CheckInStatus::Boarded),
            _ => None,
        }
    }
}

/// A purchase; never destroyed, only cancel/refund/date-change mutate it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    /// Six-char alphanumeric reference, unique.
    pub reference: String,
    pub passenger_id: i64,
    pub booking_date: DateTime<Utc>,
    pub total: Money,
    pub status: BookingStatus,
    pub source: Option<String>,
    pub trip_type: TripType,
}

/// One flight leg within a booking. Its passenger always equals the
/// booking's passenger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingSegment {
    pub id: i64,
    pub booking_id: i64,
    pub flight_id: i64,
    pub passenger_id: i64,
    pub cabin_class: CabinClass,
    pub fare_basis: Option<String>,
    pub ticket_number: String,
    pub seat_number: Option<String>,
    pub baggage_allowance_kg: i32,
    pub meal_preference: Option<String>,
    pub check_in_status: CheckInStatus,
    pub boarding_pass_issued: bool,
}

/// A segment with its flight joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentDetail {
    pub segment: BookingSegment,
    pub flight: FlightDetail,
}

/// A booking with passenger and segments materialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookingDetail {
    pub booking: Booking,
    pub passenger: Passenger,
    pub segments: Vec<SegmentDetail>,
}

impl BookingDetail {
    /// Earliest scheduled departure across segments; bookings always carry
    /// at least one segment.
    pub fn earliest_departure(&self) -> Option<DateTime<Utc>> {
        self.segments
            .iter()
            .map(|s| s.flight.flight.scheduled_departure)
            .min()
    }

    pub fn segment_by_flight_number(&self, flight_number: &str) -> Option<&SegmentDetail> {
        self.segments
            .iter()
            .find(|s| s.flight.flight.flight_number.eq_ignore_ascii_case(flight_number))
    }
}

/// Write model for booking creation; persisted atomically with its segments.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub reference: String,
    pub passenger_id: i64,
    pub total: Money,
    pub source: Option<String>,
    pub trip_type: TripType,
    pub segments: Vec<NewSegment>,
}

/// Write model for one segment.
#[derive(Debug, Clone)]
pub struct NewSegment {
    pub flight_id: i64,
    pub cabin_class: CabinClass,
    pub fare_basis: Option<String>,
    pub ticket_number: String,
    pub seat_number: Option<String>,
    pub baggage_allowance_kg: i32,
    pub meal_preference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cabin_class_round_trips_through_strings() {
        for c in [
            CabinClass::Economy,
            CabinClass::PremiumEconomy,
            CabinClass::Business,
            CabinClass::First,
        ] {
            assert_eq!(CabinClass::from_str(c.as_str()), Some(c));
        }
    }

    #[test]
    fn terminal_statuses() {
        assert!(BookingStatus::Cancelled.is_terminal());
        assert!(BookingStatus::Refunded.is_terminal());
        assert!(!BookingStatus::Confirmed.is_terminal());
        assert!(!BookingStatus::RefundRequested.is_terminal());
    }

    #[test]
    fn trip_type_accepts_hyphenated_forms() {
        assert_eq!(TripType::from_str("round-trip"), Some(TripType::RoundTrip));
        assert_eq!(TripType::from_str("one_way"), Some(TripType::OneWay));
    }
}
