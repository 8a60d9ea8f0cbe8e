//! Trip packages, trip bookings, and excursions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::foundation::Money;

/// A packaged holiday product; `code` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPackage {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub destination: String,
    pub category: String,
    pub description: String,
    pub duration_days: i32,
    pub price: Money,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripBookingStatus {
    Confirmed,
    Cancelled,
    Refunded,
}

impl TripBookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripBookingStatus::Confirmed => "confirmed",
            TripBookingStatus::Cancelled => "cancelled",
            TripBookingStatus::Refunded => "refunded",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "confirmed" => Some(TripBookingStatus::Confirmed),
            "cancelled" => Some(TripBookingStatus::Cancelled),
            "refunded" => Some(TripBookingStatus::Refunded),
            _ => None,
        }
    }
}

/// A booked package; `reference` is a unique 6-char code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripBooking {
    pub id: i64,
    pub reference: String,
    pub package_id: i64,
    pub passenger_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: i32,
    pub total: Money,
    pub status: TripBookingStatus,
}

/// An optional activity at a destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Excursion {
    pub id: i64,
    pub code: String,
    pub name: String,
    pub destination: String,
    pub description: String,
    pub duration_hours: i32,
    pub price: Money,
}

/// An excursion hung off a trip booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcursionBooking {
    pub id: i64,
    pub trip_booking_id: i64,
    pub excursion_id: i64,
    pub excursion_date: NaiveDate,
    pub participants: i32,
    pub total: Money,
}

/// Write model for booking a package.
#[derive(Debug, Clone)]
pub struct NewTripBooking {
    pub reference: String,
    pub package_id: i64,
    pub passenger_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub travelers: i32,
    pub total: Money,
}

/// Write model for booking an excursion.
#[derive(Debug, Clone)]
pub struct NewExcursionBooking {
    pub trip_booking_id: i64,
    pub excursion_id: i64,
    pub excursion_date: NaiveDate,
    pub participants: i32,
    pub total: Money,
}

/// Trip booking with its package and excursions joined in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripBookingDetail {
    pub trip_booking: TripBooking,
    pub package: TripPackage,
    pub excursions: Vec<ExcursionBooking>,
}
