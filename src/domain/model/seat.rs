//! Seat maps and per-flight seat inventory.

use serde::{Deserialize, Serialize};

use super::booking::CabinClass;
use crate::domain::foundation::Money;

/// Physical position of a seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatType {
    Window,
    Aisle,
    Middle,
}

impl SeatType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatType::Window => "window",
            SeatType::Aisle => "aisle",
            SeatType::Middle => "middle",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "window" => Some(SeatType::Window),
            "aisle" => Some(SeatType::Aisle),
            "middle" => Some(SeatType::Middle),
            _ => None,
        }
    }
}

/// Occupancy state of a seat on a specific flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeatStatus {
    Available,
    Occupied,
    Blocked,
}

impl SeatStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeatStatus::Available => "available",
            SeatStatus::Occupied => "occupied",
            SeatStatus::Blocked => "blocked",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "available" => Some(SeatStatus::Available),
            "occupied" => Some(SeatStatus::Occupied),
            "blocked" => Some(SeatStatus::Blocked),
            _ => None,
        }
    }
}

/// One seat of an aircraft type's cabin layout.
/// `(aircraft_type_id, seat_number)` is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeatMapRow {
    pub id: i64,
    pub aircraft_type_id: i64,
    pub seat_number: String,
    pub seat_type: SeatType,
    pub cabin_class: CabinClass,
    pub exit_row: bool,
    pub extra_legroom: bool,
    pub blocked: bool,
}

/// Seat state for one flight; `(flight_id, seat_number)` is unique.
/// Rows are created lazily on first assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSeat {
    pub id: i64,
    pub flight_id: i64,
    pub seat_number: String,
    pub passenger_id: Option<i64>,
    pub segment_id: Option<i64>,
    pub fee: Option<Money>,
    pub status: SeatStatus,
}
