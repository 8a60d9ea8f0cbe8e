//! Flights and their status history.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::airline::{Airline, Airport, Route, RouteType};

/// Operational status of a flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    Scheduled,
    Boarding,
    Departed,
    Arrived,
    Delayed,
    Cancelled,
}

impl FlightStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightStatus::Scheduled => "scheduled",
            FlightStatus::Boarding => "boarding",
            FlightStatus::Departed => "departed",
            FlightStatus::Arrived => "arrived",
            FlightStatus::Delayed => "delayed",
            FlightStatus::Cancelled => "cancelled",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(FlightStatus::Scheduled),
            "boarding" => Some(FlightStatus::Boarding),
            "departed" => Some(FlightStatus::Departed),
            "arrived" => Some(FlightStatus::Arrived),
            "delayed" => Some(FlightStatus::Delayed),
            "cancelled" => Some(FlightStatus::Cancelled),
            _ => None,
        }
    }
}

/// A scheduled flight instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flight {
    pub id: i64,
    pub flight_number: String,
    pub airline_id: i64,
    pub aircraft_id: i64,
    pub route_id: i64,
    pub scheduled_departure: DateTime<Utc>,
    pub scheduled_arrival: DateTime<Utc>,
    pub actual_departure: Option<DateTime<Utc>>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub status: FlightStatus,
    pub gate: Option<String>,
    pub terminal: Option<String>,
}

/// Append-only status history row; the latest by `update_time` is
/// authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightStatusUpdate {
    pub id: i64,
    pub flight_id: i64,
    pub update_time: DateTime<Utc>,
    pub delay_minutes: Option<i32>,
    pub reason: Option<String>,
    pub new_departure: Option<DateTime<Utc>>,
    pub new_arrival: Option<DateTime<Utc>>,
    pub gate_change: Option<String>,
}

/// A flight with its relationships materialized up front.
///
/// Handlers never traverse from a bare `Flight` row; every read that needs
/// the airline, route, or endpoints goes through this shape so the required
/// joins are explicit in the port contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightDetail {
    pub flight: Flight,
    pub airline: Airline,
    pub route: Route,
    pub origin: Airport,
    pub destination: Airport,
    pub aircraft_type_id: i64,
}

impl FlightDetail {
    /// Domestic iff both endpoints share a country.
    pub fn route_type(&self) -> RouteType {
        RouteType::from_countries(&self.origin.country, &self.destination.country)
    }

    pub fn distance_km(&self) -> i32 {
        self.route.distance_km
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flight_status_round_trips_through_strings() {
        for s in [
            FlightStatus::Scheduled,
            FlightStatus::Boarding,
            FlightStatus::Departed,
            FlightStatus::Arrived,
            FlightStatus::Delayed,
            FlightStatus::Cancelled,
        ] {
            assert_eq!(FlightStatus::from_str(s.as_str()), Some(s));
        }
        assert_eq!(FlightStatus::from_str("diverted"), None);
    }
}
