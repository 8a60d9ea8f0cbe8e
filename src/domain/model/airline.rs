//! Airlines, airports, aircraft, and routes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// An operating airline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airline {
    pub id: i64,
    /// Two-letter IATA code, unique.
    pub iata_code: String,
    /// Three-letter ICAO code, unique.
    pub icao_code: String,
    pub name: String,
    pub country: String,
    pub alliance: Option<String>,
}

/// An airport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    pub id: i64,
    /// Three-letter IATA code, unique.
    pub iata_code: String,
    pub icao_code: String,
    pub name: String,
    pub city: String,
    pub country: String,
    pub timezone: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
}

/// An aircraft type; (manufacturer, model) is unique.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AircraftType {
    pub id: i64,
    pub manufacturer: String,
    pub model: String,
    pub seats_economy: i32,
    pub seats_premium_economy: i32,
    pub seats_business: i32,
    pub seats_first: i32,
    pub total_seats: i32,
    pub range_km: i32,
}

/// Operating status of an airframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AircraftStatus {
    Active,
    Maintenance,
    Retired,
}

impl AircraftStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AircraftStatus::Active => "active",
            AircraftStatus::Maintenance => "maintenance",
            AircraftStatus::Retired => "retired",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "active" => Some(AircraftStatus::Active),
            "maintenance" => Some(AircraftStatus::Maintenance),
            "retired" => Some(AircraftStatus::Retired),
            _ => None,
        }
    }
}

/// A registered airframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aircraft {
    pub id: i64,
    /// Registration mark, unique.
    pub registration: String,
    pub aircraft_type_id: i64,
    pub airline_id: i64,
    pub status: AircraftStatus,
    pub delivery_date: Option<NaiveDate>,
}

/// An ordered origin/destination pair; unique per pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: i64,
    pub origin_airport_id: i64,
    pub destination_airport_id: i64,
    pub distance_km: i32,
    pub duration_minutes: i32,
}

/// Domestic iff origin and destination share a country.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteType {
    Domestic,
    International,
}

impl RouteType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteType::Domestic => "domestic",
            RouteType::International => "international",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "domestic" => Some(RouteType::Domestic),
            "international" => Some(RouteType::International),
            _ => None,
        }
    }

    /// Infers the route type from the two endpoint countries.
    pub fn from_countries(origin_country: &str, destination_country: &str) -> Self {
        if origin_country.eq_ignore_ascii_case(destination_country) {
            RouteType::Domestic
        } else {
            RouteType::International
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn route_type_inference_ignores_case() {
        assert_eq!(RouteType::from_countries("USA", "usa"), RouteType::Domestic);
        assert_eq!(
            RouteType::from_countries("USA", "Spain"),
            RouteType::International
        );
    }

    #[test]
    fn aircraft_status_round_trips_through_strings() {
        for s in [AircraftStatus::Active, AircraftStatus::Maintenance, AircraftStatus::Retired] {
            assert_eq!(AircraftStatus::from_str(s.as_str()), Some(s));
        }
        assert_eq!(AircraftStatus::from_str("scrapped"), None);
    }
}
