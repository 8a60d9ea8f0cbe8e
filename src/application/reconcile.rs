//! Parameter reconciliation.
//!
//! Client requests carry a flat, alias-rich parameter bag. This module turns
//! that bag into canonical lookup keys: one booking identifier out of four
//! aliases, one passenger out of a four-step fallback chain, one airport out
//! of an IATA code or a city name. Normalization is pure; the `resolve_*`
//! functions perform the declared lookups and nothing else.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde_json::Value;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::model::{Airport, CabinClass, Passenger, RouteType};
use crate::domain::foundation::refs;
use crate::ports::ReferenceDataStore;

use super::Services;

/// Alias order for the booking identifier; first non-empty wins.
const BOOKING_REFERENCE_ALIASES: &[&str] = &[
    "booking_reference",
    "confirmation_number",
    "confirmation_id",
    "reservation_id",
];

const EMAIL_KEYS: &[&str] = &["email", "passenger_email", "contact_email"];
const NAME_KEYS: &[&str] = &["passenger_name", "full_name", "name"];
const LAST_NAME_KEYS: &[&str] = &["last_name", "surname"];
const FLIGHT_NUMBER_KEYS: &[&str] = &["flight_number", "flight"];

/// First non-empty string under any of the keys, trimmed.
pub fn opt_str<'a>(params: &'a Value, keys: &[&str]) -> Option<&'a str> {
    keys.iter()
        .filter_map(|k| params.get(k))
        .filter_map(|v| v.as_str())
        .map(str::trim)
        .find(|s| !s.is_empty())
}

/// A required string parameter under any of the keys.
pub fn require_str<'a>(params: &'a Value, keys: &[&str]) -> Result<&'a str, DomainError> {
    opt_str(params, keys).ok_or_else(|| {
        DomainError::invalid_parameter(keys[0], format!("Missing required parameter '{}'", keys[0]))
    })
}

/// The canonical booking identifier, uppercased and format-checked.
pub fn booking_reference(params: &Value) -> Result<String, DomainError> {
    opt_booking_reference(params)?.ok_or_else(|| {
        DomainError::invalid_parameter(
            "booking_reference",
            "A booking reference (or confirmation number) is required",
        )
    })
}

/// As [`booking_reference`] but absent is not an error.
pub fn opt_booking_reference(params: &Value) -> Result<Option<String>, DomainError> {
    let Some(raw) = opt_str(params, BOOKING_REFERENCE_ALIASES) else {
        return Ok(None);
    };
    let normalized = raw.to_uppercase();
    if !refs::is_lookup_reference(&normalized) {
        return Err(DomainError::invalid_parameter(
            "booking_reference",
            format!("'{}' is not a valid booking reference", raw),
        ));
    }
    Ok(Some(normalized))
}

/// Strict `YYYY-MM-DD` date. Natural-language phrases ("today",
/// "next Friday") are rejected; callers must resolve them before the wire.
pub fn date(params: &Value, keys: &[&str]) -> Result<NaiveDate, DomainError> {
    opt_date(params, keys)?.ok_or_else(|| {
        DomainError::invalid_parameter(keys[0], format!("Missing required date '{}'", keys[0]))
    })
}

/// As [`date`] but absent is not an error.
pub fn opt_date(params: &Value, keys: &[&str]) -> Result<Option<NaiveDate>, DomainError> {
    let Some(raw) = opt_str(params, keys) else {
        return Ok(None);
    };
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| {
            DomainError::invalid_parameter(
                keys[0],
                format!("'{}' is not a date; dates must be YYYY-MM-DD", raw),
            )
        })
}

/// Class of service with marketing synonyms folded in.
pub fn parse_cabin_class(raw: &str) -> Result<CabinClass, DomainError> {
    let lowered = raw.trim().to_lowercase().replace([' ', '-'], "_");
    let canonical = match lowered.as_str() {
        "coach" | "basic" => "economy",
        "premium" => "business",
        "luxury" => "first",
        other => other,
    };
    CabinClass::from_str(canonical).ok_or_else(|| {
        DomainError::invalid_parameter("class", format!("Unknown class of service '{}'", raw))
    })
}

/// Optional class under the usual keys.
pub fn cabin_class(params: &Value) -> Result<Option<CabinClass>, DomainError> {
    match opt_str(params, &["class", "cabin_class", "travel_class", "class_of_service"]) {
        Some(raw) => parse_cabin_class(raw).map(Some),
        None => Ok(None),
    }
}

/// Traveler counts; infants bill at 10%, children at 75%.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartySize {
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl PartySize {
    pub fn total(&self) -> u32 {
        self.adults + self.children + self.infants
    }

    /// Fare multiplier for the whole party.
    pub fn billing_weight(&self) -> Decimal {
        Decimal::from(self.adults)
            + Decimal::from(self.children) * Decimal::new(75, 2)
            + Decimal::from(self.infants) * Decimal::new(10, 2)
    }
}

impl Default for PartySize {
    fn default() -> Self {
        Self { adults: 1, children: 0, infants: 0 }
    }
}

/// Accepts an integer `passengers` or an `{adults, children, infants}`
/// mapping; absent means one adult.
pub fn party_size(params: &Value) -> Result<PartySize, DomainError> {
    match params.get("passengers") {
        None => Ok(PartySize::default()),
        Some(Value::Number(n)) => {
            let count = n.as_u64().ok_or_else(|| {
                DomainError::invalid_parameter("passengers", "Passenger count must be a positive integer")
            })?;
            if count == 0 || count > 9 {
                return Err(DomainError::invalid_parameter(
                    "passengers",
                    "Passenger count must be between 1 and 9",
                ));
            }
            Ok(PartySize { adults: count as u32, children: 0, infants: 0 })
        }
        Some(Value::Object(map)) => {
            let field = |key: &str| -> Result<u32, DomainError> {
                match map.get(key) {
                    None => Ok(0),
                    Some(v) => v
                        .as_u64()
                        .map(|n| n as u32)
                        .ok_or_else(|| {
                            DomainError::invalid_parameter(
                                "passengers",
                                format!("'{}' must be a non-negative integer", key),
                            )
                        }),
                }
            };
            let party = PartySize {
                adults: field("adults")?,
                children: field("children")?,
                infants: field("infants")?,
            };
            if party.total() == 0 {
                return Err(DomainError::invalid_parameter(
                    "passengers",
                    "At least one traveler is required",
                ));
            }
            Ok(party)
        }
        Some(_) => Err(DomainError::invalid_parameter(
            "passengers",
            "Expected an integer or an {adults, children, infants} object",
        )),
    }
}

/// Explicit route type, when the caller supplies one.
pub fn route_type_hint(params: &Value) -> Option<RouteType> {
    opt_str(params, &["route_type"]).and_then(RouteType::from_str)
}

fn looks_like_iata(value: &str) -> bool {
    value.len() == 3 && value.bytes().all(|b| b.is_ascii_alphabetic())
}

/// Resolves one airport identifier: an exact IATA match wins; otherwise the
/// value is treated as a city substring and the first match (by IATA order)
/// is taken. Unknown values resolve to `None` so searches can degrade to an
/// empty result rather than an error.
pub async fn resolve_airport(
    store: &dyn ReferenceDataStore,
    value: &str,
) -> Result<Option<Airport>, DomainError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    if looks_like_iata(value) {
        if let Some(airport) = store.airport_by_iata(value).await? {
            return Ok(Some(airport));
        }
    }
    let mut matches = store.airports_by_city(value).await?;
    matches.sort_by(|a, b| a.iata_code.cmp(&b.iata_code));
    Ok(matches.into_iter().next())
}

/// Resolves the passenger through the fallback chain:
/// booking reference, then email, then full name, then last name joined
/// against a flight number. Exhaustion is `PassengerNotFound`.
pub async fn resolve_passenger(
    services: &Services,
    params: &Value,
) -> Result<Passenger, DomainError> {
    if let Some(reference) = opt_booking_reference(params)? {
        if let Some(detail) = services.bookings.by_reference(&reference).await? {
            return Ok(detail.passenger);
        }
    }

    if let Some(email) = opt_str(params, EMAIL_KEYS) {
        if let Some(passenger) = services.passengers.by_email(email).await? {
            return Ok(passenger);
        }
    }

    if let Some(full_name) = opt_str(params, NAME_KEYS) {
        let tokens: Vec<&str> = full_name.split_whitespace().collect();
        if tokens.len() >= 2 {
            let first = tokens[0];
            let last = tokens[tokens.len() - 1];
            let found = services.passengers.by_name(first, last).await?;
            if let Some(passenger) = found.into_iter().next() {
                return Ok(passenger);
            }
        }
    }

    if let (Some(last), Some(flight)) = (
        opt_str(params, LAST_NAME_KEYS),
        opt_str(params, FLIGHT_NUMBER_KEYS),
    ) {
        if let Some(passenger) = services
            .passengers
            .by_last_name_and_flight(last, flight)
            .await?
        {
            return Ok(passenger);
        }
    }

    Err(DomainError::new(
        ErrorCode::PassengerNotFound,
        "Could not identify a passenger from the provided details",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn booking_reference_alias_order() {
        let params = json!({
            "reservation_id": "ZZZZ99",
            "confirmation_number": "ABC123"
        });
        assert_eq!(booking_reference(&params).unwrap(), "ABC123");
    }

    #[test]
    fn booking_reference_is_uppercased() {
        let params = json!({"booking_reference": "abc123"});
        assert_eq!(booking_reference(&params).unwrap(), "ABC123");
    }

    #[test]
    fn empty_alias_falls_through() {
        let params = json!({"booking_reference": "  ", "confirmation_id": "XY12"});
        assert_eq!(booking_reference(&params).unwrap(), "XY12");
    }

    #[test]
    fn malformed_reference_is_invalid_parameter() {
        let params = json!({"booking_reference": "AB!"});
        let err = booking_reference(&params).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
    }

    #[test]
    fn missing_reference_is_invalid_parameter() {
        let err = booking_reference(&json!({})).unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidParameter);
    }

    #[test]
    fn strict_dates_only() {
        let ok = date(&json!({"departure_date": "2025-08-10"}), &["departure_date"]);
        assert_eq!(ok.unwrap(), NaiveDate::from_ymd_opt(2025, 8, 10).unwrap());

        for bad in ["today", "next Friday", "10/08/2025", "2025-8-1x"] {
            let err = date(&json!({"departure_date": bad}), &["departure_date"]).unwrap_err();
            assert_eq!(err.code, ErrorCode::InvalidParameter, "{}", bad);
        }
    }

    #[test]
    fn cabin_class_synonyms() {
        assert_eq!(parse_cabin_class("coach").unwrap(), CabinClass::Economy);
        assert_eq!(parse_cabin_class("BASIC").unwrap(), CabinClass::Economy);
        assert_eq!(parse_cabin_class("premium").unwrap(), CabinClass::Business);
        assert_eq!(parse_cabin_class("luxury").unwrap(), CabinClass::First);
        assert_eq!(parse_cabin_class("Premium Economy").unwrap(), CabinClass::PremiumEconomy);
        assert!(parse_cabin_class("steerage").is_err());
    }

    #[test]
    fn party_size_integer_form() {
        let p = party_size(&json!({"passengers": 3})).unwrap();
        assert_eq!(p, PartySize { adults: 3, children: 0, infants: 0 });
        assert_eq!(p.billing_weight(), Decimal::from(3));
    }

    #[test]
    fn party_size_structured_form_weights() {
        let p = party_size(&json!({"passengers": {"adults": 2, "children": 1, "infants": 1}}))
            .unwrap();
        assert_eq!(p.total(), 4);
        // 2 + 0.75 + 0.10
        assert_eq!(p.billing_weight(), "2.85".parse::<Decimal>().unwrap());
    }

    #[test]
    fn party_size_defaults_to_one_adult() {
        assert_eq!(party_size(&json!({})).unwrap(), PartySize::default());
    }

    #[test]
    fn party_size_rejects_zero_and_garbage() {
        assert!(party_size(&json!({"passengers": 0})).is_err());
        assert!(party_size(&json!({"passengers": "two"})).is_err());
        assert!(party_size(&json!({"passengers": {"adults": 0}})).is_err());
    }

    #[test]
    fn iata_shape_detection() {
        assert!(looks_like_iata("JFK"));
        assert!(looks_like_iata("ord"));
        assert!(!looks_like_iata("Chicago"));
        assert!(!looks_like_iata("J1K"));
    }
}
