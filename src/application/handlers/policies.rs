//! Policy lookup and reference-data operations.
//!
//! The policy query is a keyword classifier over a static table; there is
//! no retrieval model behind it and no free-text generation.

use serde_json::{json, Value};

use crate::application::{reconcile, Services};
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::model::{AirlinePolicy, CabinClass, RouteType};

const QUERY_KEYS: &[&str] = &["query", "question", "topic"];

/// Keyword table mapping query terms to policy categories. First hit wins,
/// scanning in table order.
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("baggage", &["baggage", "luggage", "bag", "suitcase", "carry-on", "carry on"]),
    ("cancellation", &["cancel", "cancellation", "refund"]),
    ("changes", &["change", "reschedule", "rebook", "modify"]),
    ("check_in", &["check-in", "check in", "boarding pass", "boarding"]),
    ("seating", &["seat", "legroom", "exit row"]),
    ("pets", &["pet", "animal", "dog", "cat"]),
    ("children", &["child", "children", "infant", "minor", "unaccompanied"]),
];

fn classify_category(query: &str) -> Option<&'static str> {
    let lowered = query.to_lowercase();
    CATEGORY_KEYWORDS
        .iter()
        .find(|(_, needles)| needles.iter().any(|n| lowered.contains(n)))
        .map(|(category, _)| *category)
}

fn classify_route_type(query: &str) -> Option<RouteType> {
    let lowered = query.to_lowercase();
    if lowered.contains("international") {
        Some(RouteType::International)
    } else if lowered.contains("domestic") {
        Some(RouteType::Domestic)
    } else {
        None
    }
}

fn classify_cabin_class(query: &str) -> Option<CabinClass> {
    let lowered = query.to_lowercase();
    if lowered.contains("first class") || lowered.contains("first-class") {
        Some(CabinClass::First)
    } else if lowered.contains("business") {
        Some(CabinClass::Business)
    } else if lowered.contains("premium economy") {
        Some(CabinClass::PremiumEconomy)
    } else if lowered.contains("economy") {
        Some(CabinClass::Economy)
    } else {
        None
    }
}

fn policy_json(policy: &AirlinePolicy) -> Value {
    json!({
        "category": policy.category,
        "title": policy.title,
        "body": policy.body,
        "route_type": policy.route_type,
        "cabin_class": policy.cabin_class,
    })
}

/// `query_policy_rag_db` - classifies the question into a policy category
/// and returns the matching rows. An unclassifiable question falls back to
/// the general policy set rather than erroring.
pub async fn query_policy_rag_db(services: Services, params: Value) -> Result<Value, DomainError> {
    let query = reconcile::require_str(&params, QUERY_KEYS)?;

    let category = classify_category(query);
    let route_type = classify_route_type(query).or_else(|| reconcile::route_type_hint(&params));
    let cabin_class = classify_cabin_class(query);

    let mut matched = services
        .policies
        .find(category, route_type, cabin_class)
        .await?;
    let fell_back = matched.is_empty();
    if fell_back {
        matched = services.policies.find(None, None, None).await?;
    }

    Ok(json!({
        "query": query,
        "matched_category": category,
        "policies": matched.iter().map(policy_json).collect::<Vec<_>>(),
        "note": if fell_back {
            Some("No specific policy matched; showing general policies")
        } else {
            None
        },
    }))
}

/// `get_airport_info` - one airport by IATA code or city name.
pub async fn get_airport_info(services: Services, params: Value) -> Result<Value, DomainError> {
    let raw = reconcile::require_str(&params, &["airport", "airport_code", "iata_code", "city"])?;
    let airport = reconcile::resolve_airport(services.reference_data.as_ref(), raw)
        .await?
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::InvalidParameter,
                format!("Unknown airport '{}'", raw),
            )
        })?;

    Ok(json!({
        "airport": {
            "iata_code": airport.iata_code,
            "icao_code": airport.icao_code,
            "name": airport.name,
            "city": airport.city,
            "country": airport.country,
            "timezone": airport.timezone,
            "latitude": airport.latitude,
            "longitude": airport.longitude,
        },
    }))
}

/// `get_airline_info` - one airline by IATA code or name.
pub async fn get_airline_info(services: Services, params: Value) -> Result<Value, DomainError> {
    let raw = reconcile::require_str(&params, &["airline", "airline_code", "airline_name"])?;
    let airline = if raw.len() == 2 {
        services
            .reference_data
            .airline_by_iata(&raw.to_uppercase())
            .await?
    } else {
        services
            .reference_data
            .airlines_by_name(raw)
            .await?
            .into_iter()
            .next()
    };
    let airline = airline.ok_or_else(|| {
        DomainError::new(
            ErrorCode::InvalidParameter,
            format!("Unknown airline '{}'", raw),
        )
    })?;

    Ok(json!({
        "airline": {
            "iata_code": airline.iata_code,
            "icao_code": airline.icao_code,
            "name": airline.name,
            "country": airline.country,
            "alliance": airline.alliance,
        },
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baggage_queries_classify_as_baggage() {
        assert_eq!(classify_category("How much checked luggage can I bring?"), Some("baggage"));
        assert_eq!(classify_category("carry-on size limits"), Some("baggage"));
    }

    #[test]
    fn cancellation_beats_changes_for_refund_questions() {
        assert_eq!(classify_category("Can I get a refund?"), Some("cancellation"));
    }

    #[test]
    fn unmatched_queries_classify_as_none() {
        assert_eq!(classify_category("What movies are on board?"), None);
    }

    #[test]
    fn route_and_class_hints_are_extracted() {
        assert_eq!(
            classify_route_type("baggage on international flights"),
            Some(RouteType::International)
        );
        assert_eq!(
            classify_cabin_class("business class baggage"),
            Some(CabinClass::Business)
        );
        assert_eq!(
            classify_cabin_class("premium economy seats"),
            Some(CabinClass::PremiumEconomy)
        );
    }
}
