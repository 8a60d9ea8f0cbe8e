//! Operation registry and dispatcher.
//!
//! A static name-to-handler map built once at startup and read-only after.
//! Near-synonym operation names route to one canonical handler via the
//! alias table. The dispatcher owns envelope construction, the soft request
//! budget, and the panic boundary; handlers only ever see domain values.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::Value;
use tracing::Instrument;

use crate::domain::foundation::{DomainError, ErrorCode};

use super::envelope::Envelope;
use super::handlers;
use super::Services;

/// Grouping reported by `/service-info`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OperationCategory {
    Flights,
    Bookings,
    CheckIn,
    Seating,
    Baggage,
    Refunds,
    Insurance,
    Trips,
    Policies,
    CustomerService,
}

impl OperationCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationCategory::Flights => "flights",
            OperationCategory::Bookings => "bookings",
            OperationCategory::CheckIn => "check_in",
            OperationCategory::Seating => "seating",
            OperationCategory::Baggage => "baggage",
            OperationCategory::Refunds => "refunds",
            OperationCategory::Insurance => "insurance",
            OperationCategory::Trips => "trips",
            OperationCategory::Policies => "policies",
            OperationCategory::CustomerService => "customer_service",
        }
    }
}

type HandlerFuture = Pin<Box<dyn Future<Output = Result<Value, DomainError>> + Send>>;
type HandlerFn = Arc<dyn Fn(Services, Value) -> HandlerFuture + Send + Sync>;

struct Registration {
    name: &'static str,
    category: OperationCategory,
    handler: HandlerFn,
}

/// The operation map. Construct with [`OperationRegistry::standard`].
pub struct OperationRegistry {
    operations: HashMap<&'static str, Arc<Registration>>,
    aliases: HashMap<&'static str, &'static str>,
}

macro_rules! op {
    ($reg:expr, $cat:expr, $name:literal, $func:path) => {
        $reg.register($name, $cat, Arc::new(|svc, params| Box::pin($func(svc, params))));
    };
    ($reg:expr, $cat:expr, $name:literal, $func:path, aliases = [$($alias:literal),+ $(,)?]) => {
        op!($reg, $cat, $name, $func);
        $( $reg.alias($alias, $name); )+
    };
}

impl OperationRegistry {
    fn new() -> Self {
        Self {
            operations: HashMap::new(),
            aliases: HashMap::new(),
        }
    }

    /// The full production operation set.
    pub fn standard() -> Self {
        use OperationCategory::*;
        let mut reg = Self::new();

        op!(reg, Flights, "search_flight", handlers::flights::search_flight,
            aliases = ["search_flights"]);
        op!(reg, Flights, "get_flight_details", handlers::flights::get_flight_details);
        op!(reg, Flights, "get_flight_status", handlers::flights::get_flight_status,
            aliases = ["check_flight_status"]);
        op!(reg, Flights, "check_flight_availability", handlers::flights::check_flight_availability);
        op!(reg, Flights, "search_flight_prices", handlers::flights::search_flight_prices,
            aliases = ["get_flight_prices"]);
        op!(reg, Flights, "get_arrival_time", handlers::flights::get_arrival_time,
            aliases = ["check_arrival_time"]);
        op!(reg, Flights, "get_departure_time", handlers::flights::get_departure_time,
            aliases = ["check_departure_time"]);

        op!(reg, Bookings, "book_flight", handlers::bookings::book_flight,
            aliases = ["book_ticket", "purchase_flight"]);
        op!(reg, Bookings, "get_booking_details", handlers::bookings::get_booking_details,
            aliases = ["get_reservation_details"]);
        op!(reg, Bookings, "cancel_booking", handlers::bookings::cancel_booking,
            aliases = ["cancel_flight", "cancel_reservation"]);
        op!(reg, Bookings, "change_flight", handlers::bookings::change_flight,
            aliases = ["change_booking"]);
        op!(reg, Bookings, "confirm_flight_change", handlers::bookings::confirm_flight_change);
        op!(reg, Bookings, "update_passenger_details", handlers::bookings::update_passenger_details,
            aliases = ["update_contact_info"]);

        op!(reg, CheckIn, "check_in_passenger", handlers::checkin::check_in_passenger,
            aliases = ["check_in"]);
        op!(reg, CheckIn, "get_boarding_pass", handlers::checkin::get_boarding_pass);
        op!(reg, CheckIn, "resend_boarding_pass", handlers::checkin::resend_boarding_pass);
        op!(reg, CheckIn, "get_check_in_info", handlers::checkin::get_check_in_info);

        op!(reg, Seating, "change_seat", handlers::seats::change_seat,
            aliases = ["choose_seat"]);
        op!(reg, Seating, "get_seat_map", handlers::seats::get_seat_map,
            aliases = ["get_available_seats"]);

        op!(reg, Baggage, "check_baggage_allowance", handlers::baggage::check_baggage_allowance);
        op!(reg, Baggage, "get_airline_checkin_baggage_info",
            handlers::baggage::get_airline_checkin_baggage_info);
        op!(reg, Baggage, "add_baggage", handlers::baggage::add_baggage,
            aliases = ["purchase_baggage_allowance"]);
        op!(reg, Baggage, "get_baggage_status", handlers::baggage::get_baggage_status,
            aliases = ["track_baggage"]);

        op!(reg, Refunds, "initiate_refund", handlers::refunds::initiate_refund,
            aliases = ["request_refund"]);
        op!(reg, Refunds, "get_refund_status", handlers::refunds::get_refund_status);

        op!(reg, Insurance, "purchase_flight_insurance",
            handlers::insurance::purchase_flight_insurance,
            aliases = ["buy_insurance"]);
        op!(reg, Insurance, "get_insurance_details", handlers::insurance::get_insurance_details);

        op!(reg, Trips, "search_trip_packages", handlers::trips::search_trip_packages);
        op!(reg, Trips, "get_trip_package_details", handlers::trips::get_trip_package_details);
        op!(reg, Trips, "book_trip_package", handlers::trips::book_trip_package);
        op!(reg, Trips, "get_trip_booking_details", handlers::trips::get_trip_booking_details);
        op!(reg, Trips, "cancel_trip_package", handlers::trips::cancel_trip_package);
        op!(reg, Trips, "search_excursions", handlers::trips::search_excursions);
        op!(reg, Trips, "book_excursion", handlers::trips::book_excursion);

        op!(reg, Policies, "query_policy_rag_db", handlers::policies::query_policy_rag_db,
            aliases = ["get_airline_policy"]);
        op!(reg, Policies, "get_airport_info", handlers::policies::get_airport_info);
        op!(reg, Policies, "get_airline_info", handlers::policies::get_airline_info);

        op!(reg, CustomerService, "escalate_to_human_agent",
            handlers::service::escalate_to_human_agent);
        op!(reg, CustomerService, "schedule_callback", handlers::service::schedule_callback);
        op!(reg, CustomerService, "file_complaint", handlers::service::file_complaint);
        op!(reg, CustomerService, "get_frequent_flyer_info",
            handlers::service::get_frequent_flyer_info);

        reg
    }

    fn register(&mut self, name: &'static str, category: OperationCategory, handler: HandlerFn) {
        let previous = self.operations.insert(
            name,
            Arc::new(Registration { name, category, handler }),
        );
        debug_assert!(previous.is_none(), "duplicate operation name: {}", name);
    }

    fn alias(&mut self, alias: &'static str, canonical: &'static str) {
        debug_assert!(
            self.operations.contains_key(canonical),
            "alias '{}' targets unregistered operation '{}'",
            alias,
            canonical
        );
        self.aliases.insert(alias, canonical);
    }

    fn resolve(&self, name: &str) -> Option<&Arc<Registration>> {
        let canonical = self.aliases.get(name).copied().unwrap_or(name);
        self.operations.get(canonical)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.operations.len() + self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Canonical operation names, sorted.
    pub fn operation_names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.operations.keys().copied().collect();
        names.sort_unstable();
        names
    }

    /// Alias -> canonical pairs, sorted by alias.
    pub fn alias_table(&self) -> Vec<(&'static str, &'static str)> {
        let mut pairs: Vec<_> = self.aliases.iter().map(|(a, c)| (*a, *c)).collect();
        pairs.sort_unstable();
        pairs
    }

    /// Canonical operation counts per category.
    pub fn category_counts(&self) -> BTreeMap<&'static str, usize> {
        let mut counts = BTreeMap::new();
        for reg in self.operations.values() {
            *counts.entry(reg.category.as_str()).or_insert(0) += 1;
        }
        counts
    }

    /// Runs one operation to an envelope. Domain errors keep their code;
    /// panics and infrastructure failures surface as `Internal` with details
    /// logged, never returned; exceeding `budget` is `DeadlineExceeded`.
    pub async fn dispatch(
        &self,
        services: &Services,
        name: &str,
        params: Value,
        budget: Duration,
    ) -> Envelope {
        let Some(registration) = self.resolve(name) else {
            return Envelope::from_error(&DomainError::new(
                ErrorCode::UnknownOperation,
                format!("Unknown operation '{}'", name),
            ));
        };

        let span = tracing::info_span!("operation", operation = registration.name);
        let future = (registration.handler)(services.clone(), params);
        let guarded = std::panic::AssertUnwindSafe(future).catch_unwind();

        match tokio::time::timeout(budget, guarded).instrument(span).await {
            Err(_elapsed) => Envelope::from_error(&DomainError::new(
                ErrorCode::DeadlineExceeded,
                format!("Operation '{}' exceeded the request budget", registration.name),
            )),
            Ok(Err(_panic)) => {
                tracing::error!(operation = registration.name, "handler panicked");
                Envelope::from_error(&DomainError::internal("handler panicked"))
            }
            Ok(Ok(Ok(data))) => Envelope::success(data),
            Ok(Ok(Err(err))) => {
                if err.code == ErrorCode::Internal {
                    tracing::error!(
                        operation = registration.name,
                        error = %err,
                        details = ?err.details,
                        "operation failed"
                    );
                } else {
                    tracing::debug!(operation = registration.name, error = %err, "domain error");
                }
                Envelope::from_error(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_covers_the_catalog() {
        let reg = OperationRegistry::standard();
        assert!(reg.len() >= 60, "expected ~60 operations, got {}", reg.len());
        for name in [
            "search_flight",
            "book_flight",
            "cancel_booking",
            "check_in_passenger",
            "change_seat",
            "initiate_refund",
            "check_baggage_allowance",
            "query_policy_rag_db",
            "escalate_to_human_agent",
        ] {
            assert!(reg.contains(name), "missing {}", name);
        }
    }

    #[test]
    fn aliases_route_to_canonical_operations() {
        let reg = OperationRegistry::standard();
        for (alias, canonical) in reg.alias_table() {
            assert!(
                reg.operation_names().contains(&canonical),
                "alias {} points at missing {}",
                alias,
                canonical
            );
            assert!(reg.contains(alias));
        }
        assert!(reg.contains("cancel_flight"));
        assert!(reg.contains("book_ticket"));
    }

    #[test]
    fn unknown_names_do_not_resolve() {
        let reg = OperationRegistry::standard();
        assert!(!reg.contains("order_pizza"));
    }

    #[test]
    fn category_counts_cover_every_category() {
        let reg = OperationRegistry::standard();
        let counts = reg.category_counts();
        assert_eq!(counts.len(), 10);
        assert!(counts.values().all(|&c| c > 0));
    }
}
