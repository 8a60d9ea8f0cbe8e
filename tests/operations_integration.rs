//! End-to-end operation tests through the dispatcher.
//!
//! Every scenario goes through `OperationRegistry::dispatch` against the
//! in-memory stores, exactly as the HTTP surface would drive it: JSON
//! parameters in, envelope out. No store is touched directly except to seed
//! fixtures.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use aerodesk::adapters::memory::InMemoryOpsStore;
use aerodesk::application::{Envelope, OperationRegistry, Services};
use aerodesk::domain::foundation::ErrorCode;
use aerodesk::domain::model::{
    Aircraft, AircraftStatus, AircraftType, Airline, Airport, CabinClass, Flight, FlightSeat,
    FlightStatus, Passenger, PassengerTier, Route, SeatMapRow, SeatStatus, SeatType,
};
use aerodesk::ports::BookingStore;

// =============================================================================
// Fixtures
// =============================================================================

struct World {
    store: Arc<InMemoryOpsStore>,
    services: Services,
    registry: OperationRegistry,
    airline_id: i64,
    aircraft_id: i64,
    route_id: i64,
    passenger_id: i64,
}

impl World {
    fn new() -> Self {
        let store = Arc::new(InMemoryOpsStore::new());

        let origin_id = store.add_airport(Airport {
            id: 0,
            iata_code: "JFK".into(),
            icao_code: "KJFK".into(),
            name: "John F. Kennedy International".into(),
            city: "New York".into(),
            country: "USA".into(),
            timezone: "America/New_York".into(),
            latitude: "40.6413".parse().unwrap(),
            longitude: "-73.7781".parse().unwrap(),
        });
        let destination_id = store.add_airport(Airport {
            id: 0,
            iata_code: "LAX".into(),
            icao_code: "KLAX".into(),
            name: "Los Angeles International".into(),
            city: "Los Angeles".into(),
            country: "USA".into(),
            timezone: "America/Los_Angeles".into(),
            latitude: "33.9416".parse().unwrap(),
            longitude: "-118.4085".parse().unwrap(),
        });
        let airline_id = store.add_airline(Airline {
            id: 0,
            iata_code: "HJ".into(),
            icao_code: "HJA".into(),
            name: "HorizonJet".into(),
            country: "USA".into(),
            alliance: None,
        });
        let aircraft_type_id = store.add_aircraft_type(AircraftType {
            id: 0,
            manufacturer: "Airbus".into(),
            model: "A321neo".into(),
            seats_economy: 180,
            seats_premium_economy: 0,
            seats_business: 16,
            seats_first: 0,
            total_seats: 196,
            range_km: 7400,
        });
        let aircraft_id = store.add_aircraft(Aircraft {
            id: 0,
            registration: "N321HJ".into(),
            aircraft_type_id,
            airline_id,
            status: AircraftStatus::Active,
            delivery_date: None,
        });
        let route_id = store.add_route(Route {
            id: 0,
            origin_airport_id: origin_id,
            destination_airport_id: destination_id,
            distance_km: 3000,
            duration_minutes: 360,
        });
        let passenger_id = store.add_passenger(Passenger {
            id: 0,
            first_name: "Ava".into(),
            last_name: "Martinez".into(),
            email: "ava@example.com".into(),
            phone: Some("+1-555-0100".into()),
            date_of_birth: None,
            nationality: Some("USA".into()),
            passport_number: None,
            frequent_flyer_number: Some("HJ123456".into()),
            tier: PassengerTier::Gold,
        });

        for (seat_number, seat_type, class) in [
            ("10A", SeatType::Window, CabinClass::Economy),
            ("10B", SeatType::Middle, CabinClass::Economy),
            ("12C", SeatType::Aisle, CabinClass::Economy),
            ("2A", SeatType::Window, CabinClass::Business),
        ] {
            store.add_seat_map_row(SeatMapRow {
                id: 0,
                aircraft_type_id,
                seat_number: seat_number.into(),
                seat_type,
                cabin_class: class,
                exit_row: false,
                extra_legroom: false,
                blocked: false,
            });
        }

        let services = Services {
            reference_data: store.clone(),
            flights: store.clone(),
            bookings: store.clone(),
            passengers: store.clone(),
            refunds: store.clone(),
            insurance: store.clone(),
            trips: store.clone(),
            policies: store.clone(),
            service_log: store.clone(),
        };
        World {
            store,
            services,
            registry: OperationRegistry::standard(),
            airline_id,
            aircraft_id,
            route_id,
            passenger_id,
        }
    }

    /// Seeds flight HJ100 departing at the given instant; returns its id.
    fn add_flight_departing(&self, departure: DateTime<Utc>) -> i64 {
        self.store.add_flight(Flight {
            id: 0,
            flight_number: "HJ100".into(),
            airline_id: self.airline_id,
            aircraft_id: self.aircraft_id,
            route_id: self.route_id,
            scheduled_departure: departure,
            scheduled_arrival: departure + chrono::Duration::hours(6),
            actual_departure: None,
            actual_arrival: None,
            status: FlightStatus::Scheduled,
            gate: Some("B12".into()),
            terminal: Some("4".into()),
        })
    }

    async fn dispatch(&self, operation: &str, params: Value) -> Envelope {
        self.registry
            .dispatch(&self.services, operation, params, Duration::from_secs(5))
            .await
    }

    /// Books HJ100 for the seeded passenger; returns the booking reference
    /// and the success payload.
    async fn book(&self, departure: DateTime<Utc>) -> (String, Value) {
        let payload = data(
            self.dispatch(
                "book_flight",
                json!({
                    "email": "ava@example.com",
                    "flight_number": "HJ100",
                    "departure_date": departure.date_naive().to_string(),
                }),
            )
            .await,
        );
        let reference = payload["booking_reference"].as_str().unwrap().to_string();
        (reference, payload)
    }
}

fn data(envelope: Envelope) -> Value {
    match envelope {
        Envelope::Success { data } => data,
        Envelope::Error { message, code, .. } => {
            panic!("expected success, got {:?}: {}", code, message)
        }
    }
}

fn error_code(envelope: Envelope) -> String {
    match envelope {
        Envelope::Error { code, .. } => code.expect("error without a code"),
        Envelope::Success { data } => panic!("expected error, got success: {}", data),
    }
}

/// Money serializes as `{amount, currency}`; the amount may be a string.
fn amount(v: &Value) -> Decimal {
    match &v["amount"] {
        Value::String(s) => s.parse().unwrap(),
        Value::Number(n) => n.to_string().parse().unwrap(),
        other => panic!("not a money value: {}", other),
    }
}

// =============================================================================
// Booking lifecycle
// =============================================================================

#[tokio::test]
async fn book_flight_round_trips_through_booking_details() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::days(10);
    world.add_flight_departing(departure);

    let (reference, payload) = world.book(departure).await;
    assert!(Regex::new(r"^[A-Z0-9]{6}$").unwrap().is_match(&reference));
    assert_eq!(payload["status"], "confirmed");

    let details = data(
        world
            .dispatch("get_booking_details", json!({"booking_reference": reference}))
            .await,
    );
    assert_eq!(details["reference"].as_str().unwrap(), reference);
    assert_eq!(details["passenger"]["email"], "ava@example.com");
    assert_eq!(details["segments"].as_array().unwrap().len(), 1);
    assert_eq!(details["segments"][0]["flight_number"], "HJ100");
}

#[tokio::test]
async fn booking_lookup_accepts_confirmation_number_alias() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::days(10);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    let details = data(
        world
            .dispatch(
                "get_reservation_details",
                json!({"confirmation_number": reference.to_lowercase()}),
            )
            .await,
    );
    assert_eq!(details["reference"].as_str().unwrap(), reference);
}

#[tokio::test]
async fn booking_resolves_the_passenger_by_full_name() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::days(10);
    world.add_flight_departing(departure);

    let payload = data(
        world
            .dispatch(
                "book_flight",
                json!({
                    "passenger_name": "Ava Martinez",
                    "flight_number": "HJ100",
                    "departure_date": departure.date_naive().to_string(),
                }),
            )
            .await,
    );
    assert_eq!(payload["booking"]["passenger"]["email"], "ava@example.com");
}

#[tokio::test]
async fn cancellation_inside_a_day_splits_the_total() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::hours(12);
    world.add_flight_departing(departure);
    let (reference, payload) = world.book(departure).await;
    let total = amount(&payload["total"]);

    let cancelled = data(
        world
            .dispatch("cancel_booking", json!({"booking_reference": reference}))
            .await,
    );
    assert_eq!(cancelled["status"], "cancelled");

    let fee = amount(&cancelled["cancellation_fee"]);
    let refunded = amount(&cancelled["refund_amount"]);
    assert_eq!(fee, (total / Decimal::from(2)).round_dp(2));
    assert_eq!(fee + refunded, total);
    assert_eq!(cancelled["refund"]["type"], "partial");
    assert_eq!(cancelled["refund"]["status"], "pending");
    let refund_reference = cancelled["refund"]["reference"].as_str().unwrap();
    assert!(Regex::new(r"^RF\d{6}$").unwrap().is_match(refund_reference));
}

#[tokio::test]
async fn cancellation_within_two_hours_is_refused() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::minutes(90);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    let envelope = world
        .dispatch("cancel_booking", json!({"booking_reference": reference}))
        .await;
    assert_eq!(error_code(envelope), "PolicyViolation");
}

#[tokio::test]
async fn cancelling_twice_reports_already_cancelled() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::hours(12);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    data(
        world
            .dispatch("cancel_booking", json!({"booking_reference": reference.clone()}))
            .await,
    );
    let envelope = world
        .dispatch("cancel_booking", json!({"booking_reference": reference}))
        .await;
    assert_eq!(error_code(envelope), "AlreadyCancelled");
}

// =============================================================================
// Check-in
// =============================================================================

#[tokio::test]
async fn check_in_before_the_window_reports_too_early() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::hours(36);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    let result = data(
        world
            .dispatch("check_in_passenger", json!({"booking_reference": reference}))
            .await,
    );
    let outcome = &result["results"][0];
    assert_eq!(outcome["outcome"], "too_early");
    assert!(outcome["opens_at"].is_string());
}

#[tokio::test]
async fn check_in_inside_the_window_assigns_an_aisle_seat() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::hours(10);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    let result = data(
        world
            .dispatch("check_in_passenger", json!({"booking_reference": reference.clone()}))
            .await,
    );
    let outcome = &result["results"][0];
    assert_eq!(outcome["outcome"], "checked_in");
    assert_eq!(outcome["seat_number"], "12C");
    assert!(outcome["boarding_time"].is_string());

    let passes = data(
        world
            .dispatch("get_boarding_pass", json!({"booking_reference": reference}))
            .await,
    );
    assert_eq!(passes["boarding_passes"][0]["seat_number"], "12C");
    assert_eq!(passes["boarding_passes"][0]["flight_number"], "HJ100");
}

#[tokio::test]
async fn check_in_marks_status_seat_and_pass_together() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::hours(10);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    data(
        world
            .dispatch("check_in_passenger", json!({"booking_reference": reference.clone()}))
            .await,
    );

    let details = data(
        world
            .dispatch("get_booking_details", json!({"booking_reference": reference}))
            .await,
    );
    let segment = &details["segments"][0];
    assert_eq!(segment["check_in_status"], "checked_in");
    assert_eq!(segment["seat_number"], "12C");
    assert_eq!(segment["boarding_pass_issued"], true);
}

#[tokio::test]
async fn contested_seat_claim_leaves_check_in_untouched() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::hours(10);
    let flight_id = world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    // Another traveler grabs 12C between the seat pick and the claim.
    world.store.add_flight_seat(FlightSeat {
        id: 0,
        flight_id,
        seat_number: "12C".into(),
        passenger_id: Some(9999),
        segment_id: Some(9999),
        fee: None,
        status: SeatStatus::Occupied,
    });

    let details = data(
        world
            .dispatch("get_booking_details", json!({"booking_reference": reference.clone()}))
            .await,
    );
    let segment_id = details["segments"][0]["segment_id"].as_i64().unwrap();

    let err = world
        .store
        .check_in_segment(flight_id, segment_id, world.passenger_id, Some("12C"))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::SeatUnavailable);

    let after = data(
        world
            .dispatch("get_booking_details", json!({"booking_reference": reference}))
            .await,
    );
    let segment = &after["segments"][0];
    assert_eq!(segment["check_in_status"], "not_checked_in");
    assert_eq!(segment["boarding_pass_issued"], false);
    assert!(segment["seat_number"].is_null());
}

#[tokio::test]
async fn boarding_pass_before_check_in_is_unavailable() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::hours(10);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    let envelope = world
        .dispatch("get_boarding_pass", json!({"booking_reference": reference}))
        .await;
    assert_eq!(error_code(envelope), "CheckInUnavailable");
}

// =============================================================================
// Seating
// =============================================================================

#[tokio::test]
async fn changing_to_an_occupied_seat_is_refused() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::days(5);
    let flight_id = world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    // Another traveler already holds 12C.
    world.store.add_flight_seat(FlightSeat {
        id: 0,
        flight_id,
        seat_number: "12C".into(),
        passenger_id: Some(9999),
        segment_id: Some(9999),
        fee: None,
        status: SeatStatus::Occupied,
    });

    let envelope = world
        .dispatch(
            "change_seat",
            json!({"booking_reference": reference, "seat_number": "12c"}),
        )
        .await;
    assert_eq!(error_code(envelope), "SeatUnavailable");
}

#[tokio::test]
async fn changing_to_a_nonexistent_seat_is_refused() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::days(5);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    let envelope = world
        .dispatch(
            "change_seat",
            json!({"booking_reference": reference, "seat_number": "99Z"}),
        )
        .await;
    assert_eq!(error_code(envelope), "SeatUnavailable");
}

#[tokio::test]
async fn change_seat_moves_the_passenger_and_frees_nothing_else() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::days(5);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    let moved = data(
        world
            .dispatch(
                "change_seat",
                json!({"booking_reference": reference.clone(), "seat_number": "10A"}),
            )
            .await,
    );
    assert_eq!(moved["new_seat"], "10A");
    assert_eq!(moved["seat"]["type"], "window");

    let details = data(
        world
            .dispatch("get_booking_details", json!({"booking_reference": reference}))
            .await,
    );
    assert_eq!(details["segments"][0]["seat_number"], "10A");
}

// =============================================================================
// Search and dispatch surface
// =============================================================================

#[tokio::test]
async fn unknown_route_degrades_to_an_empty_success() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::days(10);
    world.add_flight_departing(departure);

    let result = data(
        world
            .dispatch(
                "search_flight",
                json!({
                    "origin": "JFK",
                    "destination": "Atlantis",
                    "departure_date": departure.date_naive().to_string(),
                }),
            )
            .await,
    );
    assert_eq!(result["flights"], json!([]));
    assert_eq!(result["message"], "No direct flights available");
}

#[tokio::test]
async fn search_finds_the_seeded_flight() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::days(10);
    world.add_flight_departing(departure);

    let result = data(
        world
            .dispatch(
                "search_flight",
                json!({
                    "origin": "JFK",
                    "destination": "LAX",
                    "departure_date": departure.date_naive().to_string(),
                }),
            )
            .await,
    );
    let flights = result["flights"].as_array().unwrap();
    assert_eq!(flights.len(), 1);
    assert_eq!(flights[0]["flight"]["flight_number"], "HJ100");
    assert!(amount(&flights[0]["price"]) > Decimal::ZERO);
}

#[tokio::test]
async fn unknown_operation_is_rejected_with_a_code() {
    let world = World::new();
    let envelope = world.dispatch("order_pizza", json!({})).await;
    assert_eq!(error_code(envelope), "UnknownOperation");
}

#[tokio::test]
async fn refund_status_reflects_a_cancellation() {
    let world = World::new();
    let departure = Utc::now() + chrono::Duration::hours(12);
    world.add_flight_departing(departure);
    let (reference, _) = world.book(departure).await;

    let cancelled = data(
        world
            .dispatch("cancel_booking", json!({"booking_reference": reference.clone()}))
            .await,
    );
    let refund_reference = cancelled["refund"]["reference"].as_str().unwrap();

    let status = data(
        world
            .dispatch("get_refund_status", json!({"refund_reference": refund_reference}))
            .await,
    );
    assert_eq!(status["refund"]["status"], "pending");
    assert_eq!(
        amount(&status["refund"]["amount"]),
        amount(&cancelled["refund_amount"])
    );
}
