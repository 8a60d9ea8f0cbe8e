//! In-memory implementation of every store port.
//!
//! Backs the integration tests and local demos. One mutex guards the whole
//! state; contention is irrelevant at test scale and the coarse lock keeps
//! each mutating method atomic, mirroring the transactional contract of the
//! Postgres adapter.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};

use crate::domain::foundation::{DomainError, ErrorCode, Money};
use crate::domain::model::{
    Aircraft, AircraftType, Airline, AirlinePolicy, Airport, Baggage, BaggageStatus, Booking,
    BookingDetail, BookingSegment, BookingStatus, CabinClass, CheckInStatus, CustomerServiceLog,
    Excursion, ExcursionBooking, Flight, FlightDetail, FlightSeat, FlightStatusUpdate,
    InsurancePolicy, InsuranceStatus, NewBaggage, NewBooking, NewExcursionBooking,
    NewInsurancePolicy, NewRefund, NewSegment, NewServiceLog, NewTripBooking, Passenger, Refund,
    RefundStatus, Route, SeatMapRow, SeatStatus, SegmentDetail, TripBooking, TripBookingDetail,
    TripBookingStatus, TripPackage,
};
use crate::ports::{
    BookingStore, FlightStore, HealthProbe, InsuranceStore, PassengerStore, PolicyStore,
    ReferenceDataStore, RefundStore, ServiceLogStore, TripStore,
};

#[derive(Default)]
struct State {
    next_id: i64,
    airports: Vec<Airport>,
    airlines: Vec<Airline>,
    aircraft_types: Vec<AircraftType>,
    aircraft: Vec<Aircraft>,
    routes: Vec<Route>,
    flights: Vec<Flight>,
    status_updates: Vec<FlightStatusUpdate>,
    seat_map: Vec<SeatMapRow>,
    flight_seats: Vec<FlightSeat>,
    passengers: Vec<Passenger>,
    bookings: Vec<Booking>,
    segments: Vec<BookingSegment>,
    baggage: Vec<Baggage>,
    refunds: Vec<Refund>,
    insurance: Vec<InsurancePolicy>,
    trip_packages: Vec<TripPackage>,
    trip_bookings: Vec<TripBooking>,
    excursions: Vec<Excursion>,
    excursion_bookings: Vec<ExcursionBooking>,
    policies: Vec<AirlinePolicy>,
    service_log: Vec<CustomerServiceLog>,
}

impl State {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn flight_detail(&self, flight: &Flight) -> Result<FlightDetail, DomainError> {
        let airline = self
            .airlines
            .iter()
            .find(|a| a.id == flight.airline_id)
            .cloned()
            .ok_or_else(|| DomainError::internal("flight references missing airline"))?;
        let route = self
            .routes
            .iter()
            .find(|r| r.id == flight.route_id)
            .cloned()
            .ok_or_else(|| DomainError::internal("flight references missing route"))?;
        let origin = self
            .airports
            .iter()
            .find(|a| a.id == route.origin_airport_id)
            .cloned()
            .ok_or_else(|| DomainError::internal("route references missing origin airport"))?;
        let destination = self
            .airports
            .iter()
            .find(|a| a.id == route.destination_airport_id)
            .cloned()
            .ok_or_else(|| DomainError::internal("route references missing destination airport"))?;
        let aircraft_type_id = self
            .aircraft
            .iter()
            .find(|a| a.id == flight.aircraft_id)
            .map(|a| a.aircraft_type_id)
            .ok_or_else(|| DomainError::internal("flight references missing aircraft"))?;
        Ok(FlightDetail {
            flight: flight.clone(),
            airline,
            route,
            origin,
            destination,
            aircraft_type_id,
        })
    }

    fn booking_detail(&self, booking: &Booking) -> Result<BookingDetail, DomainError> {
        let passenger = self
            .passengers
            .iter()
            .find(|p| p.id == booking.passenger_id)
            .cloned()
            .ok_or_else(|| DomainError::internal("booking references missing passenger"))?;
        let mut segments = Vec::new();
        for segment in self.segments.iter().filter(|s| s.booking_id == booking.id) {
            let flight = self
                .flights
                .iter()
                .find(|f| f.id == segment.flight_id)
                .ok_or_else(|| DomainError::internal("segment references missing flight"))?;
            segments.push(SegmentDetail {
                segment: segment.clone(),
                flight: self.flight_detail(flight)?,
            });
        }
        segments.sort_by_key(|s| s.flight.flight.scheduled_departure);
        Ok(BookingDetail { booking: booking.clone(), passenger, segments })
    }

    /// Releases seat rows held by the given segments.
    fn free_seats_for_segments(&mut self, segment_ids: &[i64]) {
        for seat in self.flight_seats.iter_mut() {
            if seat.segment_id.map_or(false, |id| segment_ids.contains(&id)) {
                seat.status = SeatStatus::Available;
                seat.passenger_id = None;
                seat.segment_id = None;
                seat.fee = None;
            }
        }
    }

    fn segment_ids_for_booking(&self, booking_id: i64) -> Vec<i64> {
        self.segments
            .iter()
            .filter(|s| s.booking_id == booking_id)
            .map(|s| s.id)
            .collect()
    }
}

/// One store serving every port, for tests and demos.
#[derive(Default)]
pub struct InMemoryOpsStore {
    state: Mutex<State>,
}

impl InMemoryOpsStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Fixture helpers. Each takes the row with any placeholder id, assigns the
/// real one, and returns it.
impl InMemoryOpsStore {
    pub fn add_airport(&self, mut airport: Airport) -> i64 {
        let mut state = self.lock();
        airport.id = state.next_id();
        let id = airport.id;
        state.airports.push(airport);
        id
    }

    pub fn add_airline(&self, mut airline: Airline) -> i64 {
        let mut state = self.lock();
        airline.id = state.next_id();
        let id = airline.id;
        state.airlines.push(airline);
        id
    }

    pub fn add_aircraft_type(&self, mut aircraft_type: AircraftType) -> i64 {
        let mut state = self.lock();
        aircraft_type.id = state.next_id();
        let id = aircraft_type.id;
        state.aircraft_types.push(aircraft_type);
        id
    }

    pub fn add_aircraft(&self, mut aircraft: Aircraft) -> i64 {
        let mut state = self.lock();
        aircraft.id = state.next_id();
        let id = aircraft.id;
        state.aircraft.push(aircraft);
        id
    }

    pub fn add_route(&self, mut route: Route) -> i64 {
        let mut state = self.lock();
        route.id = state.next_id();
        let id = route.id;
        state.routes.push(route);
        id
    }

    pub fn add_flight(&self, mut flight: Flight) -> i64 {
        let mut state = self.lock();
        flight.id = state.next_id();
        let id = flight.id;
        state.flights.push(flight);
        id
    }

    pub fn add_status_update(&self, mut update: FlightStatusUpdate) -> i64 {
        let mut state = self.lock();
        update.id = state.next_id();
        let id = update.id;
        state.status_updates.push(update);
        id
    }

    pub fn add_seat_map_row(&self, mut seat: SeatMapRow) -> i64 {
        let mut state = self.lock();
        seat.id = state.next_id();
        let id = seat.id;
        state.seat_map.push(seat);
        id
    }

    pub fn add_flight_seat(&self, mut seat: FlightSeat) -> i64 {
        let mut state = self.lock();
        seat.id = state.next_id();
        let id = seat.id;
        state.flight_seats.push(seat);
        id
    }

    pub fn add_passenger(&self, mut passenger: Passenger) -> i64 {
        let mut state = self.lock();
        passenger.id = state.next_id();
        let id = passenger.id;
        state.passengers.push(passenger);
        id
    }

    pub fn add_trip_package(&self, mut package: TripPackage) -> i64 {
        let mut state = self.lock();
        package.id = state.next_id();
        let id = package.id;
        state.trip_packages.push(package);
        id
    }

    pub fn add_excursion(&self, mut excursion: Excursion) -> i64 {
        let mut state = self.lock();
        excursion.id = state.next_id();
        let id = excursion.id;
        state.excursions.push(excursion);
        id
    }

    pub fn add_policy(&self, mut policy: AirlinePolicy) -> i64 {
        let mut state = self.lock();
        policy.id = state.next_id();
        let id = policy.id;
        state.policies.push(policy);
        id
    }
}

#[async_trait]
impl ReferenceDataStore for InMemoryOpsStore {
    async fn airport_by_iata(&self, code: &str) -> Result<Option<Airport>, DomainError> {
        let state = self.lock();
        Ok(state
            .airports
            .iter()
            .find(|a| a.iata_code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn airports_by_city(&self, city: &str) -> Result<Vec<Airport>, DomainError> {
        let needle = city.to_lowercase();
        let state = self.lock();
        let mut found: Vec<Airport> = state
            .airports
            .iter()
            .filter(|a| a.city.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        found.sort_by(|a, b| a.iata_code.cmp(&b.iata_code));
        Ok(found)
    }

    async fn airline_by_iata(&self, code: &str) -> Result<Option<Airline>, DomainError> {
        let state = self.lock();
        Ok(state
            .airlines
            .iter()
            .find(|a| a.iata_code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn airlines_by_name(&self, name: &str) -> Result<Vec<Airline>, DomainError> {
        let needle = name.to_lowercase();
        let state = self.lock();
        Ok(state
            .airlines
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn aircraft_type_by_id(&self, id: i64) -> Result<Option<AircraftType>, DomainError> {
        let state = self.lock();
        Ok(state.aircraft_types.iter().find(|t| t.id == id).cloned())
    }
}

#[async_trait]
impl FlightStore for InMemoryOpsStore {
    async fn search(
        &self,
        origin_airport_id: i64,
        destination_airport_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<FlightDetail>, DomainError> {
        let state = self.lock();
        let route_ids: Vec<i64> = state
            .routes
            .iter()
            .filter(|r| {
                r.origin_airport_id == origin_airport_id
                    && r.destination_airport_id == destination_airport_id
            })
            .map(|r| r.id)
            .collect();
        state
            .flights
            .iter()
            .filter(|f| {
                route_ids.contains(&f.route_id)
                    && f.scheduled_departure.date_naive() == date
            })
            .map(|f| state.flight_detail(f))
            .collect()
    }

    async fn by_number_and_date(
        &self,
        flight_number: &str,
        date: NaiveDate,
    ) -> Result<Option<FlightDetail>, DomainError> {
        let state = self.lock();
        state
            .flights
            .iter()
            .find(|f| {
                f.flight_number.eq_ignore_ascii_case(flight_number)
                    && f.scheduled_departure.date_naive() == date
            })
            .map(|f| state.flight_detail(f))
            .transpose()
    }

    async fn next_by_number(&self, flight_number: &str) -> Result<Option<FlightDetail>, DomainError> {
        let now = Utc::now();
        let state = self.lock();
        state
            .flights
            .iter()
            .filter(|f| {
                f.flight_number.eq_ignore_ascii_case(flight_number) && f.scheduled_departure >= now
            })
            .min_by_key(|f| f.scheduled_departure)
            .map(|f| state.flight_detail(f))
            .transpose()
    }

    async fn by_id(&self, id: i64) -> Result<Option<FlightDetail>, DomainError> {
        let state = self.lock();
        state
            .flights
            .iter()
            .find(|f| f.id == id)
            .map(|f| state.flight_detail(f))
            .transpose()
    }

    async fn latest_status_update(
        &self,
        flight_id: i64,
    ) -> Result<Option<FlightStatusUpdate>, DomainError> {
        let state = self.lock();
        Ok(state
            .status_updates
            .iter()
            .filter(|u| u.flight_id == flight_id)
            .max_by_key(|u| u.update_time)
            .cloned())
    }

    async fn seat_map(&self, aircraft_type_id: i64) -> Result<Vec<SeatMapRow>, DomainError> {
        let state = self.lock();
        let mut seats: Vec<SeatMapRow> = state
            .seat_map
            .iter()
            .filter(|s| s.aircraft_type_id == aircraft_type_id)
            .cloned()
            .collect();
        seats.sort_by(|a, b| a.seat_number.cmp(&b.seat_number));
        Ok(seats)
    }

    async fn flight_seats(&self, flight_id: i64) -> Result<Vec<FlightSeat>, DomainError> {
        let state = self.lock();
        Ok(state
            .flight_seats
            .iter()
            .filter(|s| s.flight_id == flight_id)
            .cloned()
            .collect())
    }

    async fn available_seats(
        &self,
        flight_id: i64,
        cabin_class: CabinClass,
    ) -> Result<Vec<SeatMapRow>, DomainError> {
        let state = self.lock();
        let aircraft_type_id = state
            .flights
            .iter()
            .find(|f| f.id == flight_id)
            .and_then(|f| state.aircraft.iter().find(|a| a.id == f.aircraft_id))
            .map(|a| a.aircraft_type_id)
            .ok_or_else(|| DomainError::internal("flight references missing aircraft"))?;
        let mut open: Vec<SeatMapRow> = state
            .seat_map
            .iter()
            .filter(|s| {
                s.aircraft_type_id == aircraft_type_id
                    && s.cabin_class == cabin_class
                    && !s.blocked
                    && !state.flight_seats.iter().any(|fs| {
                        fs.flight_id == flight_id
                            && fs.seat_number == s.seat_number
                            && fs.status != SeatStatus::Available
                    })
            })
            .cloned()
            .collect();
        open.sort_by(|a, b| a.seat_number.cmp(&b.seat_number));
        Ok(open)
    }

    async fn reseat(
        &self,
        flight_id: i64,
        segment_id: i64,
        passenger_id: i64,
        old_seat: Option<&str>,
        new_seat: &str,
        fee: Money,
    ) -> Result<(), DomainError> {
        let mut state = self.lock();

        let taken_by_other = state.flight_seats.iter().any(|s| {
            s.flight_id == flight_id
                && s.seat_number == new_seat
                && s.status != SeatStatus::Available
                && s.segment_id != Some(segment_id)
        });
        if taken_by_other {
            return Err(DomainError::new(
                ErrorCode::SeatUnavailable,
                format!("Seat {} is not available on this flight", new_seat),
            ));
        }

        if let Some(old) = old_seat {
            if let Some(row) = state
                .flight_seats
                .iter_mut()
                .find(|s| s.flight_id == flight_id && s.seat_number == old)
            {
                row.status = SeatStatus::Available;
                row.passenger_id = None;
                row.segment_id = None;
                row.fee = None;
            }
        }

        if let Some(row) = state
            .flight_seats
            .iter_mut()
            .find(|s| s.flight_id == flight_id && s.seat_number == new_seat)
        {
            row.status = SeatStatus::Occupied;
            row.passenger_id = Some(passenger_id);
            row.segment_id = Some(segment_id);
            row.fee = Some(fee);
        } else {
            let id = state.next_id();
            state.flight_seats.push(FlightSeat {
                id,
                flight_id,
                seat_number: new_seat.to_string(),
                passenger_id: Some(passenger_id),
                segment_id: Some(segment_id),
                fee: Some(fee),
                status: SeatStatus::Occupied,
            });
        }

        if let Some(segment) = state.segments.iter_mut().find(|s| s.id == segment_id) {
            segment.seat_number = Some(new_seat.to_string());
        }
        Ok(())
    }
}

#[async_trait]
impl BookingStore for InMemoryOpsStore {
    async fn by_reference(&self, reference: &str) -> Result<Option<BookingDetail>, DomainError> {
        let state = self.lock();
        state
            .bookings
            .iter()
            .find(|b| b.reference.eq_ignore_ascii_case(reference))
            .map(|b| state.booking_detail(b))
            .transpose()
    }

    async fn reference_exists(&self, reference: &str) -> Result<bool, DomainError> {
        let state = self.lock();
        Ok(state
            .bookings
            .iter()
            .any(|b| b.reference.eq_ignore_ascii_case(reference)))
    }

    async fn create(&self, booking: NewBooking) -> Result<BookingDetail, DomainError> {
        let mut state = self.lock();
        let booking_id = state.next_id();
        let stored = Booking {
            id: booking_id,
            reference: booking.reference,
            passenger_id: booking.passenger_id,
            booking_date: Utc::now(),
            total: booking.total,
            status: BookingStatus::Confirmed,
            source: booking.source,
            trip_type: booking.trip_type,
        };
        state.bookings.push(stored);
        for segment in booking.segments {
            let id = state.next_id();
            state.segments.push(BookingSegment {
                id,
                booking_id,
                flight_id: segment.flight_id,
                passenger_id: booking.passenger_id,
                cabin_class: segment.cabin_class,
                fare_basis: segment.fare_basis,
                ticket_number: segment.ticket_number,
                seat_number: segment.seat_number,
                baggage_allowance_kg: segment.baggage_allowance_kg,
                meal_preference: segment.meal_preference,
                check_in_status: CheckInStatus::NotCheckedIn,
                boarding_pass_issued: false,
            });
        }
        let booking = state
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .cloned()
            .ok_or_else(|| DomainError::internal("booking vanished during create"))?;
        state.booking_detail(&booking)
    }

    async fn cancel(&self, booking_id: i64, refund: NewRefund) -> Result<Refund, DomainError> {
        let mut state = self.lock();
        let segment_ids = state.segment_ids_for_booking(booking_id);
        state.free_seats_for_segments(&segment_ids);
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| DomainError::internal("cancel targets missing booking"))?;
        booking.status = BookingStatus::Cancelled;
        let id = state.next_id();
        let stored = Refund {
            id,
            reference: refund.reference,
            booking_id: Some(booking_id),
            trip_booking_id: None,
            refund_type: refund.refund_type,
            amount: refund.amount,
            reason: refund.reason,
            status: RefundStatus::Pending,
            method: refund.method,
            requested_at: Utc::now(),
            processed_at: None,
        };
        state.refunds.push(stored.clone());
        Ok(stored)
    }

    async fn set_status(&self, booking_id: i64, status: BookingStatus) -> Result<(), DomainError> {
        let mut state = self.lock();
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| DomainError::internal("status update targets missing booking"))?;
        booking.status = status;
        Ok(())
    }

    async fn replace_segments(
        &self,
        booking_id: i64,
        segments: Vec<NewSegment>,
        new_total: Money,
    ) -> Result<BookingDetail, DomainError> {
        let mut state = self.lock();
        let old_ids = state.segment_ids_for_booking(booking_id);
        state.free_seats_for_segments(&old_ids);
        state.segments.retain(|s| s.booking_id != booking_id);

        let passenger_id = state
            .bookings
            .iter()
            .find(|b| b.id == booking_id)
            .map(|b| b.passenger_id)
            .ok_or_else(|| DomainError::internal("segment replace targets missing booking"))?;
        for segment in segments {
            let id = state.next_id();
            state.segments.push(BookingSegment {
                id,
                booking_id,
                flight_id: segment.flight_id,
                passenger_id,
                cabin_class: segment.cabin_class,
                fare_basis: segment.fare_basis,
                ticket_number: segment.ticket_number,
                seat_number: segment.seat_number,
                baggage_allowance_kg: segment.baggage_allowance_kg,
                meal_preference: segment.meal_preference,
                check_in_status: CheckInStatus::NotCheckedIn,
                boarding_pass_issued: false,
            });
        }
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| DomainError::internal("segment replace targets missing booking"))?;
        booking.total = new_total;
        let booking = booking.clone();
        state.booking_detail(&booking)
    }

    async fn check_in_segment(
        &self,
        flight_id: i64,
        segment_id: i64,
        passenger_id: i64,
        claim_seat: Option<&str>,
    ) -> Result<(), DomainError> {
        let mut state = self.lock();

        // Validate everything before touching state so a refusal is a no-op.
        let segment_ix = state
            .segments
            .iter()
            .position(|s| s.id == segment_id)
            .ok_or_else(|| DomainError::internal("check-in targets missing segment"))?;
        if let Some(seat) = claim_seat {
            let taken_by_other = state.flight_seats.iter().any(|s| {
                s.flight_id == flight_id
                    && s.seat_number == seat
                    && s.status != SeatStatus::Available
                    && s.segment_id != Some(segment_id)
            });
            if taken_by_other {
                return Err(DomainError::new(
                    ErrorCode::SeatUnavailable,
                    format!("Seat {} is not available on this flight", seat),
                ));
            }
        }

        if let Some(seat) = claim_seat {
            if let Some(row) = state
                .flight_seats
                .iter_mut()
                .find(|s| s.flight_id == flight_id && s.seat_number == seat)
            {
                row.status = SeatStatus::Occupied;
                row.passenger_id = Some(passenger_id);
                row.segment_id = Some(segment_id);
                row.fee = None;
            } else {
                let id = state.next_id();
                state.flight_seats.push(FlightSeat {
                    id,
                    flight_id,
                    seat_number: seat.to_string(),
                    passenger_id: Some(passenger_id),
                    segment_id: Some(segment_id),
                    fee: None,
                    status: SeatStatus::Occupied,
                });
            }
        }

        let segment = &mut state.segments[segment_ix];
        segment.check_in_status = CheckInStatus::CheckedIn;
        if let Some(seat) = claim_seat {
            segment.seat_number = Some(seat.to_string());
        }
        segment.boarding_pass_issued = true;
        Ok(())
    }

    async fn set_boarding_pass_issued(&self, segment_id: i64) -> Result<(), DomainError> {
        let mut state = self.lock();
        let segment = state
            .segments
            .iter_mut()
            .find(|s| s.id == segment_id)
            .ok_or_else(|| DomainError::internal("boarding pass targets missing segment"))?;
        segment.boarding_pass_issued = true;
        Ok(())
    }

    async fn add_baggage(&self, baggage: NewBaggage) -> Result<Baggage, DomainError> {
        let mut state = self.lock();
        let id = state.next_id();
        let stored = Baggage {
            id,
            segment_id: baggage.segment_id,
            baggage_type: baggage.baggage_type,
            weight_kg: baggage.weight_kg,
            fee: baggage.fee,
            tag_number: baggage.tag_number,
            status: BaggageStatus::Registered,
        };
        state.baggage.push(stored.clone());
        Ok(stored)
    }

    async fn baggage_for_booking(&self, booking_id: i64) -> Result<Vec<Baggage>, DomainError> {
        let state = self.lock();
        let segment_ids = state.segment_ids_for_booking(booking_id);
        Ok(state
            .baggage
            .iter()
            .filter(|b| segment_ids.contains(&b.segment_id))
            .cloned()
            .collect())
    }

    async fn baggage_by_tag(&self, tag_number: &str) -> Result<Option<Baggage>, DomainError> {
        let state = self.lock();
        Ok(state
            .baggage
            .iter()
            .find(|b| {
                b.tag_number
                    .as_deref()
                    .map_or(false, |t| t.eq_ignore_ascii_case(tag_number))
            })
            .cloned())
    }
}

#[async_trait]
impl PassengerStore for InMemoryOpsStore {
    async fn by_id(&self, id: i64) -> Result<Option<Passenger>, DomainError> {
        let state = self.lock();
        Ok(state.passengers.iter().find(|p| p.id == id).cloned())
    }

    async fn by_email(&self, email: &str) -> Result<Option<Passenger>, DomainError> {
        let state = self.lock();
        Ok(state
            .passengers
            .iter()
            .find(|p| p.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn by_name(
        &self,
        first_name: &str,
        last_name: &str,
    ) -> Result<Vec<Passenger>, DomainError> {
        let first = first_name.to_lowercase();
        let last = last_name.to_lowercase();
        let state = self.lock();
        Ok(state
            .passengers
            .iter()
            .filter(|p| {
                p.first_name.to_lowercase().contains(&first)
                    && p.last_name.to_lowercase().contains(&last)
            })
            .cloned()
            .collect())
    }

    async fn by_last_name_and_flight(
        &self,
        last_name: &str,
        flight_number: &str,
    ) -> Result<Option<Passenger>, DomainError> {
        let state = self.lock();
        let flight_ids: Vec<i64> = state
            .flights
            .iter()
            .filter(|f| f.flight_number.eq_ignore_ascii_case(flight_number))
            .map(|f| f.id)
            .collect();
        let passenger_id = state
            .segments
            .iter()
            .find(|s| {
                flight_ids.contains(&s.flight_id)
                    && state
                        .passengers
                        .iter()
                        .any(|p| p.id == s.passenger_id && p.last_name.eq_ignore_ascii_case(last_name))
            })
            .map(|s| s.passenger_id);
        Ok(passenger_id.and_then(|id| state.passengers.iter().find(|p| p.id == id).cloned()))
    }

    async fn by_frequent_flyer_number(
        &self,
        number: &str,
    ) -> Result<Option<Passenger>, DomainError> {
        let state = self.lock();
        Ok(state
            .passengers
            .iter()
            .find(|p| {
                p.frequent_flyer_number
                    .as_deref()
                    .map_or(false, |n| n.eq_ignore_ascii_case(number))
            })
            .cloned())
    }

    async fn update_contact(
        &self,
        passenger_id: i64,
        email: Option<&str>,
        phone: Option<&str>,
    ) -> Result<Passenger, DomainError> {
        let mut state = self.lock();
        let passenger = state
            .passengers
            .iter_mut()
            .find(|p| p.id == passenger_id)
            .ok_or_else(|| DomainError::internal("contact update targets missing passenger"))?;
        if let Some(email) = email {
            passenger.email = email.to_string();
        }
        if let Some(phone) = phone {
            passenger.phone = Some(phone.to_string());
        }
        Ok(passenger.clone())
    }
}

#[async_trait]
impl RefundStore for InMemoryOpsStore {
    async fn refunds_for_booking(&self, booking_id: i64) -> Result<Vec<Refund>, DomainError> {
        let state = self.lock();
        Ok(state
            .refunds
            .iter()
            .filter(|r| r.booking_id == Some(booking_id))
            .cloned()
            .collect())
    }

    async fn open_refund_exists(&self, booking_id: i64) -> Result<bool, DomainError> {
        let state = self.lock();
        Ok(state
            .refunds
            .iter()
            .any(|r| r.booking_id == Some(booking_id) && r.status.is_open()))
    }

    async fn by_reference(&self, reference: &str) -> Result<Option<Refund>, DomainError> {
        let state = self.lock();
        Ok(state
            .refunds
            .iter()
            .find(|r| r.reference.eq_ignore_ascii_case(reference))
            .cloned())
    }

    async fn request_refund(
        &self,
        booking_id: i64,
        refund: NewRefund,
    ) -> Result<Refund, DomainError> {
        let mut state = self.lock();
        let booking = state
            .bookings
            .iter_mut()
            .find(|b| b.id == booking_id)
            .ok_or_else(|| DomainError::internal("refund targets missing booking"))?;
        booking.status = BookingStatus::RefundRequested;
        let id = state.next_id();
        let stored = Refund {
            id,
            reference: refund.reference,
            booking_id: Some(booking_id),
            trip_booking_id: None,
            refund_type: refund.refund_type,
            amount: refund.amount,
            reason: refund.reason,
            status: RefundStatus::Pending,
            method: refund.method,
            requested_at: Utc::now(),
            processed_at: None,
        };
        state.refunds.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl InsuranceStore for InMemoryOpsStore {
    async fn create(&self, policy: NewInsurancePolicy) -> Result<InsurancePolicy, DomainError> {
        let mut state = self.lock();
        let id = state.next_id();
        let stored = InsurancePolicy {
            id,
            policy_number: policy.policy_number,
            booking_id: policy.booking_id,
            passenger_id: policy.passenger_id,
            insurance_type: policy.insurance_type,
            coverage_amount: policy.coverage_amount,
            premium: policy.premium,
            valid_from: policy.valid_from,
            valid_until: policy.valid_until,
            status: InsuranceStatus::Active,
            provider: policy.provider,
        };
        state.insurance.push(stored.clone());
        Ok(stored)
    }

    async fn by_policy_number(
        &self,
        number: &str,
    ) -> Result<Option<InsurancePolicy>, DomainError> {
        let state = self.lock();
        Ok(state
            .insurance
            .iter()
            .find(|p| p.policy_number.eq_ignore_ascii_case(number))
            .cloned())
    }

    async fn for_booking(&self, booking_id: i64) -> Result<Vec<InsurancePolicy>, DomainError> {
        let state = self.lock();
        Ok(state
            .insurance
            .iter()
            .filter(|p| p.booking_id == booking_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl TripStore for InMemoryOpsStore {
    async fn packages(&self, destination: Option<&str>) -> Result<Vec<TripPackage>, DomainError> {
        let state = self.lock();
        let needle = destination.map(str::to_lowercase);
        Ok(state
            .trip_packages
            .iter()
            .filter(|p| {
                needle
                    .as_deref()
                    .map_or(true, |n| p.destination.to_lowercase().contains(n))
            })
            .cloned()
            .collect())
    }

    async fn package_by_code(&self, code: &str) -> Result<Option<TripPackage>, DomainError> {
        let state = self.lock();
        Ok(state
            .trip_packages
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn trip_reference_exists(&self, reference: &str) -> Result<bool, DomainError> {
        let state = self.lock();
        Ok(state
            .trip_bookings
            .iter()
            .any(|b| b.reference.eq_ignore_ascii_case(reference)))
    }

    async fn book(&self, booking: NewTripBooking) -> Result<TripBooking, DomainError> {
        let mut state = self.lock();
        let id = state.next_id();
        let stored = TripBooking {
            id,
            reference: booking.reference,
            package_id: booking.package_id,
            passenger_id: booking.passenger_id,
            start_date: booking.start_date,
            end_date: booking.end_date,
            travelers: booking.travelers,
            total: booking.total,
            status: TripBookingStatus::Confirmed,
        };
        state.trip_bookings.push(stored.clone());
        Ok(stored)
    }

    async fn trip_booking_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TripBookingDetail>, DomainError> {
        let state = self.lock();
        let Some(trip_booking) = state
            .trip_bookings
            .iter()
            .find(|b| b.reference.eq_ignore_ascii_case(reference))
            .cloned()
        else {
            return Ok(None);
        };
        let package = state
            .trip_packages
            .iter()
            .find(|p| p.id == trip_booking.package_id)
            .cloned()
            .ok_or_else(|| DomainError::internal("trip booking references missing package"))?;
        let excursions = state
            .excursion_bookings
            .iter()
            .filter(|e| e.trip_booking_id == trip_booking.id)
            .cloned()
            .collect();
        Ok(Some(TripBookingDetail { trip_booking, package, excursions }))
    }

    async fn cancel_trip_booking(
        &self,
        trip_booking_id: i64,
        refund: NewRefund,
    ) -> Result<Refund, DomainError> {
        let mut state = self.lock();
        let booking = state
            .trip_bookings
            .iter_mut()
            .find(|b| b.id == trip_booking_id)
            .ok_or_else(|| DomainError::internal("cancel targets missing trip booking"))?;
        booking.status = TripBookingStatus::Cancelled;
        let id = state.next_id();
        let stored = Refund {
            id,
            reference: refund.reference,
            booking_id: None,
            trip_booking_id: Some(trip_booking_id),
            refund_type: refund.refund_type,
            amount: refund.amount,
            reason: refund.reason,
            status: RefundStatus::Pending,
            method: refund.method,
            requested_at: Utc::now(),
            processed_at: None,
        };
        state.refunds.push(stored.clone());
        Ok(stored)
    }

    async fn excursions(&self, destination: Option<&str>) -> Result<Vec<Excursion>, DomainError> {
        let state = self.lock();
        let needle = destination.map(str::to_lowercase);
        Ok(state
            .excursions
            .iter()
            .filter(|e| {
                needle
                    .as_deref()
                    .map_or(true, |n| e.destination.to_lowercase().contains(n))
            })
            .cloned()
            .collect())
    }

    async fn excursion_by_code(&self, code: &str) -> Result<Option<Excursion>, DomainError> {
        let state = self.lock();
        Ok(state
            .excursions
            .iter()
            .find(|e| e.code.eq_ignore_ascii_case(code))
            .cloned())
    }

    async fn book_excursion(
        &self,
        booking: NewExcursionBooking,
    ) -> Result<ExcursionBooking, DomainError> {
        let mut state = self.lock();
        let id = state.next_id();
        let stored = ExcursionBooking {
            id,
            trip_booking_id: booking.trip_booking_id,
            excursion_id: booking.excursion_id,
            excursion_date: booking.excursion_date,
            participants: booking.participants,
            total: booking.total,
        };
        state.excursion_bookings.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl PolicyStore for InMemoryOpsStore {
    async fn find(
        &self,
        category: Option<&str>,
        route_type: Option<crate::domain::model::RouteType>,
        cabin_class: Option<CabinClass>,
    ) -> Result<Vec<AirlinePolicy>, DomainError> {
        let state = self.lock();
        Ok(state
            .policies
            .iter()
            .filter(|p| p.matches(category, route_type, cabin_class))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ServiceLogStore for InMemoryOpsStore {
    async fn append(&self, entry: NewServiceLog) -> Result<CustomerServiceLog, DomainError> {
        let mut state = self.lock();
        let id = state.next_id();
        let stored = CustomerServiceLog {
            id,
            case_number: entry.case_number,
            kind: entry.kind,
            passenger_id: entry.passenger_id,
            booking_reference: entry.booking_reference,
            reason: entry.reason,
            priority: entry.priority,
            contact_phone: entry.contact_phone,
            preferred_time: entry.preferred_time,
            created_at: Utc::now(),
        };
        state.service_log.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl HealthProbe for InMemoryOpsStore {
    async fn ping(&self) -> bool {
        true
    }
}
