//! PostgreSQL implementation of FlightStore.
//!
//! Flight reads materialize the full [`FlightDetail`] in one joined query;
//! `reseat` re-checks occupancy under `FOR UPDATE` so two concurrent claims
//! of the same seat cannot both commit.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, Money};
use crate::domain::model::{
    Airline, Airport, CabinClass, Flight, FlightDetail, FlightSeat, FlightStatus,
    FlightStatusUpdate, Route, SeatMapRow, SeatStatus, SeatType,
};
use crate::ports::FlightStore;

use super::{db_err, parse_enum};

pub(crate) const FLIGHT_DETAIL_COLUMNS: &str = r#"
       f.id AS flight_id, f.flight_number, f.airline_id, f.aircraft_id, f.route_id,
       f.scheduled_departure, f.scheduled_arrival, f.actual_departure, f.actual_arrival,
       f.status AS flight_status, f.gate, f.terminal,
       al.iata_code AS airline_iata, al.icao_code AS airline_icao, al.name AS airline_name,
       al.country AS airline_country, al.alliance AS airline_alliance,
       r.origin_airport_id, r.destination_airport_id, r.distance_km, r.duration_minutes,
       o.iata_code AS origin_iata, o.icao_code AS origin_icao, o.name AS origin_name,
       o.city AS origin_city, o.country AS origin_country, o.timezone AS origin_timezone,
       o.latitude AS origin_latitude, o.longitude AS origin_longitude,
       d.iata_code AS dest_iata, d.icao_code AS dest_icao, d.name AS dest_name,
       d.city AS dest_city, d.country AS dest_country, d.timezone AS dest_timezone,
       d.latitude AS dest_latitude, d.longitude AS dest_longitude,
       ac.aircraft_type_id
"#;

pub(crate) const FLIGHT_DETAIL_FROM: &str = r#"
FROM flights f
JOIN airlines al ON al.id = f.airline_id
JOIN routes r ON r.id = f.route_id
JOIN airports o ON o.id = r.origin_airport_id
JOIN airports d ON d.id = r.destination_airport_id
JOIN aircraft ac ON ac.id = f.aircraft_id
"#;

fn flight_detail_sql() -> String {
    format!("SELECT {} {}", FLIGHT_DETAIL_COLUMNS, FLIGHT_DETAIL_FROM)
}

fn airport_from_prefixed(row: &PgRow, id: i64, prefix: &str) -> Result<Airport, DomainError> {
    let col = |name: &str| format!("{}_{}", prefix, name);
    Ok(Airport {
        id,
        iata_code: row.try_get(col("iata").as_str()).map_err(db_err("flight detail row"))?,
        icao_code: row.try_get(col("icao").as_str()).map_err(db_err("flight detail row"))?,
        name: row.try_get(col("name").as_str()).map_err(db_err("flight detail row"))?,
        city: row.try_get(col("city").as_str()).map_err(db_err("flight detail row"))?,
        country: row.try_get(col("country").as_str()).map_err(db_err("flight detail row"))?,
        timezone: row.try_get(col("timezone").as_str()).map_err(db_err("flight detail row"))?,
        latitude: row
            .try_get::<Decimal, _>(col("latitude").as_str())
            .map_err(db_err("flight detail row"))?,
        longitude: row
            .try_get::<Decimal, _>(col("longitude").as_str())
            .map_err(db_err("flight detail row"))?,
    })
}

pub(crate) fn row_to_flight_detail(row: &PgRow) -> Result<FlightDetail, DomainError> {
    let err = db_err("flight detail row");
    let status: String = row.try_get("flight_status").map_err(err)?;
    let flight = Flight {
        id: row.try_get("flight_id").map_err(db_err("flight detail row"))?,
        flight_number: row.try_get("flight_number").map_err(db_err("flight detail row"))?,
        airline_id: row.try_get("airline_id").map_err(db_err("flight detail row"))?,
        aircraft_id: row.try_get("aircraft_id").map_err(db_err("flight detail row"))?,
        route_id: row.try_get("route_id").map_err(db_err("flight detail row"))?,
        scheduled_departure: row
            .try_get("scheduled_departure")
            .map_err(db_err("flight detail row"))?,
        scheduled_arrival: row
            .try_get("scheduled_arrival")
            .map_err(db_err("flight detail row"))?,
        actual_departure: row
            .try_get("actual_departure")
            .map_err(db_err("flight detail row"))?,
        actual_arrival: row
            .try_get("actual_arrival")
            .map_err(db_err("flight detail row"))?,
        status: parse_enum(&status, FlightStatus::from_str, "flight status")?,
        gate: row.try_get("gate").map_err(db_err("flight detail row"))?,
        terminal: row.try_get("terminal").map_err(db_err("flight detail row"))?,
    };
    let airline = Airline {
        id: flight.airline_id,
        iata_code: row.try_get("airline_iata").map_err(db_err("flight detail row"))?,
        icao_code: row.try_get("airline_icao").map_err(db_err("flight detail row"))?,
        name: row.try_get("airline_name").map_err(db_err("flight detail row"))?,
        country: row.try_get("airline_country").map_err(db_err("flight detail row"))?,
        alliance: row.try_get("airline_alliance").map_err(db_err("flight detail row"))?,
    };
    let route = Route {
        id: flight.route_id,
        origin_airport_id: row
            .try_get("origin_airport_id")
            .map_err(db_err("flight detail row"))?,
        destination_airport_id: row
            .try_get("destination_airport_id")
            .map_err(db_err("flight detail row"))?,
        distance_km: row.try_get("distance_km").map_err(db_err("flight detail row"))?,
        duration_minutes: row
            .try_get("duration_minutes")
            .map_err(db_err("flight detail row"))?,
    };
    let origin = airport_from_prefixed(row, route.origin_airport_id, "origin")?;
    let destination = airport_from_prefixed(row, route.destination_airport_id, "dest")?;
    let aircraft_type_id = row
        .try_get("aircraft_type_id")
        .map_err(db_err("flight detail row"))?;
    Ok(FlightDetail { flight, airline, route, origin, destination, aircraft_type_id })
}

fn row_to_seat_map(row: &PgRow) -> Result<SeatMapRow, DomainError> {
    let seat_type: String = row.try_get("seat_type").map_err(db_err("seat map row"))?;
    let cabin_class: String = row.try_get("cabin_class").map_err(db_err("seat map row"))?;
    Ok(SeatMapRow {
        id: row.try_get("id").map_err(db_err("seat map row"))?,
        aircraft_type_id: row
            .try_get("aircraft_type_id")
            .map_err(db_err("seat map row"))?,
        seat_number: row.try_get("seat_number").map_err(db_err("seat map row"))?,
        seat_type: parse_enum(&seat_type, SeatType::from_str, "seat type")?,
        cabin_class: parse_enum(&cabin_class, CabinClass::from_str, "cabin class")?,
        exit_row: row.try_get("exit_row").map_err(db_err("seat map row"))?,
        extra_legroom: row.try_get("extra_legroom").map_err(db_err("seat map row"))?,
        blocked: row.try_get("blocked").map_err(db_err("seat map row"))?,
    })
}

fn row_to_flight_seat(row: &PgRow) -> Result<FlightSeat, DomainError> {
    let status: String = row.try_get("status").map_err(db_err("flight seat row"))?;
    let fee_amount: Option<Decimal> = row.try_get("fee_amount").map_err(db_err("flight seat row"))?;
    let fee_currency: Option<String> =
        row.try_get("fee_currency").map_err(db_err("flight seat row"))?;
    let fee = match (fee_amount, fee_currency) {
        (Some(amount), Some(currency)) => Some(Money::new(amount, &currency)),
        _ => None,
    };
    Ok(FlightSeat {
        id: row.try_get("id").map_err(db_err("flight seat row"))?,
        flight_id: row.try_get("flight_id").map_err(db_err("flight seat row"))?,
        seat_number: row.try_get("seat_number").map_err(db_err("flight seat row"))?,
        passenger_id: row.try_get("passenger_id").map_err(db_err("flight seat row"))?,
        segment_id: row.try_get("segment_id").map_err(db_err("flight seat row"))?,
        fee,
        status: parse_enum(&status, SeatStatus::from_str, "seat status")?,
    })
}

/// Fetches one materialized flight by id; shared with the booking store.
pub(crate) async fn flight_detail_by_id(
    pool: &PgPool,
    id: i64,
) -> Result<Option<FlightDetail>, DomainError> {
    let row = sqlx::query(&format!("{} WHERE f.id = $1", flight_detail_sql()))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_err("failed to fetch flight"))?;
    row.as_ref().map(row_to_flight_detail).transpose()
}

/// PostgreSQL implementation of FlightStore.
#[derive(Clone)]
pub struct PgFlightStore {
    pool: PgPool,
}

impl PgFlightStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl FlightStore for PgFlightStore {
    async fn search(
        &self,
        origin_airport_id: i64,
        destination_airport_id: i64,
        date: NaiveDate,
    ) -> Result<Vec<FlightDetail>, DomainError> {
        let rows = sqlx::query(&format!(
            "{} WHERE r.origin_airport_id = $1 AND r.destination_airport_id = $2 \
             AND f.scheduled_departure::date = $3 ORDER BY f.scheduled_departure",
            flight_detail_sql()
        ))
        .bind(origin_airport_id)
        .bind(destination_airport_id)
        .bind(date)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to search flights"))?;
        rows.iter().map(row_to_flight_detail).collect()
    }

    async fn by_number_and_date(
        &self,
        flight_number: &str,
        date: NaiveDate,
    ) -> Result<Option<FlightDetail>, DomainError> {
        let row = sqlx::query(&format!(
            "{} WHERE UPPER(f.flight_number) = UPPER($1) AND f.scheduled_departure::date = $2",
            flight_detail_sql()
        ))
        .bind(flight_number)
        .bind(date)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch flight by number and date"))?;
        row.as_ref().map(row_to_flight_detail).transpose()
    }

    async fn next_by_number(&self, flight_number: &str) -> Result<Option<FlightDetail>, DomainError> {
        let row = sqlx::query(&format!(
            "{} WHERE UPPER(f.flight_number) = UPPER($1) AND f.scheduled_departure >= NOW() \
             ORDER BY f.scheduled_departure ASC LIMIT 1",
            flight_detail_sql()
        ))
        .bind(flight_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch next flight by number"))?;
        row.as_ref().map(row_to_flight_detail).transpose()
    }

    async fn by_id(&self, id: i64) -> Result<Option<FlightDetail>, DomainError> {
        flight_detail_by_id(&self.pool, id).await
    }

    async fn latest_status_update(
        &self,
        flight_id: i64,
    ) -> Result<Option<FlightStatusUpdate>, DomainError> {
        let row = sqlx::query(
            "SELECT id, flight_id, update_time, delay_minutes, reason, new_departure, \
             new_arrival, gate_change \
             FROM flight_status_updates WHERE flight_id = $1 \
             ORDER BY update_time DESC LIMIT 1",
        )
        .bind(flight_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch status update"))?;
        row.map(|row| {
            Ok(FlightStatusUpdate {
                id: row.try_get("id").map_err(db_err("status update row"))?,
                flight_id: row.try_get("flight_id").map_err(db_err("status update row"))?,
                update_time: row.try_get("update_time").map_err(db_err("status update row"))?,
                delay_minutes: row
                    .try_get("delay_minutes")
                    .map_err(db_err("status update row"))?,
                reason: row.try_get("reason").map_err(db_err("status update row"))?,
                new_departure: row
                    .try_get("new_departure")
                    .map_err(db_err("status update row"))?,
                new_arrival: row
                    .try_get("new_arrival")
                    .map_err(db_err("status update row"))?,
                gate_change: row.try_get("gate_change").map_err(db_err("status update row"))?,
            })
        })
        .transpose()
    }

    async fn seat_map(&self, aircraft_type_id: i64) -> Result<Vec<SeatMapRow>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, aircraft_type_id, seat_number, seat_type, cabin_class, exit_row, \
             extra_legroom, blocked \
             FROM seat_maps WHERE aircraft_type_id = $1 ORDER BY seat_number",
        )
        .bind(aircraft_type_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to fetch seat map"))?;
        rows.iter().map(row_to_seat_map).collect()
    }

    async fn flight_seats(&self, flight_id: i64) -> Result<Vec<FlightSeat>, DomainError> {
        let rows = sqlx::query(
            "SELECT id, flight_id, seat_number, passenger_id, segment_id, fee_amount, \
             fee_currency, status \
             FROM flight_seats WHERE flight_id = $1",
        )
        .bind(flight_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to fetch flight seats"))?;
        rows.iter().map(row_to_flight_seat).collect()
    }

    async fn available_seats(
        &self,
        flight_id: i64,
        cabin_class: CabinClass,
    ) -> Result<Vec<SeatMapRow>, DomainError> {
        let rows = sqlx::query(
            "SELECT sm.id, sm.aircraft_type_id, sm.seat_number, sm.seat_type, sm.cabin_class, \
             sm.exit_row, sm.extra_legroom, sm.blocked \
             FROM seat_maps sm \
             JOIN aircraft ac ON ac.aircraft_type_id = sm.aircraft_type_id \
             JOIN flights f ON f.aircraft_id = ac.id \
             WHERE f.id = $1 AND sm.cabin_class = $2 AND NOT sm.blocked \
               AND NOT EXISTS ( \
                 SELECT 1 FROM flight_seats fs \
                 WHERE fs.flight_id = f.id AND fs.seat_number = sm.seat_number \
                   AND fs.status <> 'available') \
             ORDER BY sm.seat_number",
        )
        .bind(flight_id)
        .bind(cabin_class.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to fetch available seats"))?;
        rows.iter().map(row_to_seat_map).collect()
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
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("failed to begin transaction"))?;

        let holder: Option<(Option<i64>,)> = sqlx::query_as(
            "SELECT segment_id FROM flight_seats \
             WHERE flight_id = $1 AND seat_number = $2 AND status <> 'available' FOR UPDATE",
        )
        .bind(flight_id)
        .bind(new_seat)
        .fetch_optional(&mut *tx)
        .await
        .map_err(db_err("failed to check seat occupancy"))?;
        if let Some((holding_segment,)) = holder {
            if holding_segment != Some(segment_id) {
                return Err(DomainError::new(
                    ErrorCode::SeatUnavailable,
                    format!("Seat {} is not available on this flight", new_seat),
                ));
            }
        }

        if let Some(old) = old_seat {
            sqlx::query(
                "UPDATE flight_seats SET status = 'available', passenger_id = NULL, \
                 segment_id = NULL, fee_amount = NULL, fee_currency = NULL \
                 WHERE flight_id = $1 AND seat_number = $2",
            )
            .bind(flight_id)
            .bind(old)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to release old seat"))?;
        }

        sqlx::query(
            "INSERT INTO flight_seats \
             (flight_id, seat_number, passenger_id, segment_id, fee_amount, fee_currency, status) \
             VALUES ($1, $2, $3, $4, $5, $6, 'occupied') \
             ON CONFLICT (flight_id, seat_number) DO UPDATE SET \
               passenger_id = EXCLUDED.passenger_id, segment_id = EXCLUDED.segment_id, \
               fee_amount = EXCLUDED.fee_amount, fee_currency = EXCLUDED.fee_currency, \
               status = 'occupied'",
        )
        .bind(flight_id)
        .bind(new_seat)
        .bind(passenger_id)
        .bind(segment_id)
        .bind(fee.amount)
        .bind(&fee.currency)
        .execute(&mut *tx)
        .await
        .map_err(db_err("failed to claim seat"))?;

        sqlx::query("UPDATE booking_segments SET seat_number = $2 WHERE id = $1")
            .bind(segment_id)
            .bind(new_seat)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to record seat on segment"))?;

        tx.commit().await.map_err(db_err("failed to commit transaction"))?;
        Ok(())
    }
}
