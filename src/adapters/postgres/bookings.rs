//! PostgreSQL implementation of BookingStore.
//!
//! Booking reads assemble the full [`BookingDetail`]: the booking row with
//! its passenger, plus every segment joined to its materialized flight.
//! Creation, cancellation, and segment replacement each run in one
//! transaction.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{DomainError, ErrorCode, Money};
use crate::domain::model::{
    Baggage, BaggageStatus, BaggageType, Booking, BookingDetail, BookingSegment, BookingStatus,
    CabinClass, CheckInStatus, NewBaggage, NewBooking, NewRefund, NewSegment, Refund,
    SegmentDetail, TripType,
};
use crate::ports::BookingStore;

use super::flights::{row_to_flight_detail, FLIGHT_DETAIL_COLUMNS, FLIGHT_DETAIL_FROM};
use super::passengers::row_to_passenger;
use super::refunds::{row_to_refund, REFUND_COLUMNS};
use super::{db_err, money_from_row, parse_enum};

const BAGGAGE_COLUMNS: &str =
    "id, segment_id, baggage_type, weight_kg, fee_amount, fee_currency, tag_number, status";

const FREE_SEATS_FOR_BOOKING_SQL: &str = "UPDATE flight_seats \
     SET status = 'available', passenger_id = NULL, segment_id = NULL, \
         fee_amount = NULL, fee_currency = NULL \
     WHERE segment_id IN (SELECT id FROM booking_segments WHERE booking_id = $1)";

fn booking_sql() -> String {
    "SELECT b.id AS booking_id, b.reference, b.passenger_id, b.booking_date, \
            b.total_amount, b.total_currency, b.status AS booking_status, b.source, b.trip_type, \
            p.id, p.first_name, p.last_name, p.email, p.phone, p.date_of_birth, \
            p.nationality, p.passport_number, p.frequent_flyer_number, p.tier \
     FROM bookings b JOIN passengers p ON p.id = b.passenger_id"
        .to_string()
}

fn segments_sql() -> String {
    format!(
        "SELECT bs.id AS segment_id, bs.booking_id, bs.passenger_id, bs.cabin_class, \
                bs.fare_basis, bs.ticket_number, bs.seat_number, bs.baggage_allowance_kg, \
                bs.meal_preference, bs.check_in_status, bs.boarding_pass_issued, {} {} \
         JOIN booking_segments bs ON bs.flight_id = f.id \
         WHERE bs.booking_id = $1 ORDER BY f.scheduled_departure",
        FLIGHT_DETAIL_COLUMNS, FLIGHT_DETAIL_FROM
    )
}

fn row_to_booking(row: &PgRow) -> Result<Booking, DomainError> {
    let status: String = row.try_get("booking_status").map_err(db_err("booking row"))?;
    let trip_type: String = row.try_get("trip_type").map_err(db_err("booking row"))?;
    Ok(Booking {
        id: row.try_get("booking_id").map_err(db_err("booking row"))?,
        reference: row.try_get("reference").map_err(db_err("booking row"))?,
        passenger_id: row.try_get("passenger_id").map_err(db_err("booking row"))?,
        booking_date: row.try_get("booking_date").map_err(db_err("booking row"))?,
        total: money_from_row(row, "total_amount", "total_currency")?,
        status: parse_enum(&status, BookingStatus::from_str, "booking status")?,
        source: row.try_get("source").map_err(db_err("booking row"))?,
        trip_type: parse_enum(&trip_type, TripType::from_str, "trip type")?,
    })
}

fn row_to_segment_detail(row: &PgRow) -> Result<SegmentDetail, DomainError> {
    let flight = row_to_flight_detail(row)?;
    let cabin_class: String = row.try_get("cabin_class").map_err(db_err("segment row"))?;
    let check_in: String = row.try_get("check_in_status").map_err(db_err("segment row"))?;
    let segment = BookingSegment {
        id: row.try_get("segment_id").map_err(db_err("segment row"))?,
        booking_id: row.try_get("booking_id").map_err(db_err("segment row"))?,
        flight_id: flight.flight.id,
        passenger_id: row.try_get("passenger_id").map_err(db_err("segment row"))?,
        cabin_class: parse_enum(&cabin_class, CabinClass::from_str, "cabin class")?,
        fare_basis: row.try_get("fare_basis").map_err(db_err("segment row"))?,
        ticket_number: row.try_get("ticket_number").map_err(db_err("segment row"))?,
        seat_number: row.try_get("seat_number").map_err(db_err("segment row"))?,
        baggage_allowance_kg: row
            .try_get("baggage_allowance_kg")
            .map_err(db_err("segment row"))?,
        meal_preference: row
            .try_get("meal_preference")
            .map_err(db_err("segment row"))?,
        check_in_status: parse_enum(&check_in, CheckInStatus::from_str, "check-in status")?,
        boarding_pass_issued: row
            .try_get("boarding_pass_issued")
            .map_err(db_err("segment row"))?,
    };
    Ok(SegmentDetail { segment, flight })
}

fn row_to_baggage(row: &PgRow) -> Result<Baggage, DomainError> {
    let baggage_type: String = row.try_get("baggage_type").map_err(db_err("baggage row"))?;
    let status: String = row.try_get("status").map_err(db_err("baggage row"))?;
    Ok(Baggage {
        id: row.try_get("id").map_err(db_err("baggage row"))?,
        segment_id: row.try_get("segment_id").map_err(db_err("baggage row"))?,
        baggage_type: parse_enum(&baggage_type, BaggageType::from_str, "baggage type")?,
        weight_kg: row.try_get("weight_kg").map_err(db_err("baggage row"))?,
        fee: money_from_row(row, "fee_amount", "fee_currency")?,
        tag_number: row.try_get("tag_number").map_err(db_err("baggage row"))?,
        status: parse_enum(&status, BaggageStatus::from_str, "baggage status")?,
    })
}

async fn booking_detail_by_id(
    pool: &PgPool,
    booking_id: i64,
) -> Result<Option<BookingDetail>, DomainError> {
    let row = sqlx::query(&format!("{} WHERE b.id = $1", booking_sql()))
        .bind(booking_id)
        .fetch_optional(pool)
        .await
        .map_err(db_err("failed to fetch booking"))?;
    let Some(row) = row else { return Ok(None) };
    let booking = row_to_booking(&row)?;
    let passenger = row_to_passenger(&row)?;
    let segment_rows = sqlx::query(&segments_sql())
        .bind(booking_id)
        .fetch_all(pool)
        .await
        .map_err(db_err("failed to fetch booking segments"))?;
    let segments = segment_rows
        .iter()
        .map(row_to_segment_detail)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(BookingDetail { booking, passenger, segments }))
}

async fn insert_segments(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    booking_id: i64,
    passenger_id: i64,
    segments: &[NewSegment],
) -> Result<(), DomainError> {
    for segment in segments {
        sqlx::query(
            "INSERT INTO booking_segments \
             (booking_id, flight_id, passenger_id, cabin_class, fare_basis, ticket_number, \
              seat_number, baggage_allowance_kg, meal_preference, check_in_status, \
              boarding_pass_issued) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, 'not_checked_in', FALSE)",
        )
        .bind(booking_id)
        .bind(segment.flight_id)
        .bind(passenger_id)
        .bind(segment.cabin_class.as_str())
        .bind(&segment.fare_basis)
        .bind(&segment.ticket_number)
        .bind(&segment.seat_number)
        .bind(segment.baggage_allowance_kg)
        .bind(&segment.meal_preference)
        .execute(&mut **tx)
        .await
        .map_err(db_err("failed to insert booking segment"))?;
    }
    Ok(())
}

/// PostgreSQL implementation of BookingStore.
#[derive(Clone)]
pub struct PgBookingStore {
    pool: PgPool,
}

impl PgBookingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingStore for PgBookingStore {
    async fn by_reference(&self, reference: &str) -> Result<Option<BookingDetail>, DomainError> {
        let id: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM bookings WHERE UPPER(reference) = UPPER($1)")
                .bind(reference)
                .fetch_optional(&self.pool)
                .await
                .map_err(db_err("failed to resolve booking reference"))?;
        match id {
            Some((id,)) => booking_detail_by_id(&self.pool, id).await,
            None => Ok(None),
        }
    }

    async fn reference_exists(&self, reference: &str) -> Result<bool, DomainError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM bookings WHERE UPPER(reference) = UPPER($1))",
        )
        .bind(reference)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to check booking reference"))?;
        Ok(row.0)
    }

    async fn create(&self, booking: NewBooking) -> Result<BookingDetail, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("failed to begin transaction"))?;

        let (booking_id,): (i64,) = sqlx::query_as(
            "INSERT INTO bookings \
             (reference, passenger_id, booking_date, total_amount, total_currency, status, \
              source, trip_type) \
             VALUES ($1, $2, NOW(), $3, $4, 'confirmed', $5, $6) RETURNING id",
        )
        .bind(&booking.reference)
        .bind(booking.passenger_id)
        .bind(booking.total.amount)
        .bind(&booking.total.currency)
        .bind(&booking.source)
        .bind(booking.trip_type.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("failed to insert booking"))?;

        insert_segments(&mut tx, booking_id, booking.passenger_id, &booking.segments).await?;
        tx.commit().await.map_err(db_err("failed to commit transaction"))?;

        booking_detail_by_id(&self.pool, booking_id)
            .await?
            .ok_or_else(|| DomainError::internal("booking vanished after creation"))
    }

    async fn cancel(&self, booking_id: i64, refund: NewRefund) -> Result<Refund, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("failed to begin transaction"))?;

        sqlx::query("UPDATE bookings SET status = 'cancelled' WHERE id = $1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to cancel booking"))?;

        sqlx::query(FREE_SEATS_FOR_BOOKING_SQL)
            .bind(booking_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to release booking seats"))?;

        let row = sqlx::query(&format!(
            "INSERT INTO refunds \
             (reference, booking_id, refund_type, amount, currency, reason, status, method, \
              requested_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, NOW()) \
             RETURNING {}",
            REFUND_COLUMNS
        ))
        .bind(&refund.reference)
        .bind(booking_id)
        .bind(refund.refund_type.as_str())
        .bind(refund.amount.amount)
        .bind(&refund.amount.currency)
        .bind(&refund.reason)
        .bind(refund.method.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("failed to record cancellation refund"))?;

        tx.commit().await.map_err(db_err("failed to commit transaction"))?;
        row_to_refund(&row)
    }

    async fn set_status(&self, booking_id: i64, status: BookingStatus) -> Result<(), DomainError> {
        sqlx::query("UPDATE bookings SET status = $2 WHERE id = $1")
            .bind(booking_id)
            .bind(status.as_str())
            .execute(&self.pool)
            .await
            .map_err(db_err("failed to update booking status"))?;
        Ok(())
    }

    async fn replace_segments(
        &self,
        booking_id: i64,
        segments: Vec<NewSegment>,
        new_total: Money,
    ) -> Result<BookingDetail, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("failed to begin transaction"))?;

        let (passenger_id,): (i64,) =
            sqlx::query_as("SELECT passenger_id FROM bookings WHERE id = $1")
                .bind(booking_id)
                .fetch_one(&mut *tx)
                .await
                .map_err(db_err("failed to fetch booking passenger"))?;

        sqlx::query(FREE_SEATS_FOR_BOOKING_SQL)
            .bind(booking_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to release booking seats"))?;

        sqlx::query("DELETE FROM booking_segments WHERE booking_id = $1")
            .bind(booking_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to drop old segments"))?;

        insert_segments(&mut tx, booking_id, passenger_id, &segments).await?;

        sqlx::query("UPDATE bookings SET total_amount = $2, total_currency = $3 WHERE id = $1")
            .bind(booking_id)
            .bind(new_total.amount)
            .bind(&new_total.currency)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to update booking total"))?;

        tx.commit().await.map_err(db_err("failed to commit transaction"))?;

        booking_detail_by_id(&self.pool, booking_id)
            .await?
            .ok_or_else(|| DomainError::internal("booking vanished after segment replacement"))
    }

    async fn check_in_segment(
        &self,
        flight_id: i64,
        segment_id: i64,
        passenger_id: i64,
        claim_seat: Option<&str>,
    ) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("failed to begin transaction"))?;

        if let Some(seat) = claim_seat {
            let holder: Option<(Option<i64>,)> = sqlx::query_as(
                "SELECT segment_id FROM flight_seats \
                 WHERE flight_id = $1 AND seat_number = $2 AND status <> 'available' FOR UPDATE",
            )
            .bind(flight_id)
            .bind(seat)
            .fetch_optional(&mut *tx)
            .await
            .map_err(db_err("failed to check seat occupancy"))?;
            if let Some((holding_segment,)) = holder {
                if holding_segment != Some(segment_id) {
                    return Err(DomainError::new(
                        ErrorCode::SeatUnavailable,
                        format!("Seat {} is not available on this flight", seat),
                    ));
                }
            }

            sqlx::query(
                "INSERT INTO flight_seats \
                 (flight_id, seat_number, passenger_id, segment_id, status) \
                 VALUES ($1, $2, $3, $4, 'occupied') \
                 ON CONFLICT (flight_id, seat_number) DO UPDATE SET \
                   passenger_id = EXCLUDED.passenger_id, segment_id = EXCLUDED.segment_id, \
                   fee_amount = NULL, fee_currency = NULL, status = 'occupied'",
            )
            .bind(flight_id)
            .bind(seat)
            .bind(passenger_id)
            .bind(segment_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to claim seat"))?;
        }

        sqlx::query(
            "UPDATE booking_segments \
             SET check_in_status = 'checked_in', \
                 seat_number = COALESCE($2, seat_number), \
                 boarding_pass_issued = TRUE \
             WHERE id = $1",
        )
        .bind(segment_id)
        .bind(claim_seat)
        .execute(&mut *tx)
        .await
        .map_err(db_err("failed to check in segment"))?;

        tx.commit()
            .await
            .map_err(db_err("failed to commit check-in"))?;
        Ok(())
    }

    async fn set_boarding_pass_issued(&self, segment_id: i64) -> Result<(), DomainError> {
        sqlx::query("UPDATE booking_segments SET boarding_pass_issued = TRUE WHERE id = $1")
            .bind(segment_id)
            .execute(&self.pool)
            .await
            .map_err(db_err("failed to flag boarding pass"))?;
        Ok(())
    }

    async fn add_baggage(&self, baggage: NewBaggage) -> Result<Baggage, DomainError> {
        let row = sqlx::query(&format!(
            "INSERT INTO baggage \
             (segment_id, baggage_type, weight_kg, fee_amount, fee_currency, tag_number, status) \
             VALUES ($1, $2, $3, $4, $5, $6, 'registered') RETURNING {}",
            BAGGAGE_COLUMNS
        ))
        .bind(baggage.segment_id)
        .bind(baggage.baggage_type.as_str())
        .bind(baggage.weight_kg)
        .bind(baggage.fee.amount)
        .bind(&baggage.fee.currency)
        .bind(&baggage.tag_number)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to register baggage"))?;
        row_to_baggage(&row)
    }

    async fn baggage_for_booking(&self, booking_id: i64) -> Result<Vec<Baggage>, DomainError> {
        let rows = sqlx::query(
            "SELECT bg.id, bg.segment_id, bg.baggage_type, bg.weight_kg, bg.fee_amount, \
             bg.fee_currency, bg.tag_number, bg.status \
             FROM baggage bg \
             JOIN booking_segments bs ON bs.id = bg.segment_id \
             WHERE bs.booking_id = $1 ORDER BY bg.id",
        )
        .bind(booking_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to fetch baggage for booking"))?;
        rows.iter().map(row_to_baggage).collect()
    }

    async fn baggage_by_tag(&self, tag_number: &str) -> Result<Option<Baggage>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM baggage WHERE UPPER(tag_number) = UPPER($1)",
            BAGGAGE_COLUMNS
        ))
        .bind(tag_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch baggage by tag"))?;
        row.as_ref().map(row_to_baggage).transpose()
    }
}
