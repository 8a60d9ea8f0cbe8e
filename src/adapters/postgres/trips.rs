//! PostgreSQL implementation of TripStore.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};

use crate::domain::foundation::DomainError;
use crate::domain::model::{
    Excursion, ExcursionBooking, NewExcursionBooking, NewRefund, NewTripBooking, Refund,
    TripBooking, TripBookingDetail, TripBookingStatus, TripPackage,
};
use crate::ports::TripStore;

use super::refunds::{row_to_refund, REFUND_COLUMNS};
use super::{db_err, money_from_row, parse_enum};

const PACKAGE_COLUMNS: &str = "id, code, name, destination, category, description, \
     duration_days, price_amount, price_currency";
const EXCURSION_COLUMNS: &str =
    "id, code, name, destination, description, duration_hours, price_amount, price_currency";
const TRIP_BOOKING_COLUMNS: &str = "id, reference, package_id, passenger_id, start_date, \
     end_date, travelers, total_amount, total_currency, status";

fn row_to_package(row: &PgRow) -> Result<TripPackage, DomainError> {
    Ok(TripPackage {
        id: row.try_get("id").map_err(db_err("trip package row"))?,
        code: row.try_get("code").map_err(db_err("trip package row"))?,
        name: row.try_get("name").map_err(db_err("trip package row"))?,
        destination: row.try_get("destination").map_err(db_err("trip package row"))?,
        category: row.try_get("category").map_err(db_err("trip package row"))?,
        description: row.try_get("description").map_err(db_err("trip package row"))?,
        duration_days: row
            .try_get("duration_days")
            .map_err(db_err("trip package row"))?,
        price: money_from_row(row, "price_amount", "price_currency")?,
    })
}

fn row_to_excursion(row: &PgRow) -> Result<Excursion, DomainError> {
    Ok(Excursion {
        id: row.try_get("id").map_err(db_err("excursion row"))?,
        code: row.try_get("code").map_err(db_err("excursion row"))?,
        name: row.try_get("name").map_err(db_err("excursion row"))?,
        destination: row.try_get("destination").map_err(db_err("excursion row"))?,
        description: row.try_get("description").map_err(db_err("excursion row"))?,
        duration_hours: row
            .try_get("duration_hours")
            .map_err(db_err("excursion row"))?,
        price: money_from_row(row, "price_amount", "price_currency")?,
    })
}

fn row_to_trip_booking(row: &PgRow) -> Result<TripBooking, DomainError> {
    let status: String = row.try_get("status").map_err(db_err("trip booking row"))?;
    Ok(TripBooking {
        id: row.try_get("id").map_err(db_err("trip booking row"))?,
        reference: row.try_get("reference").map_err(db_err("trip booking row"))?,
        package_id: row.try_get("package_id").map_err(db_err("trip booking row"))?,
        passenger_id: row
            .try_get("passenger_id")
            .map_err(db_err("trip booking row"))?,
        start_date: row.try_get("start_date").map_err(db_err("trip booking row"))?,
        end_date: row.try_get("end_date").map_err(db_err("trip booking row"))?,
        travelers: row.try_get("travelers").map_err(db_err("trip booking row"))?,
        total: money_from_row(row, "total_amount", "total_currency")?,
        status: parse_enum(&status, TripBookingStatus::from_str, "trip booking status")?,
    })
}

fn row_to_excursion_booking(row: &PgRow) -> Result<ExcursionBooking, DomainError> {
    Ok(ExcursionBooking {
        id: row.try_get("id").map_err(db_err("excursion booking row"))?,
        trip_booking_id: row
            .try_get("trip_booking_id")
            .map_err(db_err("excursion booking row"))?,
        excursion_id: row
            .try_get("excursion_id")
            .map_err(db_err("excursion booking row"))?,
        excursion_date: row
            .try_get("excursion_date")
            .map_err(db_err("excursion booking row"))?,
        participants: row
            .try_get("participants")
            .map_err(db_err("excursion booking row"))?,
        total: money_from_row(row, "total_amount", "total_currency")?,
    })
}

/// PostgreSQL implementation of TripStore.
#[derive(Clone)]
pub struct PgTripStore {
    pool: PgPool,
}

impl PgTripStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TripStore for PgTripStore {
    async fn packages(&self, destination: Option<&str>) -> Result<Vec<TripPackage>, DomainError> {
        let rows = match destination {
            Some(dest) => {
                sqlx::query(&format!(
                    "SELECT {} FROM trip_packages \
                     WHERE destination ILIKE '%' || $1 || '%' ORDER BY name",
                    PACKAGE_COLUMNS
                ))
                .bind(dest)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM trip_packages ORDER BY name",
                    PACKAGE_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err("failed to fetch trip packages"))?;
        rows.iter().map(row_to_package).collect()
    }

    async fn package_by_code(&self, code: &str) -> Result<Option<TripPackage>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM trip_packages WHERE UPPER(code) = UPPER($1)",
            PACKAGE_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch trip package"))?;
        row.as_ref().map(row_to_package).transpose()
    }

    async fn trip_reference_exists(&self, reference: &str) -> Result<bool, DomainError> {
        let row: (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM trip_bookings WHERE UPPER(reference) = UPPER($1))",
        )
        .bind(reference)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to check trip reference"))?;
        Ok(row.0)
    }

    async fn book(&self, booking: NewTripBooking) -> Result<TripBooking, DomainError> {
        let row = sqlx::query(&format!(
            "INSERT INTO trip_bookings \
             (reference, package_id, passenger_id, start_date, end_date, travelers, \
              total_amount, total_currency, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, 'confirmed') RETURNING {}",
            TRIP_BOOKING_COLUMNS
        ))
        .bind(&booking.reference)
        .bind(booking.package_id)
        .bind(booking.passenger_id)
        .bind(booking.start_date)
        .bind(booking.end_date)
        .bind(booking.travelers)
        .bind(booking.total.amount)
        .bind(&booking.total.currency)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to create trip booking"))?;
        row_to_trip_booking(&row)
    }

    async fn trip_booking_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<TripBookingDetail>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM trip_bookings WHERE UPPER(reference) = UPPER($1)",
            TRIP_BOOKING_COLUMNS
        ))
        .bind(reference)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch trip booking"))?;
        let Some(row) = row else { return Ok(None) };
        let trip_booking = row_to_trip_booking(&row)?;

        let package_row = sqlx::query(&format!(
            "SELECT {} FROM trip_packages WHERE id = $1",
            PACKAGE_COLUMNS
        ))
        .bind(trip_booking.package_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to fetch trip booking package"))?;
        let package = row_to_package(&package_row)?;

        let excursion_rows = sqlx::query(
            "SELECT id, trip_booking_id, excursion_id, excursion_date, participants, \
             total_amount, total_currency \
             FROM excursion_bookings WHERE trip_booking_id = $1 ORDER BY excursion_date",
        )
        .bind(trip_booking.id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err("failed to fetch excursion bookings"))?;
        let excursions = excursion_rows
            .iter()
            .map(row_to_excursion_booking)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(TripBookingDetail { trip_booking, package, excursions }))
    }

    async fn cancel_trip_booking(
        &self,
        trip_booking_id: i64,
        refund: NewRefund,
    ) -> Result<Refund, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(db_err("failed to begin transaction"))?;

        sqlx::query("UPDATE trip_bookings SET status = 'cancelled' WHERE id = $1")
            .bind(trip_booking_id)
            .execute(&mut *tx)
            .await
            .map_err(db_err("failed to cancel trip booking"))?;

        let row = sqlx::query(&format!(
            "INSERT INTO refunds \
             (reference, trip_booking_id, refund_type, amount, currency, reason, status, \
              method, requested_at) \
             VALUES ($1, $2, $3, $4, $5, $6, 'pending', $7, NOW()) RETURNING {}",
            REFUND_COLUMNS
        ))
        .bind(&refund.reference)
        .bind(trip_booking_id)
        .bind(refund.refund_type.as_str())
        .bind(refund.amount.amount)
        .bind(&refund.amount.currency)
        .bind(&refund.reason)
        .bind(refund.method.as_str())
        .fetch_one(&mut *tx)
        .await
        .map_err(db_err("failed to record trip cancellation refund"))?;

        tx.commit().await.map_err(db_err("failed to commit transaction"))?;
        row_to_refund(&row)
    }

    async fn excursions(&self, destination: Option<&str>) -> Result<Vec<Excursion>, DomainError> {
        let rows = match destination {
            Some(dest) => {
                sqlx::query(&format!(
                    "SELECT {} FROM excursions \
                     WHERE destination ILIKE '%' || $1 || '%' ORDER BY name",
                    EXCURSION_COLUMNS
                ))
                .bind(dest)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {} FROM excursions ORDER BY name",
                    EXCURSION_COLUMNS
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(db_err("failed to fetch excursions"))?;
        rows.iter().map(row_to_excursion).collect()
    }

    async fn excursion_by_code(&self, code: &str) -> Result<Option<Excursion>, DomainError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM excursions WHERE UPPER(code) = UPPER($1)",
            EXCURSION_COLUMNS
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err("failed to fetch excursion"))?;
        row.as_ref().map(row_to_excursion).transpose()
    }

    async fn book_excursion(
        &self,
        booking: NewExcursionBooking,
    ) -> Result<ExcursionBooking, DomainError> {
        let row = sqlx::query(
            "INSERT INTO excursion_bookings \
             (trip_booking_id, excursion_id, excursion_date, participants, total_amount, \
              total_currency) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING id, trip_booking_id, excursion_id, excursion_date, participants, \
                       total_amount, total_currency",
        )
        .bind(booking.trip_booking_id)
        .bind(booking.excursion_id)
        .bind(booking.excursion_date)
        .bind(booking.participants)
        .bind(booking.total.amount)
        .bind(&booking.total.currency)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err("failed to book excursion"))?;
        row_to_excursion_booking(&row)
    }
}
